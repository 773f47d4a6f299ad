// ABOUTME: Reminder subcommand for slotwise-cli
// ABOUTME: Runs one reminder cycle at an explicit or current business-local time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use anyhow::Result;
use chrono::NaiveDateTime;
use slotwise::context::AppContext;

pub async fn run_cycle(context: &AppContext, now: Option<NaiveDateTime>) -> Result<()> {
    let scheduler = context.reminders();
    let now = now.unwrap_or_else(|| scheduler.business_now());
    let dispatched = scheduler.process_due(now).await?;
    println!("Dispatched {dispatched} reminder(s) at {now}.");
    Ok(())
}

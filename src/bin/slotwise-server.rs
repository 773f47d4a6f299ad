// ABOUTME: Long-running slotwise process driving the reminder scheduler
// ABOUTME: Loads configuration, wires the application context and runs until Ctrl-C
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Slotwise Server Binary
//!
//! Starts the booking core with environment configuration and keeps the
//! reminder loop polling until the process receives Ctrl-C.

use anyhow::Result;
use clap::Parser;
use slotwise::{
    config::{DatabaseUrl, ServerConfig},
    context::AppContext,
    logging,
};
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "slotwise-server")]
#[command(about = "Slotwise booking core - availability, notifications and reminders")]
pub struct Args {
    /// Override `DATABASE_URL`
    #[arg(long)]
    database_url: Option<String>,

    /// Disable the reminder loop regardless of `REMINDERS_ENABLED`
    #[arg(long)]
    no_reminders: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(url) = args.database_url.as_deref() {
        config.database.url = DatabaseUrl::parse_url(url)?;
    }
    if args.no_reminders {
        config.reminders.enabled = false;
    }

    logging::init_from_env()?;
    info!("Starting slotwise server");

    let context = AppContext::bootstrap(&config).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = if config.reminders.enabled {
        let reminders = context.reminders().clone();
        Some(tokio::spawn(async move { reminders.run(shutdown_rx).await }))
    } else {
        warn!("Reminder loop disabled");
        None
    };

    info!("Ready, press Ctrl-C to stop");
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown requested");

    // Receivers may already be gone when the loop is disabled
    let _ = shutdown_tx.send(true);
    if let Some(handle) = scheduler {
        if let Err(e) = handle.await {
            error!("Reminder task ended abnormally: {e}");
        }
    }

    info!("Slotwise server stopped");
    Ok(())
}

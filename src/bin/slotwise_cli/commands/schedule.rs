// ABOUTME: Schedule subcommands for slotwise-cli
// ABOUTME: Schema migration, shift registration, availability checks and slot listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::helpers::display::{display_bookings, display_decision, display_slots};
use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use slotwise::context::AppContext;
use slotwise::database::{BookingFilter, BookingRepository};
use slotwise::models::{TimeInterval, WorkShift};
use uuid::Uuid;

pub async fn migrate(context: &AppContext) -> Result<()> {
    context.database().migrate().await?;
    println!("Schema is up to date.");
    Ok(())
}

pub async fn add_shift(
    context: &AppContext,
    employee: Uuid,
    day: u8,
    start: NaiveTime,
    end: NaiveTime,
    is_break: bool,
) -> Result<()> {
    let shift = WorkShift::new(employee, day, start, end, is_break)?;
    context.database().add_shift(&shift).await?;
    let kind = if is_break { "Break" } else { "Shift" };
    println!("{kind} {} added for day {day}: {}", shift.id, shift.hours);
    Ok(())
}

pub async fn availability(
    context: &AppContext,
    employee: Uuid,
    start: NaiveDateTime,
    end: NaiveDateTime,
    excluding: Option<Uuid>,
) -> Result<()> {
    let candidate = TimeInterval::new(start, end)?;
    let decision = context
        .availability()
        .check(employee, &candidate, excluding)
        .await?;
    display_decision(&candidate, &decision);
    Ok(())
}

pub async fn slots(
    context: &AppContext,
    employee: Uuid,
    date: NaiveDate,
    duration_minutes: i64,
    step_minutes: i64,
) -> Result<()> {
    if duration_minutes <= 0 || step_minutes <= 0 {
        bail!("--duration and --step must be positive");
    }
    let slots = context
        .availability()
        .available_slots(
            employee,
            date,
            TimeDelta::minutes(duration_minutes),
            TimeDelta::minutes(step_minutes),
        )
        .await?;
    display_slots(&slots);
    Ok(())
}

pub async fn list_bookings(
    context: &AppContext,
    employee: Option<Uuid>,
    client: Option<Uuid>,
) -> Result<()> {
    let filter = match (employee, client) {
        (Some(employee), _) => BookingFilter::new().for_employee(employee),
        (None, Some(client)) => BookingFilter::new().for_client(client),
        (None, None) => bail!("pass --employee or --client"),
    };
    let bookings = context.database().list_bookings(&filter).await?;
    display_bookings(&bookings);
    Ok(())
}

// ABOUTME: Booking storage with the authoritative double-booking guard
// ABOUTME: Inserts and reschedules re-check overlaps inside a BEGIN IMMEDIATE transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::{
    begin_immediate, finish_transaction, parse_uuid, BookingFilter, BookingPredicate, Database,
};
use crate::database::BookingRepository;
use crate::errors::{AppError, AppResult, DatabaseError};
use crate::logging::AppLogger;
use crate::models::{Booking, BookingStatus, NewBooking, ReminderKind, TimeInterval};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

impl Database {
    pub(super) async fn migrate_bookings(&self) -> Result<(), DatabaseError> {
        self.run_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS bookings (
                id TEXT PRIMARY KEY,
                employee_id TEXT NOT NULL REFERENCES users(id),
                client_id TEXT NOT NULL REFERENCES users(id),
                service_name TEXT NOT NULL,
                start_at DATETIME NOT NULL,
                end_at DATETIME NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('pending', 'confirmed', 'cancelled', 'completed', 'no_show')),
                reminder_sent BOOLEAN NOT NULL DEFAULT 0,
                reminder_2h_sent BOOLEAN NOT NULL DEFAULT 0,
                calendar_event_id TEXT,
                created_at DATETIME NOT NULL,
                CHECK (start_at < end_at)
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_bookings_employee_start ON bookings(employee_id, start_at)",
            "CREATE INDEX IF NOT EXISTS idx_bookings_status_start ON bookings(status, start_at)",
        ])
        .await
    }

    /// Bookings matching `filter`, read through the pool
    pub(super) async fn list_bookings_with(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>> {
        let mut query = filter.to_select();
        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(booking_from_row).collect()
    }
}

fn booking_from_row(row: &SqliteRow) -> AppResult<Booking> {
    let id: String = row.try_get("id")?;
    let employee_id: String = row.try_get("employee_id")?;
    let client_id: String = row.try_get("client_id")?;
    let start: NaiveDateTime = row.try_get("start_at")?;
    let end: NaiveDateTime = row.try_get("end_at")?;
    let status: String = row.try_get("status")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    let invalid = |field: &'static str, error: AppError| DatabaseError::InvalidData {
        field,
        reason: error.message,
    };

    Ok(Booking {
        id: parse_uuid("bookings.id", &id)?,
        employee_id: parse_uuid("bookings.employee_id", &employee_id)?,
        client_id: parse_uuid("bookings.client_id", &client_id)?,
        service_name: row.try_get("service_name")?,
        interval: TimeInterval::new(start, end).map_err(|e| invalid("bookings.end_at", e))?,
        status: status.parse().map_err(|e| invalid("bookings.status", e))?,
        reminder_sent: row.try_get("reminder_sent")?,
        reminder_2h_sent: row.try_get("reminder_2h_sent")?,
        calendar_event_id: row.try_get("calendar_event_id")?,
        created_at,
    })
}

fn booking_not_found(booking_id: Uuid) -> AppError {
    DatabaseError::NotFound {
        entity_type: "Booking",
        entity_id: booking_id.to_string(),
    }
    .into()
}

async fn fetch_booking(conn: &mut SqliteConnection, booking_id: Uuid) -> AppResult<Option<Booking>> {
    let mut query = BookingFilter::new()
        .with(BookingPredicate::Id(booking_id))
        .to_select();
    let row = query.build().fetch_optional(&mut *conn).await?;
    row.as_ref().map(booking_from_row).transpose()
}

/// First occupying booking of the employee overlapping `interval`
async fn first_conflict(
    conn: &mut SqliteConnection,
    employee_id: Uuid,
    interval: TimeInterval,
    excluding: Option<Uuid>,
) -> AppResult<Option<Uuid>> {
    let mut query = BookingFilter::new()
        .for_employee(employee_id)
        .occupying()
        .overlapping(interval)
        .excluding(excluding)
        .limit(1)
        .to_select();
    let row = query.build().fetch_optional(&mut *conn).await?;
    match row {
        Some(row) => {
            let id: String = row.try_get("id")?;
            Ok(Some(parse_uuid("bookings.id", &id)?))
        }
        None => Ok(None),
    }
}

fn slot_taken(employee_id: Uuid, interval: TimeInterval, existing: Uuid) -> AppError {
    AppError::conflict(format!("employee is already booked during {interval}"))
        .with_employee_id(employee_id)
        .with_booking_id(existing)
}

async fn insert_guarded(conn: &mut SqliteConnection, booking: Booking) -> AppResult<Booking> {
    if let Some(existing) = first_conflict(conn, booking.employee_id, booking.interval, None).await? {
        return Err(slot_taken(booking.employee_id, booking.interval, existing));
    }

    sqlx::query(
        r"
        INSERT INTO bookings (
            id, employee_id, client_id, service_name, start_at, end_at, status,
            reminder_sent, reminder_2h_sent, calendar_event_id, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, 0, 0, NULL, ?)
        ",
    )
    .bind(booking.id.to_string())
    .bind(booking.employee_id.to_string())
    .bind(booking.client_id.to_string())
    .bind(&booking.service_name)
    .bind(booking.interval.start())
    .bind(booking.interval.end())
    .bind(booking.status.as_str())
    .bind(booking.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(booking)
}

async fn reschedule_guarded(
    conn: &mut SqliteConnection,
    booking_id: Uuid,
    interval: TimeInterval,
) -> AppResult<Booking> {
    let booking = fetch_booking(conn, booking_id)
        .await?
        .ok_or_else(|| booking_not_found(booking_id))?;

    if !matches!(booking.status, BookingStatus::Pending | BookingStatus::Confirmed) {
        return Err(AppError::invalid_input(format!(
            "cannot reschedule a {} booking",
            booking.status
        ))
        .with_booking_id(booking_id));
    }

    if let Some(existing) = first_conflict(conn, booking.employee_id, interval, Some(booking_id)).await? {
        return Err(slot_taken(booking.employee_id, interval, existing));
    }

    sqlx::query(
        r"
        UPDATE bookings
        SET start_at = ?, end_at = ?, reminder_sent = 0, reminder_2h_sent = 0
        WHERE id = ?
        ",
    )
    .bind(interval.start())
    .bind(interval.end())
    .bind(booking_id.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(Booking {
        interval,
        reminder_sent: false,
        reminder_2h_sent: false,
        ..booking
    })
}

#[async_trait]
impl BookingRepository for Database {
    async fn insert_booking(&self, booking: &NewBooking) -> AppResult<Booking> {
        booking.validate()?;
        let record = Booking {
            id: Uuid::new_v4(),
            employee_id: booking.employee_id,
            client_id: booking.client_id,
            service_name: booking.service_name.trim().to_owned(),
            interval: booking.interval,
            status: BookingStatus::Confirmed,
            reminder_sent: false,
            reminder_2h_sent: false,
            calendar_event_id: None,
            created_at: Utc::now(),
        };

        let mut tx = begin_immediate(&self.pool).await?;
        let result = insert_guarded(&mut tx, record).await;
        let inserted = finish_transaction(tx, result).await?;

        AppLogger::log_booking_transition(inserted.id, None, inserted.status);
        Ok(inserted)
    }

    async fn get_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        let mut conn = self.pool.acquire().await?;
        fetch_booking(&mut conn, booking_id).await
    }

    async fn reschedule_booking(&self, booking_id: Uuid, interval: TimeInterval) -> AppResult<Booking> {
        let mut tx = begin_immediate(&self.pool).await?;
        let result = reschedule_guarded(&mut tx, booking_id, interval).await;
        let booking = finish_transaction(tx, result).await?;

        debug!(booking.id = %booking_id, slot = %interval, "Booking rescheduled");
        Ok(booking)
    }

    async fn update_status(&self, booking_id: Uuid, status: BookingStatus) -> AppResult<Booking> {
        let booking = self
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| booking_not_found(booking_id))?;

        if !booking.status.can_transition_to(status) {
            return Err(AppError::invalid_input(format!(
                "cannot move a {} booking to {status}",
                booking.status
            ))
            .with_booking_id(booking_id));
        }

        let result = sqlx::query("UPDATE bookings SET status = ? WHERE id = ? AND status = ?")
            .bind(status.as_str())
            .bind(booking_id.to_string())
            .bind(booking.status.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::conflict("booking was modified concurrently").with_booking_id(booking_id));
        }

        AppLogger::log_booking_transition(booking_id, Some(booking.status), status);
        Ok(Booking { status, ..booking })
    }

    async fn set_calendar_event_id(&self, booking_id: Uuid, event_id: Option<&str>) -> AppResult<()> {
        let result = sqlx::query("UPDATE bookings SET calendar_event_id = ? WHERE id = ?")
            .bind(event_id)
            .bind(booking_id.to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(booking_not_found(booking_id));
        }
        Ok(())
    }

    async fn due_for_reminder(&self, kind: ReminderKind, now: NaiveDateTime) -> AppResult<Vec<Booking>> {
        let mut due = self
            .list_bookings_with(&BookingFilter::reminder_due(kind, now))
            .await?;
        due.retain(|booking| booking.reminder_due(kind, now));
        Ok(due)
    }

    async fn mark_reminder_sent(&self, booking_id: Uuid, kind: ReminderKind) -> AppResult<()> {
        let statement = match kind {
            ReminderKind::DayBefore => "UPDATE bookings SET reminder_sent = 1 WHERE id = ?",
            ReminderKind::ShortNotice => "UPDATE bookings SET reminder_2h_sent = 1 WHERE id = ?",
        };
        let result = sqlx::query(statement)
            .bind(booking_id.to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(booking_not_found(booking_id));
        }
        Ok(())
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>> {
        self.list_bookings_with(filter).await
    }
}

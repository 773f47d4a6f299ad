// ABOUTME: Work shift and absence storage backing availability checks
// ABOUTME: Implements ScheduleRepository over the shifts, absences and bookings tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::{parse_uuid, BookingFilter, Database};
use crate::database::ScheduleRepository;
use crate::errors::{AppResult, DatabaseError};
use crate::models::{Absence, Booking, DateRange, TimeInterval, UserRole, WorkShift};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    pub(super) async fn migrate_schedule(&self) -> Result<(), DatabaseError> {
        self.run_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS work_shifts (
                id TEXT PRIMARY KEY,
                employee_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                day_of_week INTEGER NOT NULL CHECK (day_of_week BETWEEN 1 AND 7),
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                is_break BOOLEAN NOT NULL DEFAULT 0,
                CHECK (start_time < end_time)
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_work_shifts_employee_day ON work_shifts(employee_id, day_of_week)",
            r"
            CREATE TABLE IF NOT EXISTS absences (
                id TEXT PRIMARY KEY,
                employee_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                first_day DATE NOT NULL,
                last_day DATE NOT NULL,
                approved BOOLEAN NOT NULL DEFAULT 0,
                reason TEXT,
                CHECK (first_day <= last_day)
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_absences_employee ON absences(employee_id, first_day)",
        ])
        .await
    }

    /// Store a work shift or break
    ///
    /// # Errors
    ///
    /// Returns an error if the employee does not exist or the insert fails
    pub async fn add_shift(&self, shift: &WorkShift) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO work_shifts (id, employee_id, day_of_week, start_time, end_time, is_break)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(shift.id.to_string())
        .bind(shift.employee_id.to_string())
        .bind(i64::from(shift.day_of_week))
        .bind(shift.hours.start())
        .bind(shift.hours.end())
        .bind(shift.is_break)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Store an absence
    ///
    /// # Errors
    ///
    /// Returns an error if the employee does not exist or the insert fails
    pub async fn add_absence(&self, absence: &Absence) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO absences (id, employee_id, first_day, last_day, approved, reason)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(absence.id.to_string())
        .bind(absence.employee_id.to_string())
        .bind(absence.period.first)
        .bind(absence.period.last)
        .bind(absence.approved)
        .bind(absence.reason.as_deref())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Approve a pending absence
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no absence has this id
    pub async fn approve_absence(&self, absence_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE absences SET approved = 1 WHERE id = ?")
            .bind(absence_id.to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound {
                entity_type: "Absence",
                entity_id: absence_id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn shift_from_row(row: &SqliteRow) -> AppResult<WorkShift> {
    let id: String = row.try_get("id")?;
    let employee_id: String = row.try_get("employee_id")?;
    let day_of_week: i64 = row.try_get("day_of_week")?;
    let start: NaiveTime = row.try_get("start_time")?;
    let end: NaiveTime = row.try_get("end_time")?;

    let invalid = |field: &'static str, reason: String| DatabaseError::InvalidData { field, reason };
    Ok(WorkShift {
        id: parse_uuid("work_shifts.id", &id)?,
        employee_id: parse_uuid("work_shifts.employee_id", &employee_id)?,
        day_of_week: u8::try_from(day_of_week)
            .map_err(|e| invalid("work_shifts.day_of_week", e.to_string()))?,
        hours: TimeInterval::new(start, end)
            .map_err(|e| invalid("work_shifts.start_time", e.message))?,
        is_break: row.try_get("is_break")?,
    })
}

fn absence_from_row(row: &SqliteRow) -> AppResult<Absence> {
    let id: String = row.try_get("id")?;
    let employee_id: String = row.try_get("employee_id")?;
    let first: NaiveDate = row.try_get("first_day")?;
    let last: NaiveDate = row.try_get("last_day")?;

    Ok(Absence {
        id: parse_uuid("absences.id", &id)?,
        employee_id: parse_uuid("absences.employee_id", &employee_id)?,
        period: DateRange::new(first, last).map_err(|e| DatabaseError::InvalidData {
            field: "absences.last_day",
            reason: e.message,
        })?,
        approved: row.try_get("approved")?,
        reason: row.try_get("reason")?,
    })
}

#[async_trait]
impl ScheduleRepository for Database {
    async fn employee_exists(&self, employee_id: Uuid) -> AppResult<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM users WHERE id = ? AND role = ?")
            .bind(employee_id.to_string())
            .bind(UserRole::Employee.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn get_shifts(&self, employee_id: Uuid, day_of_week: u8) -> AppResult<Vec<WorkShift>> {
        let rows = sqlx::query(
            r"
            SELECT id, employee_id, day_of_week, start_time, end_time, is_break
            FROM work_shifts
            WHERE employee_id = ? AND day_of_week = ?
            ORDER BY start_time
            ",
        )
        .bind(employee_id.to_string())
        .bind(i64::from(day_of_week))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(shift_from_row).collect()
    }

    async fn get_absences(&self, employee_id: Uuid, range: &TimeInterval) -> AppResult<Vec<Absence>> {
        let rows = sqlx::query(
            r"
            SELECT id, employee_id, first_day, last_day, approved, reason
            FROM absences
            WHERE employee_id = ? AND first_day <= ? AND last_day >= ?
            ORDER BY first_day
            ",
        )
        .bind(employee_id.to_string())
        .bind(range.end().date())
        .bind(range.start().date())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(absence_from_row).collect()
    }

    async fn get_overlapping_bookings(
        &self,
        employee_id: Uuid,
        interval: &TimeInterval,
        excluding: Option<Uuid>,
    ) -> AppResult<Vec<Booking>> {
        let filter = BookingFilter::new()
            .for_employee(employee_id)
            .occupying()
            .overlapping(*interval)
            .excluding(excluding);
        self.list_bookings_with(&filter).await
    }
}

// ABOUTME: SQLite storage for schedules, bookings, contacts and device tokens
// ABOUTME: Owns the connection pool, schema migration and the serialised booking write boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Database Management
//!
//! One [`Database`] handle implements every repository trait the core reads
//! and writes through. Booking inserts and reschedules run inside a
//! `BEGIN IMMEDIATE` transaction that re-checks for overlapping bookings, so
//! of two concurrent writers for the same slot exactly one succeeds.

mod bookings;
mod filters;
mod repositories;
mod schedule;
mod tokens;
mod users;

pub use filters::{BookingFilter, BookingPredicate};
pub use repositories::{
    BookingRepository, ContactRepository, DeviceTokenRepository, ScheduleRepository,
};

use crate::errors::{AppResult, DatabaseError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, Transaction};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_FILE_CONNECTIONS: u32 = 8;

/// Database manager for all slotwise tables
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (creating if missing) the database at `database_url`
    ///
    /// An in-memory database is limited to one pooled connection so every
    /// query sees the same schema.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::ConnectionError` if the URL is malformed or the file cannot be opened
    pub async fn new(database_url: &str) -> Result<Self, DatabaseError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| DatabaseError::ConnectionError(format!("{database_url}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let max_connections = if database_url.contains(":memory:") {
            1
        } else {
            MAX_FILE_CONNECTIONS
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        info!(database.url = %database_url, pool.max = max_connections, "Database connected");
        Ok(Self { pool })
    }

    /// Create every table and index if missing
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::MigrationError` if any statement fails
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        self.migrate_users().await?;
        self.migrate_schedule().await?;
        self.migrate_bookings().await?;
        self.migrate_tokens().await?;
        info!("Database schema is up to date");
        Ok(())
    }

    async fn run_ddl(&self, statements: &[&str]) -> Result<(), DatabaseError> {
        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
        }
        Ok(())
    }
}

/// Start a write transaction that takes the SQLite write lock immediately
/// Open a write transaction holding the database write lock
///
/// Dropping the returned transaction without committing rolls it back, so
/// a cancelled caller never leaves the lock held on a pooled connection.
async fn begin_immediate(pool: &Pool<Sqlite>) -> AppResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

async fn finish_transaction<T>(tx: Transaction<'static, Sqlite>, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, "Rollback after failed write did not complete");
            }
            Err(error)
        }
    }
}

fn parse_uuid(field: &'static str, raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::InvalidData {
        field,
        reason: e.to_string(),
    })
}

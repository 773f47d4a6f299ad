// ABOUTME: Structured error types for database operations
// ABOUTME: Converts sqlx failures and row decoding problems into AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::{AppError, ErrorCode};
use thiserror::Error;

/// Database operation failures
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Entity lookup found nothing
    #[error("{entity_type} '{entity_id}' not found")]
    NotFound {
        /// Kind of entity (booking, employee, ...)
        entity_type: &'static str,
        /// Identifier that was looked up
        entity_id: String,
    },

    /// Query failed to execute
    #[error("Query failed: {context}")]
    QueryError {
        /// Failure description
        context: String,
    },

    /// Could not open or acquire a connection
    #[error("Connection failed: {0}")]
    ConnectionError(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationError(String),

    /// Stored row could not be decoded into a domain value
    #[error("Invalid stored value for '{field}': {reason}")]
    InvalidData {
        /// Column name
        field: &'static str,
        /// Why it could not be decoded
        reason: String,
    },
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::ConnectionError(error.to_string())
            }
            sqlx::Error::ColumnDecode { index, source } => Self::InvalidData {
                field: "column",
                reason: format!("{index}: {source}"),
            },
            other => Self::QueryError {
                context: other.to_string(),
            },
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound {
                entity_type,
                entity_id,
            } => Self::not_found(format!("{entity_type} {entity_id}")),
            other => Self::new(ErrorCode::DatabaseError, other.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::from(error).into()
    }
}

// ABOUTME: Unified error handling with standard error codes for the booking platform
// ABOUTME: Defines AppError, ErrorCode, ErrorContext and the AppResult alias
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Unified Error Handling System
//!
//! Every fallible operation on the booking path returns [`AppResult`]. The
//! [`ErrorCode`] decides whether an error may be shown to the person making the
//! booking (malformed input, unknown ids, lost slot races) or only logged.

/// Notification channel errors
pub mod channel;

/// Database error types with sqlx conversion
#[cfg(feature = "database-errors")]
pub mod database;

pub use channel::ChannelError;
#[cfg(feature = "database-errors")]
pub use database::DatabaseError;

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Malformed interval, id or other argument
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,

    // Resource Management (4000-4999)
    /// Unknown employee, client or booking
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,
    /// Requested slot is already taken
    #[serde(rename = "RESOURCE_CONFLICT")]
    ResourceConflict = 4001,

    // External Services (5000-5999)
    /// A notification backend failed a single send
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError = 5000,
    /// A notification backend is structurally unreachable
    #[serde(rename = "EXTERNAL_SERVICE_UNAVAILABLE")]
    ExternalServiceUnavailable = 5001,

    // Configuration (6000-6999)
    /// Generic configuration failure
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,
    /// Required configuration value is missing
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing = 6001,
    /// Configuration value could not be parsed
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Persistence layer failure
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
    /// Data serialization/deserialization failure
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// Whether the error may be surfaced to the client making a booking.
    ///
    /// Notification and infrastructure failures are observable only through
    /// logging; they never turn into a booking failure message.
    #[must_use]
    pub const fn is_user_visible(self) -> bool {
        matches!(
            self,
            Self::InvalidInput | Self::ResourceNotFound | Self::ResourceConflict
        )
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ResourceConflict => "The requested time slot is not available",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ExternalServiceUnavailable => "An external service is currently unavailable",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigMissing => "Required configuration is missing",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }
}

/// Additional context that can be attached to errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Booking ID if applicable
    pub booking_id: Option<Uuid>,
    /// Employee ID if applicable
    pub employee_id: Option<Uuid>,
    /// Additional key-value context
    pub details: serde_json::Value,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            booking_id: None,
            employee_id: None,
            details: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Attach the booking this error concerns
    #[must_use]
    pub fn with_booking_id(mut self, booking_id: Uuid) -> Self {
        self.context.booking_id = Some(booking_id);
        self
    }

    /// Attach the employee this error concerns
    #[must_use]
    pub fn with_employee_id(mut self, employee_id: Uuid) -> Self {
        self.context.employee_id = Some(employee_id);
        self
    }

    /// Add details to the error context
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.context.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Whether this error may be shown to the end user
    #[must_use]
    pub const fn is_user_visible(&self) -> bool {
        self.code.is_user_visible()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Convenience functions for creating common errors
impl AppError {
    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Slot conflict
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceConflict, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// External service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }
}

impl From<ChannelError> for AppError {
    fn from(error: ChannelError) -> Self {
        let code = if error.is_structural() {
            ErrorCode::ExternalServiceUnavailable
        } else {
            ErrorCode::ExternalServiceError
        };
        Self::new(code, error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_only_booking_path_errors_are_user_visible() {
        assert!(ErrorCode::InvalidInput.is_user_visible());
        assert!(ErrorCode::ResourceConflict.is_user_visible());
        assert!(ErrorCode::ResourceNotFound.is_user_visible());
        assert!(!ErrorCode::ExternalServiceUnavailable.is_user_visible());
        assert!(!ErrorCode::DatabaseError.is_user_visible());
    }

    #[test]
    fn test_app_error_creation() {
        let booking_id = Uuid::new_v4();
        let error = AppError::conflict("slot taken").with_booking_id(booking_id);

        assert_eq!(error.code, ErrorCode::ResourceConflict);
        assert_eq!(error.context.booking_id, Some(booking_id));
        assert!(error.to_string().contains("slot taken"));
    }

    #[test]
    fn test_channel_error_conversion_keeps_structural_distinction() {
        let unreachable = AppError::from(ChannelError::unreachable("push", "gateway down"));
        assert_eq!(unreachable.code, ErrorCode::ExternalServiceUnavailable);

        let failed = AppError::from(ChannelError::send_failed("email", "rejected"));
        assert_eq!(failed.code, ErrorCode::ExternalServiceError);
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::ResourceConflict).unwrap();
        assert_eq!(json, "\"RESOURCE_CONFLICT\"");
    }
}

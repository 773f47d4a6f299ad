// ABOUTME: Notification channel abstraction and concrete delivery adapters
// ABOUTME: Defines NotificationChannel/CalendarChannel traits plus email, push and calendar clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Slotwise Channels
//!
//! Every delivery mechanism implements one of two traits:
//!
//! - [`NotificationChannel`] sends a rendered message to a target (an email
//!   address or a set of push device tokens) and reports which targets the
//!   backend considers permanently invalid.
//! - [`CalendarChannel`] mirrors bookings into an external calendar.
//!
//! Adapters never retry. A failed send is reported once as a
//! [`ChannelError`]; whether anything happens next is the caller's decision.

/// Calendar API adapter
pub mod calendar;
/// Circuit breaker guarding a backend
pub mod circuit_breaker;
/// Placeholder adapter for channels without configuration
pub mod disabled;
/// Email relay adapter
pub mod email;
/// HTTP client construction and response classification
pub mod http_client;
/// Push gateway adapter
pub mod push;

pub use calendar::HttpCalendarChannel;
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use disabled::DisabledChannel;
pub use email::HttpEmailChannel;
pub use push::HttpPushChannel;
pub use slotwise_core::errors::ChannelError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use slotwise_core::models::TimeInterval;
use uuid::Uuid;

/// Rendered notification content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Subject line or push title
    pub title: String,
    /// Plain-text body
    pub body: String,
    /// Structured data for deep links (booking id, event kind)
    pub data: serde_json::Value,
}

/// Recipient of a notification send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A mailbox
    Email {
        /// Address
        address: String,
        /// Display name
        name: String,
    },
    /// Every active device of one user
    Devices {
        /// Owner of the devices
        user_id: Uuid,
        /// Active push tokens
        tokens: Vec<String>,
    },
}

impl Target {
    /// Short description for logs (never the full token list)
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Email { address, .. } => address.clone(),
            Self::Devices { user_id, tokens } => format!("{} device(s) of {user_id}", tokens.len()),
        }
    }
}

/// Successful delivery details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// Number of targets the backend accepted
    pub accepted: usize,
    /// Targets rejected as permanently invalid while others succeeded
    #[serde(default)]
    pub invalid_targets: Vec<String>,
}

impl DeliveryReport {
    /// Report for a single accepted target
    #[must_use]
    pub const fn single() -> Self {
        Self {
            accepted: 1,
            invalid_targets: Vec::new(),
        }
    }
}

/// A channel able to deliver a rendered notification
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Channel name used in outcomes and logs
    fn name(&self) -> &str;

    /// Whether the backend can currently be attempted at all
    ///
    /// `false` means a structural outage (not configured, circuit open), not
    /// a prediction that the next send succeeds.
    fn is_reachable(&self) -> bool {
        true
    }

    /// Send one notification
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::Unreachable` for structural outages and
    /// `ChannelError::SendFailed` when the backend rejected this send
    async fn send(
        &self,
        target: &Target,
        payload: &NotificationPayload,
    ) -> Result<DeliveryReport, ChannelError>;
}

/// Calendar entry mirrored from a booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    /// Booking the event mirrors
    pub booking_id: Uuid,
    /// Id from a previous upsert, if any
    pub external_id: Option<String>,
    /// Event title
    pub title: String,
    /// Event description
    pub description: String,
    /// Booked time
    pub interval: TimeInterval,
    /// Attendee email addresses
    pub attendees: Vec<String>,
}

/// External calendar synchronisation
#[async_trait]
pub trait CalendarChannel: Send + Sync {
    /// Channel name used in outcomes and logs
    fn name(&self) -> &str;

    /// Create or update the event, returning its external id
    ///
    /// # Errors
    ///
    /// Returns a `ChannelError` if the calendar backend rejects the event or is unreachable
    async fn upsert(&self, event: &CalendarEvent) -> Result<String, ChannelError>;

    /// Delete an event by external id; deleting an unknown event succeeds
    ///
    /// # Errors
    ///
    /// Returns a `ChannelError` if the calendar backend fails or is unreachable
    async fn delete(&self, external_event_id: &str) -> Result<(), ChannelError>;
}

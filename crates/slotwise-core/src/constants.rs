// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for reminders, channels, availability search and defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Constants organized by domain rather than in a single flat list.

/// Reminder windows relative to a booking's start
pub mod reminders {
    /// Lead time of the day-before reminder, in hours
    pub const DAY_BEFORE_LEAD_HOURS: i64 = 24;
    /// Lead time of the short-notice reminder, in hours
    pub const SHORT_NOTICE_LEAD_HOURS: i64 = 2;
    /// Default polling interval of the reminder loop, in seconds
    pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
}

/// Notification channel names and limits
pub mod channels {
    /// Email channel name
    pub const EMAIL: &str = "email";
    /// Push channel name
    pub const PUSH: &str = "push";
    /// Calendar channel name
    pub const CALENDAR: &str = "calendar";
    /// Default per-send timeout, in seconds
    pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 10;
    /// Default HTTP connect timeout, in seconds
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
    /// Consecutive push backend failures before the circuit opens
    pub const DEFAULT_PUSH_FAILURE_THRESHOLD: u32 = 5;
    /// Seconds an open push circuit waits before probing again
    pub const DEFAULT_PUSH_RECOVERY_SECS: u64 = 30;
}

/// Availability search
pub mod availability {
    /// Default step between candidate slot starts, in minutes
    pub const DEFAULT_SLOT_STEP_MINUTES: i64 = 15;
    /// ISO weekday number of Monday
    pub const FIRST_DAY_OF_WEEK: u8 = 1;
    /// ISO weekday number of Sunday
    pub const LAST_DAY_OF_WEEK: u8 = 7;
}

/// Service names for structured logging
pub mod service_names {
    /// Default service name
    pub const SLOTWISE: &str = "slotwise";
}

/// Default configuration values
pub mod defaults {
    /// Default SQLite database location
    pub const DATABASE_URL: &str = "sqlite:./data/slotwise.db";
    /// Default sender address for outgoing email
    pub const EMAIL_SENDER: &str = "bookings@localhost";
}

// ABOUTME: Booking model, lifecycle status and reminder kinds
// ABOUTME: Decides which bookings occupy a slot and which still accept reminders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::interval::TimeInterval;
use crate::constants::reminders::{DAY_BEFORE_LEAD_HOURS, SHORT_NOTICE_LEAD_HOURS};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Created, not yet confirmed
    Pending,
    /// Passed the availability check at insert time
    Confirmed,
    /// Cancelled by client or staff
    Cancelled,
    /// Service delivered
    Completed,
    /// Client did not show up
    NoShow,
}

impl BookingStatus {
    /// Statuses that hold a slot
    pub const OCCUPYING: [Self; 3] = [Self::Pending, Self::Confirmed, Self::Completed];

    /// Statuses that still receive reminders
    pub const REMINDABLE: [Self; 2] = [Self::Pending, Self::Confirmed];

    /// Stored representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
            Self::NoShow => "no_show",
        }
    }

    /// Cancelled and no-show bookings free their slot
    #[must_use]
    pub const fn occupies_slot(self) -> bool {
        !matches!(self, Self::Cancelled | Self::NoShow)
    }

    /// Cancellation and completion stop future reminders
    #[must_use]
    pub const fn accepts_reminders(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Whether a transition from `self` to `next` is allowed
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (
                    Self::Confirmed,
                    Self::Cancelled | Self::Completed | Self::NoShow
                )
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            "no_show" => Ok(Self::NoShow),
            other => Err(AppError::invalid_input(format!(
                "unknown booking status '{other}'"
            ))),
        }
    }
}

/// Which of the two reminders a booking receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Sent from 24h before the start until the short-notice window opens
    DayBefore,
    /// Sent during the last 2h before the start
    ShortNotice,
}

impl ReminderKind {
    /// Both reminder kinds, in firing order
    pub const ALL: [Self; 2] = [Self::DayBefore, Self::ShortNotice];

    /// How long before the start the window opens
    #[must_use]
    pub fn lead_time(self) -> TimeDelta {
        match self {
            Self::DayBefore => TimeDelta::hours(DAY_BEFORE_LEAD_HOURS),
            Self::ShortNotice => TimeDelta::hours(SHORT_NOTICE_LEAD_HOURS),
        }
    }

    /// How long before the start the window closes
    #[must_use]
    pub fn closes_before_start(self) -> TimeDelta {
        match self {
            Self::DayBefore => Self::ShortNotice.lead_time(),
            Self::ShortNotice => TimeDelta::zero(),
        }
    }

    /// Whether the reminder window for a booking starting at `start` is open at `now`
    #[must_use]
    pub fn window_open(self, start: NaiveDateTime, now: NaiveDateTime) -> bool {
        start - self.lead_time() <= now && now < start - self.closes_before_start()
    }

    /// Stable label for logs and templates
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DayBefore => "reminder_24h",
            Self::ShortNotice => "reminder_2h",
        }
    }
}

/// A client's reservation of an employee's time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    /// Booking id
    pub id: Uuid,
    /// Employee providing the service
    pub employee_id: Uuid,
    /// Client who booked
    pub client_id: Uuid,
    /// Service booked
    pub service_name: String,
    /// Reserved time
    pub interval: TimeInterval,
    /// Lifecycle status
    pub status: BookingStatus,
    /// Day-before reminder already dispatched
    pub reminder_sent: bool,
    /// Short-notice reminder already dispatched
    pub reminder_2h_sent: bool,
    /// Event id in the external calendar, once synced
    pub calendar_event_id: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Whether this booking makes `candidate` unavailable
    ///
    /// `excluding` lets an edit of this very booking ignore itself.
    #[must_use]
    pub fn blocks(&self, candidate: &TimeInterval, excluding: Option<Uuid>) -> bool {
        excluding != Some(self.id)
            && self.status.occupies_slot()
            && self.interval.overlaps(candidate)
    }

    /// Persisted idempotency flag for the given reminder
    #[must_use]
    pub const fn reminder_flag(&self, kind: ReminderKind) -> bool {
        match kind {
            ReminderKind::DayBefore => self.reminder_sent,
            ReminderKind::ShortNotice => self.reminder_2h_sent,
        }
    }

    /// Whether the reminder should be dispatched at `now`
    #[must_use]
    pub fn reminder_due(&self, kind: ReminderKind, now: NaiveDateTime) -> bool {
        self.status.accepts_reminders()
            && !self.reminder_flag(kind)
            && kind.window_open(self.interval.start(), now)
    }
}

/// Request to create a booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    /// Employee providing the service
    pub employee_id: Uuid,
    /// Client booking the slot
    pub client_id: Uuid,
    /// Service booked
    pub service_name: String,
    /// Requested time
    pub interval: TimeInterval,
}

impl NewBooking {
    /// Reject nil ids and empty service names before any lookup
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` describing the first malformed field
    pub fn validate(&self) -> AppResult<()> {
        if self.employee_id.is_nil() {
            return Err(AppError::invalid_input("employee_id must not be nil"));
        }
        if self.client_id.is_nil() {
            return Err(AppError::invalid_input("client_id must not be nil"));
        }
        if self.service_name.trim().is_empty() {
            return Err(AppError::invalid_input("service_name must not be empty"));
        }
        Ok(())
    }
}

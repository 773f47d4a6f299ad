// ABOUTME: Delivery routes and the per-event routing table
// ABOUTME: Maps each lifecycle event to the set of channel sends it requires
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::events::LifecycleEvent;
use serde::Serialize;
use std::fmt;

/// One (recipient, channel) leg of a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryRoute {
    /// Email to the client
    ClientEmail,
    /// Push to the client's devices
    ClientPush,
    /// Push to the employee's devices
    EmployeePush,
    /// Email to the employee, only as the push fallback
    EmployeeEmail,
    /// Create or update the calendar event
    CalendarUpsert,
    /// Remove the calendar event
    CalendarDelete,
}

impl DeliveryRoute {
    /// Stable label for logs and reports
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClientEmail => "client_email",
            Self::ClientPush => "client_push",
            Self::EmployeePush => "employee_push",
            Self::EmployeeEmail => "employee_email",
            Self::CalendarUpsert => "calendar_upsert",
            Self::CalendarDelete => "calendar_delete",
        }
    }

    /// Routes an event is planned onto
    ///
    /// `EmployeeEmail` never appears here; it only replaces `EmployeePush`
    /// when the push leg cannot be attempted.
    #[must_use]
    pub const fn plan(event: &LifecycleEvent) -> &'static [Self] {
        match event {
            LifecycleEvent::BookingConfirmed(_) => &[
                Self::ClientEmail,
                Self::ClientPush,
                Self::EmployeePush,
                Self::CalendarUpsert,
            ],
            LifecycleEvent::ReminderDue { .. } => &[Self::ClientEmail, Self::ClientPush],
            LifecycleEvent::BookingCancelled(_) => &[Self::CalendarDelete],
        }
    }
}

impl fmt::Display for DeliveryRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ABOUTME: Booking lifecycle events that trigger notification dispatch
// ABOUTME: Each event carries the booking together with the resolved client and employee contacts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::database::ContactRepository;
use crate::errors::{AppError, AppResult};
use crate::models::{Booking, Contact, ReminderKind};
use uuid::Uuid;

/// A booking with both parties resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingNotice {
    /// The booking being announced
    pub booking: Booking,
    /// Client who booked
    pub client: Contact,
    /// Employee providing the service
    pub employee: Contact,
}

impl BookingNotice {
    /// Look up both parties of `booking`
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if either contact is missing, or a storage error
    pub async fn resolve(booking: Booking, contacts: &dyn ContactRepository) -> AppResult<Self> {
        let client = contacts
            .get_contact(booking.client_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Client {}", booking.client_id)))?;
        let employee = contacts
            .get_contact(booking.employee_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Employee {}", booking.employee_id))
                    .with_employee_id(booking.employee_id)
            })?;
        Ok(Self {
            booking,
            client,
            employee,
        })
    }
}

/// Lifecycle transitions the orchestrator fans out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Booking created or moved to a new slot
    BookingConfirmed(BookingNotice),
    /// A reminder window opened
    ReminderDue {
        /// Booking to remind about
        notice: BookingNotice,
        /// Which reminder
        kind: ReminderKind,
    },
    /// Booking cancelled
    BookingCancelled(BookingNotice),
}

impl LifecycleEvent {
    /// Booking and contacts the event is about
    #[must_use]
    pub const fn notice(&self) -> &BookingNotice {
        match self {
            Self::BookingConfirmed(notice)
            | Self::BookingCancelled(notice)
            | Self::ReminderDue { notice, .. } => notice,
        }
    }

    /// Event label used in payload data and logs
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::BookingConfirmed(_) => "booking_confirmed",
            Self::ReminderDue { kind, .. } => kind.as_str(),
            Self::BookingCancelled(_) => "booking_cancelled",
        }
    }

    /// Id of the booking the event is about
    #[must_use]
    pub const fn booking_id(&self) -> Uuid {
        self.notice().booking.id
    }
}

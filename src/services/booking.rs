// ABOUTME: Booking lifecycle workflows with notification side effects
// ABOUTME: Book, reschedule, cancel, complete and no-show transitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::availability::AvailabilityChecker;
use crate::database::{BookingRepository, ContactRepository};
use crate::errors::{AppError, AppResult};
use crate::models::{Booking, BookingStatus, Contact, NewBooking, TimeInterval, UserRole};
use crate::notifications::{
    BookingNotice, DeliveryRoute, DispatchReport, LifecycleEvent, NotificationOrchestrator,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Booking after a workflow step, with the notifications it triggered
#[derive(Debug, Clone, Serialize)]
pub struct BookingOutcome {
    /// Booking as persisted
    pub booking: Booking,
    /// Per-route notification outcomes (empty when nothing was dispatched)
    pub notifications: DispatchReport,
}

/// Booking workflows for one business
#[derive(Clone)]
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    contacts: Arc<dyn ContactRepository>,
    availability: AvailabilityChecker,
    orchestrator: NotificationOrchestrator,
}

impl BookingService {
    /// Create the service from its collaborators
    #[must_use]
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        contacts: Arc<dyn ContactRepository>,
        availability: AvailabilityChecker,
        orchestrator: NotificationOrchestrator,
    ) -> Self {
        Self {
            bookings,
            contacts,
            availability,
            orchestrator,
        }
    }

    async fn party(&self, user_id: Uuid, role: UserRole) -> AppResult<Contact> {
        let label = match role {
            UserRole::Client => "Client",
            UserRole::Employee => "Employee",
        };
        match self.contacts.get_contact(user_id).await? {
            Some(contact) if contact.role == role => Ok(contact),
            _ => Err(AppError::not_found(format!("{label} {user_id}"))),
        }
    }

    async fn load(&self, booking_id: Uuid) -> AppResult<Booking> {
        self.bookings
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {booking_id}")).with_booking_id(booking_id))
    }

    /// Book a slot and announce it
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for malformed requests, `ResourceNotFound` for
    /// unknown parties and `ResourceConflict` when the slot is not bookable
    /// or was taken concurrently
    pub async fn book(&self, request: NewBooking) -> AppResult<BookingOutcome> {
        request.validate()?;
        let client = self.party(request.client_id, UserRole::Client).await?;
        let employee = self.party(request.employee_id, UserRole::Employee).await?;

        self.availability
            .check(request.employee_id, &request.interval, None)
            .await?
            .into_result(request.employee_id, &request.interval)?;

        let booking = self.bookings.insert_booking(&request).await?;
        info!(
            booking.id = %booking.id,
            employee.id = %booking.employee_id,
            slot = %booking.interval,
            "Booking created"
        );
        Ok(self.announce_confirmed(BookingNotice { booking, client, employee }).await)
    }

    /// Move a booking to `[start, end)` and announce the new slot
    ///
    /// The booking's own slot is ignored by the availability check, and both
    /// reminder flags are reset.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown booking, `InvalidInput` for
    /// a terminal booking or a reversed interval and `ResourceConflict` when
    /// the new slot is not bookable
    pub async fn reschedule(
        &self,
        booking_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> AppResult<BookingOutcome> {
        let interval = TimeInterval::new(start, end)?;
        let current = self.load(booking_id).await?;

        self.availability
            .check(current.employee_id, &interval, Some(booking_id))
            .await?
            .into_result(current.employee_id, &interval)?;

        let booking = self.bookings.reschedule_booking(booking_id, interval).await?;
        let notice = BookingNotice::resolve(booking, self.contacts.as_ref()).await?;
        Ok(self.announce_confirmed(notice).await)
    }

    async fn announce_confirmed(&self, notice: BookingNotice) -> BookingOutcome {
        let notifications = self
            .orchestrator
            .dispatch(&LifecycleEvent::BookingConfirmed(notice.clone()))
            .await;

        let mut booking = notice.booking;
        let synced = notifications
            .get(&DeliveryRoute::CalendarUpsert)
            .filter(|outcome| outcome.success)
            .and_then(|outcome| outcome.external_ref.clone());
        if let Some(event_id) = synced {
            if booking.calendar_event_id.as_deref() != Some(event_id.as_str()) {
                match self.bookings.set_calendar_event_id(booking.id, Some(&event_id)).await {
                    Ok(()) => booking.calendar_event_id = Some(event_id),
                    Err(e) => warn!(booking.id = %booking.id, error = %e, "Failed to store calendar event id"),
                }
            }
        }

        BookingOutcome {
            booking,
            notifications,
        }
    }

    /// Cancel a pending or confirmed booking and remove its calendar event
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown booking and `InvalidInput`
    /// if the booking is already terminal
    pub async fn cancel(&self, booking_id: Uuid) -> AppResult<BookingOutcome> {
        let mut booking = self.bookings.update_status(booking_id, BookingStatus::Cancelled).await?;

        let notice = match BookingNotice::resolve(booking.clone(), self.contacts.as_ref()).await {
            Ok(notice) => notice,
            Err(e) => {
                warn!(booking.id = %booking_id, error = %e, "Cancelled without notifications");
                return Ok(BookingOutcome {
                    booking,
                    notifications: DispatchReport::new(),
                });
            }
        };

        let notifications = self
            .orchestrator
            .dispatch(&LifecycleEvent::BookingCancelled(notice))
            .await;

        let removed = notifications
            .get(&DeliveryRoute::CalendarDelete)
            .is_some_and(|outcome| outcome.success);
        if removed && booking.calendar_event_id.is_some() {
            match self.bookings.set_calendar_event_id(booking_id, None).await {
                Ok(()) => booking.calendar_event_id = None,
                Err(e) => warn!(booking.id = %booking_id, error = %e, "Failed to clear calendar event id"),
            }
        }

        Ok(BookingOutcome {
            booking,
            notifications,
        })
    }

    /// Mark a confirmed booking as delivered
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown booking and `InvalidInput`
    /// if the booking is not confirmed
    pub async fn complete(&self, booking_id: Uuid) -> AppResult<Booking> {
        self.bookings.update_status(booking_id, BookingStatus::Completed).await
    }

    /// Mark a confirmed booking as missed by the client, freeing its slot
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown booking and `InvalidInput`
    /// if the booking is not confirmed
    pub async fn mark_no_show(&self, booking_id: Uuid) -> AppResult<Booking> {
        self.bookings.update_status(booking_id, BookingStatus::NoShow).await
    }
}

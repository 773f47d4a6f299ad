// ABOUTME: Repository traits the booking core reads and writes through
// ABOUTME: Schedule, booking, device token and contact access behind async trait objects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::BookingFilter;
use crate::errors::AppResult;
use crate::models::{
    Absence, Booking, BookingStatus, Contact, DeviceToken, NewBooking, ReminderKind,
    TimeInterval, WorkShift,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

/// Read-only view of an employee's schedule
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Whether a user with the employee role exists
    async fn employee_exists(&self, employee_id: Uuid) -> AppResult<bool>;

    /// Shifts and breaks of one ISO weekday
    async fn get_shifts(&self, employee_id: Uuid, day_of_week: u8) -> AppResult<Vec<WorkShift>>;

    /// Absences (approved or not) touching `range`
    async fn get_absences(&self, employee_id: Uuid, range: &TimeInterval) -> AppResult<Vec<Absence>>;

    /// Slot-occupying bookings overlapping `interval`, optionally ignoring one booking
    async fn get_overlapping_bookings(
        &self,
        employee_id: Uuid,
        interval: &TimeInterval,
        excluding: Option<Uuid>,
    ) -> AppResult<Vec<Booking>>;
}

/// Booking persistence
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a confirmed booking unless it overlaps an occupying booking
    ///
    /// Returns `ResourceConflict` when the slot was taken, including by a
    /// concurrent insert.
    async fn insert_booking(&self, booking: &NewBooking) -> AppResult<Booking>;

    /// Fetch one booking
    async fn get_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>>;

    /// Move a booking to a new interval and reset both reminder flags
    async fn reschedule_booking(&self, booking_id: Uuid, interval: TimeInterval) -> AppResult<Booking>;

    /// Apply a status transition, rejecting transitions the lifecycle forbids
    async fn update_status(&self, booking_id: Uuid, status: BookingStatus) -> AppResult<Booking>;

    /// Store (or clear) the external calendar event id
    async fn set_calendar_event_id(&self, booking_id: Uuid, event_id: Option<&str>) -> AppResult<()>;

    /// Bookings whose `kind` reminder window is open at `now` and not yet sent
    async fn due_for_reminder(&self, kind: ReminderKind, now: NaiveDateTime) -> AppResult<Vec<Booking>>;

    /// Set the idempotency flag of one reminder
    async fn mark_reminder_sent(&self, booking_id: Uuid, kind: ReminderKind) -> AppResult<()>;

    /// Bookings matching a typed filter
    async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>>;
}

/// Push device token storage
#[async_trait]
pub trait DeviceTokenRepository: Send + Sync {
    /// Active tokens of a user
    async fn active_tokens(&self, user_id: Uuid) -> AppResult<Vec<String>>;

    /// Register (or re-activate) a token for a user
    async fn register_token(&self, user_id: Uuid, token: &str, platform: &str) -> AppResult<DeviceToken>;

    /// Deactivate tokens the push provider reported as invalid, returning how many changed
    async fn deactivate_tokens(&self, tokens: &[String]) -> AppResult<u64>;
}

/// Contact lookup for clients and employees
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Contact details of a user
    async fn get_contact(&self, user_id: Uuid) -> AppResult<Option<Contact>>;
}

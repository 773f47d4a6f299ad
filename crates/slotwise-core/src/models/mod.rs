// ABOUTME: Core data models for scheduling, bookings and notifications
// ABOUTME: Re-exports interval, schedule, booking, contact and outcome types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Booking, status and reminder kinds
pub mod booking;
/// Contacts and device tokens
pub mod contact;
/// Half-open time intervals
pub mod interval;
/// Per-channel notification outcomes
pub mod notification;
/// Work shifts and absences
pub mod schedule;

pub use booking::{Booking, BookingStatus, NewBooking, ReminderKind};
pub use contact::{Contact, DeviceToken, UserRole};
pub use interval::TimeInterval;
pub use notification::NotificationOutcome;
pub use schedule::{Absence, DateRange, WorkShift};

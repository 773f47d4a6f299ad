// ABOUTME: Booking lifecycle notifications across email, push and calendar channels
// ABOUTME: Events, routing table, message templates and the concurrent orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Notifications
//!
//! A [`LifecycleEvent`] is planned onto a fixed set of [`DeliveryRoute`]s:
//!
//! | Event              | Routes                                                  |
//! |--------------------|---------------------------------------------------------|
//! | `BookingConfirmed` | client email, client push, employee push, calendar upsert |
//! | `ReminderDue`      | client email, client push                               |
//! | `BookingCancelled` | calendar delete                                         |
//!
//! Employee push falls back to employee email when the employee has no active
//! device or the push backend is structurally unreachable.

mod events;
mod orchestrator;
mod routing;
mod templates;

pub use events::{BookingNotice, LifecycleEvent};
pub use orchestrator::{DispatchReport, NotificationOrchestrator};
pub use routing::DeliveryRoute;
pub use templates::{calendar_event, client_payload, employee_payload};

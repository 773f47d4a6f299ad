// ABOUTME: Domain service layer for booking workflows
// ABOUTME: Combines availability, storage and notification dispatch behind one entry point
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Domain service layer
//!
//! Services hold the business rules shared by every entry point (server,
//! CLI, tests). Notification failures never fail a workflow; they are
//! returned alongside the booking and logged.

/// Booking lifecycle operations: book, reschedule, cancel, complete
pub mod booking;

pub use booking::{BookingOutcome, BookingService};

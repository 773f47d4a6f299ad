// ABOUTME: Main library entry point for the slotwise booking platform
// ABOUTME: Availability checking, booking storage, notification fan-out and reminder scheduling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Slotwise
//!
//! Booking core for a single business: clients book time slots with staff,
//! no staff member is ever double-booked, and every booking lifecycle
//! transition is announced to the client, the employee and an external
//! calendar.
//!
//! ## Architecture
//!
//! - **availability**: decides whether a candidate interval is bookable
//!   against working hours, breaks, absences and existing bookings
//! - **database**: SQLite storage and the repository traits the core reads
//!   through; the booking insert is the authoritative double-booking guard
//! - **notifications**: lifecycle events fanned out concurrently to email,
//!   push and calendar channels with push-to-email fallback
//! - **reminders**: periodic trigger dispatching the 24h and 2h reminders
//!   exactly once per booking
//! - **services**: booking workflows tying the pieces together
//! - **context**: explicit construction of every dependency at startup

/// Slot availability decisions
pub mod availability;

/// Environment-based configuration
pub mod config;

/// Dependency wiring performed once at startup
pub mod context;

/// SQLite storage and repository traits
pub mod database;

/// Structured logging setup and helpers
pub mod logging;

/// Lifecycle events and multi-channel dispatch
pub mod notifications;

/// Periodic reminder dispatch
pub mod reminders;

/// Booking workflows
pub mod services;

/// Error types shared across the workspace
pub use slotwise_core::errors;

/// Domain models shared across the workspace
pub use slotwise_core::models;

/// Application constants
pub use slotwise_core::constants;

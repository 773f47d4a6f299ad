// ABOUTME: Core types and constants for the slotwise booking platform
// ABOUTME: Foundation crate with error handling, time intervals, booking models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Slotwise Core
//!
//! Foundation crate providing shared types and constants for the slotwise
//! booking platform. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and domain-specific errors
//! - **constants**: Application-wide constants organized by domain
//! - **models**: Time intervals, schedules, bookings, contacts and notification outcomes

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants and default values organized by domain
pub mod constants;

/// Core data models (`TimeInterval`, `WorkShift`, `Booking`, etc.)
pub mod models;

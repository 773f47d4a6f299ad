// ABOUTME: Re-exports command modules for slotwise-cli
// ABOUTME: Schedule, user and reminder subcommand handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

pub mod reminders;
pub mod schedule;
pub mod users;

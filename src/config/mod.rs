// ABOUTME: Configuration module root
// ABOUTME: Environment-only configuration for storage, channels and reminders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Environment variable parsing into a typed `ServerConfig`
pub mod environment;

pub use environment::{
    ChannelConfig, DatabaseConfig, DatabaseUrl, Environment, LogLevel, ReminderConfig,
    ServerConfig,
};

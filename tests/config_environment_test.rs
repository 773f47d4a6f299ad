// ABOUTME: Unit tests for environment configuration
// ABOUTME: Validates parsing of log level, environment, database URL and channel settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use serial_test::serial;
use slotwise::config::{DatabaseUrl, Environment, LogLevel, ServerConfig};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_VARS: [&str; 14] = [
    "DATABASE_URL",
    "ENVIRONMENT",
    "RUST_LOG",
    "AUTO_MIGRATE",
    "EMAIL_RELAY_URL",
    "EMAIL_SENDER",
    "PUSH_GATEWAY_URL",
    "CALENDAR_API_URL",
    "CHANNEL_TIMEOUT_SECS",
    "HTTP_CONNECT_TIMEOUT_SECS",
    "PUSH_FAILURE_THRESHOLD",
    "PUSH_RECOVERY_TIMEOUT_SECS",
    "REMINDER_POLL_INTERVAL_SECS",
    "BUSINESS_UTC_OFFSET_MINUTES",
];

fn clear_config_env() {
    for key in CONFIG_VARS {
        env::remove_var(key);
    }
    env::remove_var("REMINDERS_ENABLED");
}

#[test]
fn test_log_level_parsing() {
    assert_eq!(LogLevel::from_str_or_default("error"), LogLevel::Error);
    assert_eq!(LogLevel::from_str_or_default("WARN"), LogLevel::Warn);
    assert_eq!(LogLevel::from_str_or_default("info"), LogLevel::Info);
    assert_eq!(LogLevel::from_str_or_default("Debug"), LogLevel::Debug);
    assert_eq!(LogLevel::from_str_or_default("trace"), LogLevel::Trace);
    assert_eq!(LogLevel::from_str_or_default("invalid"), LogLevel::Info);
}

#[test]
fn test_environment_parsing() {
    assert_eq!(
        Environment::from_str_or_default("production"),
        Environment::Production
    );
    assert_eq!(
        Environment::from_str_or_default("PROD"),
        Environment::Production
    );
    assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
    assert_eq!(
        Environment::from_str_or_default("anything"),
        Environment::Development
    );
    assert!(Environment::Production.is_production());
    assert!(!Environment::Testing.is_production());
}

#[test]
fn test_database_url_parsing() {
    assert_eq!(
        DatabaseUrl::parse_url("sqlite::memory:").unwrap(),
        DatabaseUrl::Memory
    );
    assert_eq!(
        DatabaseUrl::parse_url("sqlite:./data/slotwise.db").unwrap(),
        DatabaseUrl::SQLite {
            path: PathBuf::from("./data/slotwise.db")
        }
    );
    assert_eq!(
        DatabaseUrl::parse_url("sqlite:///var/lib/slotwise.db").unwrap(),
        DatabaseUrl::SQLite {
            path: PathBuf::from("/var/lib/slotwise.db")
        }
    );
    assert!(DatabaseUrl::parse_url("postgresql://localhost/slotwise").is_err());
    assert!(DatabaseUrl::parse_url("sqlite:").is_err());
}

#[test]
fn test_database_url_connection_string() {
    assert_eq!(DatabaseUrl::Memory.to_connection_string(), "sqlite::memory:");
    assert!(DatabaseUrl::Memory.is_memory());

    let file = DatabaseUrl::SQLite {
        path: PathBuf::from("bookings.db"),
    };
    assert_eq!(file.to_connection_string(), "sqlite:bookings.db");
    assert!(!file.is_memory());
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_config_env();

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.database.auto_migrate);
    assert!(config.channels.email_relay_url.is_none());
    assert!(config.channels.push_gateway_url.is_none());
    assert!(config.channels.calendar_api_url.is_none());
    assert_eq!(config.channels.email_sender, "bookings@localhost");
    assert_eq!(config.channels.send_timeout, Duration::from_secs(10));
    assert_eq!(config.channels.push_failure_threshold, 5);
    assert!(config.reminders.enabled);
    assert_eq!(config.reminders.poll_interval, Duration::from_secs(60));
    assert_eq!(config.business_offset.local_minus_utc(), 0);
    assert!(config.summary().contains("email=disabled"));
}

#[test]
#[serial]
fn test_from_env_reads_overrides() {
    clear_config_env();
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("ENVIRONMENT", "production");
    env::set_var("AUTO_MIGRATE", "off");
    env::set_var("EMAIL_RELAY_URL", "https://relay.example.com/send");
    env::set_var("PUSH_GATEWAY_URL", "   ");
    env::set_var("CHANNEL_TIMEOUT_SECS", "3");
    env::set_var("REMINDERS_ENABLED", "false");
    env::set_var("BUSINESS_UTC_OFFSET_MINUTES", "120");

    let config = ServerConfig::from_env().unwrap();

    assert!(config.database.url.is_memory());
    assert!(config.environment.is_production());
    assert!(!config.database.auto_migrate);
    assert_eq!(
        config.channels.email_relay_url.as_deref(),
        Some("https://relay.example.com/send")
    );
    // Blank values count as unset
    assert!(config.channels.push_gateway_url.is_none());
    assert_eq!(config.channels.send_timeout, Duration::from_secs(3));
    assert!(!config.reminders.enabled);
    assert_eq!(config.business_offset.local_minus_utc(), 7200);
    assert!(config.summary().contains("email=configured"));

    clear_config_env();
}

#[test]
#[serial]
fn test_from_env_rejects_malformed_values() {
    clear_config_env();

    env::set_var("CHANNEL_TIMEOUT_SECS", "0");
    assert!(ServerConfig::from_env().is_err());
    env::set_var("CHANNEL_TIMEOUT_SECS", "soon");
    assert!(ServerConfig::from_env().is_err());
    env::remove_var("CHANNEL_TIMEOUT_SECS");

    env::set_var("AUTO_MIGRATE", "maybe");
    assert!(ServerConfig::from_env().is_err());
    env::remove_var("AUTO_MIGRATE");

    env::set_var("PUSH_FAILURE_THRESHOLD", "0");
    assert!(ServerConfig::from_env().is_err());
    env::remove_var("PUSH_FAILURE_THRESHOLD");

    env::set_var("DATABASE_URL", "mysql://localhost/bookings");
    assert!(ServerConfig::from_env().is_err());
    env::remove_var("DATABASE_URL");

    env::set_var("BUSINESS_UTC_OFFSET_MINUTES", "100000");
    assert!(ServerConfig::from_env().is_err());

    clear_config_env();
}

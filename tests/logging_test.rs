// ABOUTME: Unit tests for logging configuration
// ABOUTME: Validates environment parsing, defaults and format selection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use serial_test::serial;
use slotwise::logging::{LogFormat, LoggingConfig};
use std::env;

const LOGGING_VARS: [&str; 6] = [
    "RUST_LOG",
    "LOG_FORMAT",
    "ENVIRONMENT",
    "SERVICE_NAME",
    "LOG_INCLUDE_LOCATION",
    "LOG_INCLUDE_SPANS",
];

fn clear_logging_env() {
    for key in LOGGING_VARS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_logging_config_from_env() {
    clear_logging_env();
    env::set_var("RUST_LOG", "debug");
    env::set_var("LOG_FORMAT", "json");
    env::set_var("ENVIRONMENT", "production");
    env::set_var("SERVICE_NAME", "slotwise-test");

    let config = LoggingConfig::from_env();

    assert_eq!(config.level, "debug");
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.environment, "production");
    assert_eq!(config.service_name, "slotwise-test");
    // Production always carries location and thread
    assert!(config.include_location);
    assert!(config.include_thread);
    assert!(!config.include_spans);

    clear_logging_env();
}

#[test]
#[serial]
fn test_development_opt_in_flags() {
    clear_logging_env();
    env::set_var("LOG_INCLUDE_LOCATION", "1");
    env::set_var("LOG_INCLUDE_SPANS", "1");

    let config = LoggingConfig::from_env();
    assert!(config.include_location);
    assert!(!config.include_thread);
    assert!(config.include_spans);

    clear_logging_env();
}

#[test]
fn test_default_logging_config() {
    let config = LoggingConfig::default();

    assert_eq!(config.level, "info");
    assert_eq!(config.format, LogFormat::Pretty);
    assert_eq!(config.environment, "development");
    assert_eq!(config.service_name, "slotwise");
    assert!(!config.include_location);
}

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str_or_default("json"), LogFormat::Json);
    assert_eq!(LogFormat::from_str_or_default("compact"), LogFormat::Compact);
    assert_eq!(LogFormat::from_str_or_default("pretty"), LogFormat::Pretty);
    assert_eq!(LogFormat::from_str_or_default(""), LogFormat::Pretty);
}

#[test]
fn test_env_filter_accepts_configured_level() {
    let config = LoggingConfig {
        level: "slotwise=debug".to_owned(),
        ..LoggingConfig::default()
    };
    let rendered = config.env_filter().to_string();
    assert!(rendered.contains("slotwise=debug"));
    assert!(rendered.contains("sqlx=warn"));
}

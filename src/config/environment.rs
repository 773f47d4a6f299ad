// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses environment variables into typed storage, channel and reminder settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-based configuration management

use crate::constants::{channels, defaults, reminders};
use anyhow::{anyhow, bail, Context, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::env;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational (default)
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(label)
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development (default)
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        };
        f.write_str(label)
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// SQLite database file
    SQLite {
        /// File path
        path: PathBuf,
    },
    /// In-memory SQLite (tests and one-off CLI runs)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns an error for anything other than a `sqlite:` URL
    pub fn parse_url(s: &str) -> Result<Self> {
        let Some(path) = s.strip_prefix("sqlite:") else {
            bail!("Unsupported database URL '{s}': only sqlite: URLs are supported");
        };
        let path = path.trim_start_matches("//");
        if path == ":memory:" {
            return Ok(Self::Memory);
        }
        if path.is_empty() {
            bail!("Database URL '{s}' has no file path");
        }
        Ok(Self::SQLite {
            path: PathBuf::from(path),
        })
    }

    /// Connection string understood by sqlx
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Whether this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

/// Storage settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
    /// Create missing tables at startup
    pub auto_migrate: bool,
}

/// Delivery backend settings
///
/// A channel whose URL is unset is wired as a disabled channel.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Email relay endpoint
    pub email_relay_url: Option<String>,
    /// From address for outgoing email
    pub email_sender: String,
    /// Push gateway endpoint
    pub push_gateway_url: Option<String>,
    /// Calendar API base URL
    pub calendar_api_url: Option<String>,
    /// Upper bound on a single send
    pub send_timeout: Duration,
    /// TCP connect timeout of the shared HTTP client
    pub connect_timeout: Duration,
    /// Consecutive push backend failures before the circuit opens
    pub push_failure_threshold: u32,
    /// How long an open push circuit stays open
    pub push_recovery_timeout: Duration,
}

/// Reminder loop settings
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    /// Run the reminder loop in the server
    pub enabled: bool,
    /// Delay between polls
    pub poll_interval: Duration,
}

/// Complete process configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Base log level
    pub log_level: LogLevel,
    /// Storage
    pub database: DatabaseConfig,
    /// Delivery backends
    pub channels: ChannelConfig,
    /// Reminder loop
    pub reminders: ReminderConfig,
    /// Offset of the business wall clock from UTC
    pub business_offset: FixedOffset,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let database_url = env_var_or("DATABASE_URL", defaults::DATABASE_URL);
        let config = Self {
            environment: Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development")),
            log_level: LogLevel::from_str_or_default(&env_var_or("RUST_LOG", "info")),
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&database_url)
                    .with_context(|| format!("Invalid DATABASE_URL '{database_url}'"))?,
                auto_migrate: parse_bool("AUTO_MIGRATE", true)?,
            },
            channels: ChannelConfig {
                email_relay_url: optional_env("EMAIL_RELAY_URL"),
                email_sender: env_var_or("EMAIL_SENDER", defaults::EMAIL_SENDER),
                push_gateway_url: optional_env("PUSH_GATEWAY_URL"),
                calendar_api_url: optional_env("CALENDAR_API_URL"),
                send_timeout: positive_secs(
                    "CHANNEL_TIMEOUT_SECS",
                    channels::DEFAULT_SEND_TIMEOUT_SECS,
                )?,
                connect_timeout: positive_secs(
                    "HTTP_CONNECT_TIMEOUT_SECS",
                    channels::DEFAULT_CONNECT_TIMEOUT_SECS,
                )?,
                push_failure_threshold: parse_env(
                    "PUSH_FAILURE_THRESHOLD",
                    channels::DEFAULT_PUSH_FAILURE_THRESHOLD,
                )?,
                push_recovery_timeout: positive_secs(
                    "PUSH_RECOVERY_TIMEOUT_SECS",
                    channels::DEFAULT_PUSH_RECOVERY_SECS,
                )?,
            },
            reminders: ReminderConfig {
                enabled: parse_bool("REMINDERS_ENABLED", true)?,
                poll_interval: positive_secs(
                    "REMINDER_POLL_INTERVAL_SECS",
                    reminders::DEFAULT_POLL_INTERVAL_SECS,
                )?,
            },
            business_offset: business_offset(parse_env("BUSINESS_UTC_OFFSET_MINUTES", 0_i32)?)?,
        };

        if config.channels.push_failure_threshold == 0 {
            bail!("PUSH_FAILURE_THRESHOLD must be at least 1");
        }

        Ok(config)
    }

    /// One-line description of the loaded configuration for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        let channel_state = |url: &Option<String>| if url.is_some() { "configured" } else { "disabled" };
        format!(
            "environment={} database={} email={} push={} calendar={} send_timeout={}s reminders={} (every {}s) business_offset={}",
            self.environment,
            self.database.url.to_connection_string(),
            channel_state(&self.channels.email_relay_url),
            channel_state(&self.channels.push_gateway_url),
            channel_state(&self.channels.calendar_api_url),
            self.channels.send_timeout.as_secs(),
            if self.reminders.enabled { "on" } else { "off" },
            self.reminders.poll_interval.as_secs(),
            self.business_offset,
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Non-empty environment variable
fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid value '{raw}' for {key}")),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, default: bool) -> Result<bool> {
    let Some(raw) = optional_env(key) else {
        return Ok(default);
    };
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("Invalid boolean '{raw}' for {key}")),
    }
}

fn positive_secs(key: &str, default: u64) -> Result<Duration> {
    let secs: u64 = parse_env(key, default)?;
    if secs == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}

fn business_offset(minutes: i32) -> Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| anyhow!("BUSINESS_UTC_OFFSET_MINUTES out of range: {minutes}"))
}

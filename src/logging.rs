// ABOUTME: Logging configuration and structured logging setup for observability and debugging
// ABOUTME: Configures log levels, formatters, noise filters and domain-specific structured log helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Structured logging configuration

use crate::availability::AvailabilityDecision;
use crate::constants::service_names;
use crate::models::{BookingStatus, NotificationOutcome, TimeInterval};
use crate::notifications::DeliveryRoute;
use anyhow::Result;
use serde_json::json;
use std::collections::BTreeMap;
use std::env;
use std::io;
use tracing::{info, warn, Level};
use tracing_subscriber::{
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use uuid::Uuid;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include thread information
    pub include_thread: bool,
    /// Include span open/close events
    pub include_spans: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (development, testing, production)
    pub environment: String,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
}

impl LogFormat {
    /// Parse the `LOG_FORMAT` value, defaulting to pretty
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_thread: false,
            include_spans: false,
            service_name: service_names::SLOTWISE.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
        let format = LogFormat::from_str_or_default(env::var("LOG_FORMAT").as_deref().unwrap_or(""));
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        // Production always carries location and thread details
        let is_production = environment == "production";

        Self {
            level,
            format,
            include_location: is_production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_thread: is_production || env::var("LOG_INCLUDE_THREAD").is_ok(),
            include_spans: env::var("LOG_INCLUDE_SPANS").is_ok(),
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| service_names::SLOTWISE.into()),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment,
        }
    }

    /// Filter combining the configured level with fixed noise reduction
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        let directive = |text: &str, fallback: Level| -> Directive {
            text.parse().unwrap_or_else(|_| fallback.into())
        };

        EnvFilter::new(&self.level)
            .add_directive(directive("hyper=warn", Level::WARN))
            .add_directive(directive("hyper_util=warn", Level::WARN))
            .add_directive(directive("reqwest=warn", Level::WARN))
            .add_directive(directive("rustls=warn", Level::WARN))
            .add_directive(directive("sqlx=warn", Level::WARN))
            .add_directive(directive("sqlx::query=warn", Level::WARN))
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let span_events = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        match self.format {
            LogFormat::Json => {
                let layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_thread_ids(self.include_thread)
                    .with_thread_names(self.include_thread)
                    .with_target(true)
                    .with_writer(io::stdout)
                    .with_span_events(span_events)
                    .json();
                registry.with(layer).try_init()?;
            }
            LogFormat::Pretty => {
                let layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_thread_ids(self.include_thread)
                    .with_thread_names(self.include_thread)
                    .with_target(true)
                    .with_writer(io::stdout)
                    .with_span_events(span_events);
                registry.with(layer).try_init()?;
            }
            LogFormat::Compact => {
                let layer = fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stdout)
                    .with_span_events(FmtSpan::NONE);
                registry.with(layer).try_init()?;
            }
        }

        self.log_startup_info();
        Ok(())
    }

    fn log_startup_info(&self) {
        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            "Slotwise starting up"
        );

        let config_summary = json!({
            "service": {
                "name": self.service_name,
                "version": self.service_version,
                "environment": self.environment
            },
            "logging": {
                "level": self.level,
                "format": format!("{:?}", self.format),
                "location": self.include_location,
                "thread": self.include_thread,
                "spans": self.include_spans
            }
        });
        info!("Logging configured: {config_summary}");
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Application-specific logging utilities
pub struct AppLogger;

impl AppLogger {
    /// Log the result of an availability check
    pub fn log_availability_decision(
        employee_id: Uuid,
        candidate: &TimeInterval,
        decision: &AvailabilityDecision,
    ) {
        info!(
            employee.id = %employee_id,
            slot.start = %candidate.start(),
            slot.end = %candidate.end(),
            availability.decision = %decision.as_str(),
            availability.available = decision.is_available(),
            "Availability checked"
        );
    }

    /// Log a booking status change
    pub fn log_booking_transition(booking_id: Uuid, from: Option<BookingStatus>, to: BookingStatus) {
        info!(
            booking.id = %booking_id,
            booking.from = from.map_or("none", BookingStatus::as_str),
            booking.to = %to,
            "Booking transition"
        );
    }

    /// Log every route outcome of one dispatch
    ///
    /// Failed routes are logged at warn level; the dispatch itself never fails.
    pub fn log_dispatch_report(
        event: &str,
        booking_id: Uuid,
        report: &BTreeMap<DeliveryRoute, NotificationOutcome>,
    ) {
        for (route, outcome) in report {
            if outcome.success {
                info!(
                    notification.event = %event,
                    booking.id = %booking_id,
                    notification.route = %route.as_str(),
                    notification.channel = %outcome.channel_name,
                    notification.elapsed_ms = outcome.elapsed_ms,
                    notification.invalidated = outcome.invalidated_targets.len(),
                    "Notification delivered"
                );
            } else {
                warn!(
                    notification.event = %event,
                    booking.id = %booking_id,
                    notification.route = %route.as_str(),
                    notification.channel = %outcome.channel_name,
                    notification.elapsed_ms = outcome.elapsed_ms,
                    notification.error = outcome.error.as_deref().unwrap_or("unknown"),
                    "Notification failed"
                );
            }
        }
    }

    /// Log one reminder polling cycle
    pub fn log_reminder_cycle(now: &str, dispatched: usize, duration_ms: u64) {
        info!(
            reminders.now = %now,
            reminders.dispatched = dispatched,
            reminders.duration_ms = duration_ms,
            "Reminder cycle finished"
        );
    }
}

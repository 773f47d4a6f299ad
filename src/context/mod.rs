// ABOUTME: Explicit dependency wiring performed once at startup
// ABOUTME: Builds storage, channels, orchestrator, checker, scheduler and booking service from config
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Application context
//!
//! Every collaborator is constructed here and handed to its consumers as an
//! `Arc`; nothing is looked up through globals afterwards.
//!
//! - `Database`: implements every repository trait
//! - channels: HTTP adapters, or [`DisabledChannel`] when a URL is not configured
//! - `NotificationOrchestrator`, `AvailabilityChecker`, `ReminderScheduler`, `BookingService`

mod channels;

pub use channels::ChannelSet;

use crate::availability::AvailabilityChecker;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::notifications::NotificationOrchestrator;
use crate::reminders::ReminderScheduler;
use crate::services::BookingService;
use anyhow::{Context as _, Result};
use std::sync::Arc;
use tracing::info;

/// Fully wired application
#[derive(Clone)]
pub struct AppContext {
    database: Arc<Database>,
    availability: AvailabilityChecker,
    orchestrator: NotificationOrchestrator,
    reminders: ReminderScheduler,
    bookings: BookingService,
}

impl AppContext {
    /// Connect storage, build channels and wire every service
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated, or the
    /// HTTP client cannot be built
    pub async fn bootstrap(config: &ServerConfig) -> Result<Self> {
        let connection = config.database.url.to_connection_string();
        let database = Database::new(&connection)
            .await
            .with_context(|| format!("failed to open database {connection}"))?;
        if config.database.auto_migrate {
            database.migrate().await.context("database migration failed")?;
        }

        let channels = ChannelSet::from_config(&config.channels)?;
        let context = Self::assemble(Arc::new(database), channels, config);
        info!("Application context ready: {}", config.summary());
        Ok(context)
    }

    /// Wire services around an existing database and channel set
    #[must_use]
    pub fn assemble(database: Arc<Database>, channels: ChannelSet, config: &ServerConfig) -> Self {
        let orchestrator = NotificationOrchestrator::new(
            channels.email,
            channels.push,
            channels.calendar,
            database.clone(),
            config.channels.send_timeout,
        );
        let availability = AvailabilityChecker::new(database.clone());
        let reminders = ReminderScheduler::new(
            database.clone(),
            database.clone(),
            orchestrator.clone(),
            config.reminders.poll_interval,
            config.business_offset,
        );
        let bookings = BookingService::new(
            database.clone(),
            database.clone(),
            availability.clone(),
            orchestrator.clone(),
        );

        Self {
            database,
            availability,
            orchestrator,
            reminders,
            bookings,
        }
    }

    /// Storage handle
    #[must_use]
    pub const fn database(&self) -> &Arc<Database> {
        &self.database
    }

    /// Availability checker
    #[must_use]
    pub const fn availability(&self) -> &AvailabilityChecker {
        &self.availability
    }

    /// Notification orchestrator
    #[must_use]
    pub const fn orchestrator(&self) -> &NotificationOrchestrator {
        &self.orchestrator
    }

    /// Reminder scheduler
    #[must_use]
    pub const fn reminders(&self) -> &ReminderScheduler {
        &self.reminders
    }

    /// Booking workflows
    #[must_use]
    pub const fn bookings(&self) -> &BookingService {
        &self.bookings
    }
}

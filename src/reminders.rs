// ABOUTME: Periodic dispatch of the day-before and short-notice booking reminders
// ABOUTME: Each reminder is sent at most once per booking via persisted flags
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Reminder Scheduler
//!
//! [`ReminderScheduler::process_due`] is the whole algorithm and takes `now`
//! explicitly; [`ReminderScheduler::run`] only supplies business-local wall
//! time on a fixed interval. A reminder flag is set after dispatch whatever
//! the per-channel outcomes were, so a channel outage never produces a burst
//! of repeated reminders later.

use crate::database::{BookingRepository, ContactRepository};
use crate::errors::AppResult;
use crate::logging::AppLogger;
use crate::models::{Booking, ReminderKind};
use crate::notifications::{BookingNotice, LifecycleEvent, NotificationOrchestrator};
use chrono::{FixedOffset, NaiveDateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Periodic trigger for booking reminders
#[derive(Clone)]
pub struct ReminderScheduler {
    bookings: Arc<dyn BookingRepository>,
    contacts: Arc<dyn ContactRepository>,
    orchestrator: NotificationOrchestrator,
    poll_interval: Duration,
    offset: FixedOffset,
}

impl ReminderScheduler {
    /// Create a scheduler polling every `poll_interval` in the business time zone `offset`
    #[must_use]
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        contacts: Arc<dyn ContactRepository>,
        orchestrator: NotificationOrchestrator,
        poll_interval: Duration,
        offset: FixedOffset,
    ) -> Self {
        Self {
            bookings,
            contacts,
            orchestrator,
            poll_interval,
            offset,
        }
    }

    /// Current business-local wall time
    #[must_use]
    pub fn business_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }

    /// Dispatch every reminder due at `now` and return how many were sent
    ///
    /// Bookings whose contacts cannot be resolved are skipped with their flag
    /// left unset, so they are retried on the next cycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the due bookings cannot be listed
    pub async fn process_due(&self, now: NaiveDateTime) -> AppResult<usize> {
        let started = Instant::now();
        let mut dispatched = 0;

        for kind in ReminderKind::ALL {
            for booking in self.bookings.due_for_reminder(kind, now).await? {
                if self.remind(booking, kind).await {
                    dispatched += 1;
                }
            }
        }

        AppLogger::log_reminder_cycle(
            &now.to_string(),
            dispatched,
            started.elapsed().as_millis() as u64,
        );
        Ok(dispatched)
    }

    async fn remind(&self, booking: Booking, kind: ReminderKind) -> bool {
        let booking_id = booking.id;
        let notice = match BookingNotice::resolve(booking, self.contacts.as_ref()).await {
            Ok(notice) => notice,
            Err(e) => {
                warn!(booking.id = %booking_id, reminder = kind.as_str(), error = %e, "Skipping reminder");
                return false;
            }
        };

        self.orchestrator
            .dispatch(&LifecycleEvent::ReminderDue { notice, kind })
            .await;

        if let Err(e) = self.bookings.mark_reminder_sent(booking_id, kind).await {
            error!(booking.id = %booking_id, reminder = kind.as_str(), error = %e, "Failed to record reminder");
        }
        true
    }

    /// Poll until `shutdown` flips to `true` or its sender is dropped
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            utc_offset = %self.offset,
            "Reminder scheduler started"
        );
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.process_due(self.business_now()).await {
                        error!(error = %e, "Reminder cycle failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Reminder scheduler received shutdown signal");
                        break;
                    }
                }
            }
        }
        info!("Reminder scheduler stopped");
    }
}

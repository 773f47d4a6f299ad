// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory databases, seed helpers and scripted channel fakes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
//! Shared test utilities for `slotwise`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use slotwise::database::{BookingRepository, Database};
use slotwise::errors::ChannelError;
use slotwise::models::{Booking, Contact, NewBooking, TimeInterval, UserRole, WorkShift};
use slotwise::notifications::NotificationOrchestrator;
use slotwise_channels::{
    CalendarChannel, CalendarEvent, DeliveryReport, NotificationChannel, NotificationPayload,
    Target,
};
use std::env;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::time::sleep;
use tracing::Level;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls the level; quiet by default
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Migrated in-memory database
pub async fn create_test_database() -> Result<Arc<Database>> {
    init_test_logging();
    let database = Database::new("sqlite::memory:").await?;
    database.migrate().await?;
    Ok(Arc::new(database))
}

/// First Monday of June 2025
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_time(time(hour, minute))
}

/// `[h1:m1, h2:m2)` on `monday()`
pub fn slot(h1: u32, m1: u32, h2: u32, m2: u32) -> TimeInterval {
    TimeInterval::new(at(monday(), h1, m1), at(monday(), h2, m2)).unwrap()
}

pub async fn seed_employee(database: &Database, name: &str) -> Contact {
    let email = format!("{}@staff.example.com", name.to_lowercase());
    database
        .create_user(name, &email, UserRole::Employee)
        .await
        .unwrap()
}

pub async fn seed_client(database: &Database, name: &str) -> Contact {
    let email = format!("{}@clients.example.com", name.to_lowercase());
    database
        .create_user(name, &email, UserRole::Client)
        .await
        .unwrap()
}

/// Monday 09:00-17:00 with a 13:00-14:00 break
pub async fn seed_monday_schedule(database: &Database, employee_id: Uuid) {
    let shift = WorkShift::new(employee_id, 1, time(9, 0), time(17, 0), false).unwrap();
    let lunch = WorkShift::new(employee_id, 1, time(13, 0), time(14, 0), true).unwrap();
    database.add_shift(&shift).await.unwrap();
    database.add_shift(&lunch).await.unwrap();
}

pub async fn seed_booking(
    database: &Database,
    employee_id: Uuid,
    client_id: Uuid,
    interval: TimeInterval,
) -> Booking {
    database
        .insert_booking(&NewBooking {
            employee_id,
            client_id,
            service_name: "Haircut".to_owned(),
            interval,
        })
        .await
        .unwrap()
}

/// How a scripted channel answers each send
#[derive(Debug, Clone)]
pub enum SendBehavior {
    /// Accept every target
    Succeed,
    /// Accept, but report these targets as permanently invalid
    RejectTargets(Vec<String>),
    /// Fail with this error
    Fail(ChannelError),
    /// Never answer within any reasonable timeout
    Hang,
    /// Panic inside the send
    Panic,
}

/// Notification channel that records every send and answers as scripted
pub struct ScriptedChannel {
    name: &'static str,
    reachable: AtomicBool,
    behavior: Mutex<SendBehavior>,
    sent: Mutex<Vec<(Target, NotificationPayload)>>,
}

impl ScriptedChannel {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reachable: AtomicBool::new(true),
            behavior: Mutex::new(SendBehavior::Succeed),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn set_behavior(&self, behavior: SendBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(Target, NotificationPayload)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Email addresses this channel was asked to deliver to
    pub fn email_recipients(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|(target, _)| match target {
                Target::Email { address, .. } => Some(address),
                Target::Devices { .. } => None,
            })
            .collect()
    }

    /// Device tokens this channel was asked to deliver to, per send
    pub fn device_sends(&self) -> Vec<(Uuid, Vec<String>)> {
        self.sent()
            .into_iter()
            .filter_map(|(target, _)| match target {
                Target::Devices { user_id, tokens } => Some((user_id, tokens)),
                Target::Email { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl NotificationChannel for ScriptedChannel {
    fn name(&self) -> &str {
        self.name
    }

    fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    async fn send(
        &self,
        target: &Target,
        payload: &NotificationPayload,
    ) -> Result<DeliveryReport, ChannelError> {
        self.sent
            .lock()
            .unwrap()
            .push((target.clone(), payload.clone()));
        let behavior = self.behavior.lock().unwrap().clone();
        let requested = match target {
            Target::Email { .. } => 1,
            Target::Devices { tokens, .. } => tokens.len(),
        };
        match behavior {
            SendBehavior::Succeed => Ok(DeliveryReport {
                accepted: requested,
                invalid_targets: Vec::new(),
            }),
            SendBehavior::RejectTargets(invalid) => Ok(DeliveryReport {
                accepted: requested.saturating_sub(invalid.len()),
                invalid_targets: invalid,
            }),
            SendBehavior::Fail(error) => Err(error),
            SendBehavior::Hang => {
                sleep(Duration::from_secs(3600)).await;
                Ok(DeliveryReport::single())
            }
            SendBehavior::Panic => panic!("scripted channel panic"),
        }
    }
}

/// Calendar fake handing out sequential event ids
#[derive(Default)]
pub struct FakeCalendar {
    next_id: AtomicUsize,
    failing: AtomicBool,
    upserts: Mutex<Vec<CalendarEvent>>,
    deletes: Mutex<Vec<String>>,
}

impl FakeCalendar {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn upserts(&self) -> Vec<CalendarEvent> {
        self.upserts.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarChannel for FakeCalendar {
    fn name(&self) -> &str {
        "calendar"
    }

    async fn upsert(&self, event: &CalendarEvent) -> Result<String, ChannelError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChannelError::send_failed("calendar", "calendar rejected the event"));
        }
        self.upserts.lock().unwrap().push(event.clone());
        Ok(event.external_id.clone().unwrap_or_else(|| {
            format!("evt-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
        }))
    }

    async fn delete(&self, external_event_id: &str) -> Result<(), ChannelError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChannelError::unreachable("calendar", "calendar backend down"));
        }
        self.deletes
            .lock()
            .unwrap()
            .push(external_event_id.to_owned());
        Ok(())
    }
}

/// Channel fakes plus an orchestrator wired to them
pub struct Harness {
    pub database: Arc<Database>,
    pub email: Arc<ScriptedChannel>,
    pub push: Arc<ScriptedChannel>,
    pub calendar: Arc<FakeCalendar>,
    pub orchestrator: NotificationOrchestrator,
}

impl Harness {
    pub async fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(2)).await
    }

    pub async fn with_timeout(send_timeout: Duration) -> Result<Self> {
        let database = create_test_database().await?;
        let email = ScriptedChannel::new("email");
        let push = ScriptedChannel::new("push");
        let calendar = FakeCalendar::new();
        let orchestrator = NotificationOrchestrator::new(
            email.clone(),
            push.clone(),
            calendar.clone(),
            database.clone(),
            send_timeout,
        );
        Ok(Self {
            database,
            email,
            push,
            calendar,
            orchestrator,
        })
    }
}

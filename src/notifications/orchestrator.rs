// ABOUTME: Concurrent multi-channel dispatch of booking lifecycle events
// ABOUTME: Settle-all fan-out with per-send timeouts, push-to-email fallback and token pruning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::events::{BookingNotice, LifecycleEvent};
use super::routing::DeliveryRoute;
use super::templates::{calendar_event, client_payload, employee_payload};
use crate::database::DeviceTokenRepository;
use crate::errors::ChannelError;
use crate::logging::AppLogger;
use crate::models::{Contact, NotificationOutcome};
use futures_util::future::join_all;
use slotwise_channels::{
    CalendarChannel, DeliveryReport, NotificationChannel, NotificationPayload, Target,
};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Outcome of every route attempted for one event
pub type DispatchReport = BTreeMap<DeliveryRoute, NotificationOutcome>;

type RouteOutcomes = Vec<(DeliveryRoute, NotificationOutcome)>;

/// Push send result paired with elapsed milliseconds
type PushResult = Result<(DeliveryReport, u64), (ChannelError, u64)>;

/// Fans lifecycle events out to email, push and calendar channels
///
/// Every route of an event runs as its own task bounded by `send_timeout`;
/// [`dispatch`](Self::dispatch) waits for all of them and never fails. A
/// failure, timeout or panic in one route leaves the others untouched.
#[derive(Clone)]
pub struct NotificationOrchestrator {
    email: Arc<dyn NotificationChannel>,
    push: Arc<dyn NotificationChannel>,
    calendar: Arc<dyn CalendarChannel>,
    tokens: Arc<dyn DeviceTokenRepository>,
    send_timeout: Duration,
}

impl NotificationOrchestrator {
    /// Wire the orchestrator to its channels and the device token store
    #[must_use]
    pub fn new(
        email: Arc<dyn NotificationChannel>,
        push: Arc<dyn NotificationChannel>,
        calendar: Arc<dyn CalendarChannel>,
        tokens: Arc<dyn DeviceTokenRepository>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            email,
            push,
            calendar,
            tokens,
            send_timeout,
        }
    }

    /// Send every notification the event requires and report each route's outcome
    pub async fn dispatch(&self, event: &LifecycleEvent) -> DispatchReport {
        let shared = Arc::new(event.clone());
        let (routes, tasks): (Vec<_>, Vec<_>) = DeliveryRoute::plan(event)
            .iter()
            .map(|&route| {
                let orchestrator = self.clone();
                let event = Arc::clone(&shared);
                let task = tokio::spawn(async move { orchestrator.run_route(route, &event).await });
                (route, task)
            })
            .unzip();

        let mut report = DispatchReport::new();
        for (route, joined) in routes.into_iter().zip(join_all(tasks).await) {
            match joined {
                Ok(outcomes) => report.extend(outcomes),
                Err(join_error) => {
                    warn!(route = %route, error = %join_error, "Notification task aborted");
                    report.insert(
                        route,
                        NotificationOutcome::failed(route.as_str(), format!("send task aborted: {join_error}"), 0),
                    );
                }
            }
        }

        AppLogger::log_dispatch_report(event.kind_str(), event.booking_id(), &report);
        report
    }

    async fn run_route(&self, route: DeliveryRoute, event: &LifecycleEvent) -> RouteOutcomes {
        let notice = event.notice();
        debug!(route = %route, booking.id = %notice.booking.id, "Dispatching route");
        match route {
            DeliveryRoute::ClientEmail => {
                vec![(route, self.send_email(&notice.client, client_payload(event)).await)]
            }
            DeliveryRoute::EmployeeEmail => {
                vec![(route, self.send_email(&notice.employee, employee_payload(event)).await)]
            }
            DeliveryRoute::ClientPush => vec![(route, self.client_push(event).await)],
            DeliveryRoute::EmployeePush => self.employee_push(event).await,
            DeliveryRoute::CalendarUpsert => vec![(route, self.calendar_upsert(notice).await)],
            DeliveryRoute::CalendarDelete => vec![(route, self.calendar_delete(notice).await)],
        }
    }

    /// Run one channel call under the per-send timeout, returning its elapsed milliseconds
    async fn timed<T, F>(&self, channel: &str, send: F) -> (Result<T, ChannelError>, u64)
    where
        F: Future<Output = Result<T, ChannelError>> + Send,
    {
        let started = Instant::now();
        let result = timeout(self.send_timeout, send)
            .await
            .unwrap_or_else(|_| Err(ChannelError::timeout(channel, self.send_timeout.as_millis() as u64)));
        (result, started.elapsed().as_millis() as u64)
    }

    async fn send_email(&self, recipient: &Contact, payload: NotificationPayload) -> NotificationOutcome {
        let channel = self.email.name();
        let target = Target::Email {
            address: recipient.email.clone(),
            name: recipient.name.clone(),
        };
        match self.timed(channel, self.email.send(&target, &payload)).await {
            (Ok(_), elapsed) => NotificationOutcome::delivered(channel, elapsed),
            (Err(error), elapsed) => NotificationOutcome::from_channel_error(&error, elapsed),
        }
    }

    async fn send_push(&self, target: &Target, payload: NotificationPayload) -> PushResult {
        match self.timed(self.push.name(), self.push.send(target, &payload)).await {
            (Ok(report), elapsed) => {
                self.prune_tokens(&report.invalid_targets).await;
                Ok((report, elapsed))
            }
            (Err(error), elapsed) => {
                self.prune_tokens(error.invalid_targets()).await;
                Err((error, elapsed))
            }
        }
    }

    fn push_outcome(&self, result: PushResult) -> NotificationOutcome {
        match result {
            Ok((report, elapsed)) => NotificationOutcome::delivered(self.push.name(), elapsed)
                .with_invalidated_targets(report.invalid_targets),
            Err((error, elapsed)) => NotificationOutcome::from_channel_error(&error, elapsed),
        }
    }

    async fn client_push(&self, event: &LifecycleEvent) -> NotificationOutcome {
        let client = &event.notice().client;
        let tokens = match self.tokens.active_tokens(client.user_id).await {
            Ok(tokens) => tokens,
            Err(error) => {
                return NotificationOutcome::failed(
                    self.push.name(),
                    format!("device token lookup failed: {error}"),
                    0,
                )
            }
        };
        if tokens.is_empty() {
            return NotificationOutcome::failed(self.push.name(), "no active device tokens", 0);
        }

        let target = Target::Devices {
            user_id: client.user_id,
            tokens,
        };
        let result = self.send_push(&target, client_payload(event)).await;
        self.push_outcome(result)
    }

    /// Employee push with email substitution when the push leg cannot be attempted
    ///
    /// Zero active tokens or an unreachable backend yield only an employee
    /// email. A structural failure reported by the send records the push
    /// failure and adds the email. Transient failures are recorded only.
    async fn employee_push(&self, event: &LifecycleEvent) -> RouteOutcomes {
        let employee = &event.notice().employee;
        let tokens = match self.tokens.active_tokens(employee.user_id).await {
            Ok(tokens) => tokens,
            Err(error) => {
                warn!(user.id = %employee.user_id, error = %error, "Device token lookup failed, falling back to email");
                Vec::new()
            }
        };

        if tokens.is_empty() || !self.push.is_reachable() {
            debug!(
                user.id = %employee.user_id,
                tokens = tokens.len(),
                "Employee push not attempted, sending email instead"
            );
            let email = self.send_email(employee, employee_payload(event)).await;
            return vec![(DeliveryRoute::EmployeeEmail, email)];
        }

        let target = Target::Devices {
            user_id: employee.user_id,
            tokens,
        };
        let result = self.send_push(&target, employee_payload(event)).await;
        let structural = matches!(&result, Err((error, _)) if error.is_structural());
        let mut outcomes = vec![(DeliveryRoute::EmployeePush, self.push_outcome(result))];
        if structural {
            let email = self.send_email(employee, employee_payload(event)).await;
            outcomes.push((DeliveryRoute::EmployeeEmail, email));
        }
        outcomes
    }

    async fn prune_tokens(&self, invalid: &[String]) {
        if invalid.is_empty() {
            return;
        }
        if let Err(error) = self.tokens.deactivate_tokens(invalid).await {
            warn!(count = invalid.len(), error = %error, "Failed to deactivate invalid push tokens");
        }
    }

    async fn calendar_upsert(&self, notice: &BookingNotice) -> NotificationOutcome {
        let channel = self.calendar.name();
        let event = calendar_event(notice);
        match self.timed(channel, self.calendar.upsert(&event)).await {
            (Ok(external_id), elapsed) => {
                NotificationOutcome::delivered(channel, elapsed).with_external_ref(external_id)
            }
            (Err(error), elapsed) => NotificationOutcome::from_channel_error(&error, elapsed),
        }
    }

    async fn calendar_delete(&self, notice: &BookingNotice) -> NotificationOutcome {
        let channel = self.calendar.name();
        let Some(external_id) = notice.booking.calendar_event_id.as_deref() else {
            return NotificationOutcome::delivered(channel, 0);
        };
        match self.timed(channel, self.calendar.delete(external_id)).await {
            (Ok(()), elapsed) => NotificationOutcome::delivered(channel, elapsed),
            (Err(error), elapsed) => NotificationOutcome::from_channel_error(&error, elapsed),
        }
    }
}

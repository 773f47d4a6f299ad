// ABOUTME: Integration tests for concurrent multi-channel notification dispatch
// ABOUTME: Covers routing, fallback, route independence, timeouts and invalid token pruning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{seed_booking, seed_client, seed_employee, slot, Harness, SendBehavior};
use slotwise::database::{BookingRepository, DeviceTokenRepository};
use slotwise::errors::ChannelError;
use slotwise::models::{Contact, ReminderKind};
use slotwise::notifications::{BookingNotice, DeliveryRoute, LifecycleEvent};
use std::time::{Duration, Instant};

struct Parties {
    client: Contact,
    employee: Contact,
    notice: BookingNotice,
}

async fn seed(harness: &Harness) -> Parties {
    let client = seed_client(&harness.database, "Ada").await;
    let employee = seed_employee(&harness.database, "Grace").await;
    let booking = seed_booking(
        &harness.database,
        employee.user_id,
        client.user_id,
        slot(10, 0, 11, 0),
    )
    .await;
    let notice = BookingNotice {
        booking,
        client: client.clone(),
        employee: employee.clone(),
    };
    Parties {
        client,
        employee,
        notice,
    }
}

async fn register(harness: &Harness, user: &Contact, tokens: &[&str]) {
    for token in tokens {
        harness
            .database
            .register_token(user.user_id, token, "ios")
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_confirmation_reaches_every_route() {
    let harness = Harness::new().await.unwrap();
    let parties = seed(&harness).await;
    register(&harness, &parties.client, &["client-1"]).await;
    register(&harness, &parties.employee, &["staff-1"]).await;

    let report = harness
        .orchestrator
        .dispatch(&LifecycleEvent::BookingConfirmed(parties.notice.clone()))
        .await;

    let routes: Vec<_> = report.keys().copied().collect();
    assert_eq!(
        routes,
        vec![
            DeliveryRoute::ClientEmail,
            DeliveryRoute::ClientPush,
            DeliveryRoute::EmployeePush,
            DeliveryRoute::CalendarUpsert,
        ]
    );
    assert!(report.values().all(|outcome| outcome.success));
    assert_eq!(
        report[&DeliveryRoute::CalendarUpsert].external_ref.as_deref(),
        Some("evt-1")
    );
    assert_eq!(harness.email.email_recipients(), vec![parties.client.email.clone()]);
    assert_eq!(harness.push.send_count(), 2);
    assert_eq!(harness.calendar.upserts().len(), 1);
}

#[tokio::test]
async fn test_employee_without_tokens_gets_exactly_one_email() {
    let harness = Harness::new().await.unwrap();
    let parties = seed(&harness).await;
    register(&harness, &parties.client, &["client-1"]).await;

    let report = harness
        .orchestrator
        .dispatch(&LifecycleEvent::BookingConfirmed(parties.notice.clone()))
        .await;

    assert!(!report.contains_key(&DeliveryRoute::EmployeePush));
    assert!(report[&DeliveryRoute::EmployeeEmail].success);

    let employee_emails = harness
        .email
        .email_recipients()
        .into_iter()
        .filter(|address| *address == parties.employee.email)
        .count();
    assert_eq!(employee_emails, 1);

    // Only the client's devices were pushed
    let pushes = harness.push.device_sends();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].0, parties.client.user_id);
}

#[tokio::test]
async fn test_unreachable_push_backend_falls_back_before_sending() {
    let harness = Harness::new().await.unwrap();
    let parties = seed(&harness).await;
    register(&harness, &parties.employee, &["staff-1"]).await;
    harness.push.set_reachable(false);

    let report = harness
        .orchestrator
        .dispatch(&LifecycleEvent::BookingConfirmed(parties.notice.clone()))
        .await;

    assert!(report[&DeliveryRoute::EmployeeEmail].success);
    assert!(!report.contains_key(&DeliveryRoute::EmployeePush));
    assert!(harness
        .push
        .device_sends()
        .iter()
        .all(|(user, _)| *user != parties.employee.user_id));
}

#[tokio::test]
async fn test_structural_push_failure_records_push_and_sends_email() {
    let harness = Harness::new().await.unwrap();
    let parties = seed(&harness).await;
    register(&harness, &parties.employee, &["staff-1"]).await;
    harness
        .push
        .set_behavior(SendBehavior::Fail(ChannelError::unreachable("push", "connection refused")));

    let report = harness
        .orchestrator
        .dispatch(&LifecycleEvent::BookingConfirmed(parties.notice.clone()))
        .await;

    let push = &report[&DeliveryRoute::EmployeePush];
    assert!(!push.success);
    assert!(push.error.as_deref().unwrap().contains("unreachable"));
    assert!(report[&DeliveryRoute::EmployeeEmail].success);
}

#[tokio::test]
async fn test_transient_push_failure_is_recorded_without_fallback() {
    let harness = Harness::new().await.unwrap();
    let parties = seed(&harness).await;
    register(&harness, &parties.employee, &["staff-1"]).await;
    harness
        .push
        .set_behavior(SendBehavior::Fail(ChannelError::send_failed("push", "HTTP 500")));

    let report = harness
        .orchestrator
        .dispatch(&LifecycleEvent::BookingConfirmed(parties.notice.clone()))
        .await;

    assert!(!report[&DeliveryRoute::EmployeePush].success);
    assert!(!report.contains_key(&DeliveryRoute::EmployeeEmail));
    assert!(!harness
        .email
        .email_recipients()
        .contains(&parties.employee.email));
}

#[tokio::test]
async fn test_failed_channel_does_not_affect_other_routes() {
    let harness = Harness::new().await.unwrap();
    let parties = seed(&harness).await;
    register(&harness, &parties.client, &["client-1"]).await;
    register(&harness, &parties.employee, &["staff-1"]).await;
    harness
        .email
        .set_behavior(SendBehavior::Fail(ChannelError::send_failed("email", "mailbox full")));
    harness.calendar.set_failing(true);

    let report = harness
        .orchestrator
        .dispatch(&LifecycleEvent::BookingConfirmed(parties.notice.clone()))
        .await;

    assert!(!report[&DeliveryRoute::ClientEmail].success);
    assert!(!report[&DeliveryRoute::CalendarUpsert].success);
    assert!(report[&DeliveryRoute::ClientPush].success);
    assert!(report[&DeliveryRoute::EmployeePush].success);
}

#[tokio::test]
async fn test_panicking_channel_yields_failed_outcome_only_for_its_routes() {
    let harness = Harness::new().await.unwrap();
    let parties = seed(&harness).await;
    register(&harness, &parties.client, &["client-1"]).await;
    register(&harness, &parties.employee, &["staff-1"]).await;
    harness.push.set_behavior(SendBehavior::Panic);

    let report = harness
        .orchestrator
        .dispatch(&LifecycleEvent::BookingConfirmed(parties.notice.clone()))
        .await;

    assert!(!report[&DeliveryRoute::ClientPush].success);
    assert!(!report[&DeliveryRoute::EmployeePush].success);
    assert!(report[&DeliveryRoute::ClientEmail].success);
    assert!(report[&DeliveryRoute::CalendarUpsert].success);
}

#[tokio::test]
async fn test_hanging_send_is_bounded_by_timeout() {
    let harness = Harness::with_timeout(Duration::from_millis(100)).await.unwrap();
    let parties = seed(&harness).await;
    harness.email.set_behavior(SendBehavior::Hang);

    let started = Instant::now();
    let report = harness
        .orchestrator
        .dispatch(&LifecycleEvent::ReminderDue {
            notice: parties.notice.clone(),
            kind: ReminderKind::DayBefore,
        })
        .await;

    assert!(started.elapsed() < Duration::from_secs(5));
    let email = &report[&DeliveryRoute::ClientEmail];
    assert!(!email.success);
    assert!(email.error.as_deref().unwrap().contains("did not respond"));
}

#[tokio::test]
async fn test_reminder_targets_client_only() {
    let harness = Harness::new().await.unwrap();
    let parties = seed(&harness).await;
    register(&harness, &parties.client, &["client-1"]).await;
    register(&harness, &parties.employee, &["staff-1"]).await;

    let report = harness
        .orchestrator
        .dispatch(&LifecycleEvent::ReminderDue {
            notice: parties.notice.clone(),
            kind: ReminderKind::ShortNotice,
        })
        .await;

    let routes: Vec<_> = report.keys().copied().collect();
    assert_eq!(routes, vec![DeliveryRoute::ClientEmail, DeliveryRoute::ClientPush]);
    assert_eq!(harness.email.email_recipients(), vec![parties.client.email.clone()]);
    assert_eq!(harness.push.device_sends()[0].0, parties.client.user_id);
    let (_, payload) = &harness.push.sent()[0];
    assert_eq!(payload.data["event"], "reminder_2h");
}

#[tokio::test]
async fn test_client_without_tokens_records_failed_push() {
    let harness = Harness::new().await.unwrap();
    let parties = seed(&harness).await;

    let report = harness
        .orchestrator
        .dispatch(&LifecycleEvent::ReminderDue {
            notice: parties.notice.clone(),
            kind: ReminderKind::DayBefore,
        })
        .await;

    let push = &report[&DeliveryRoute::ClientPush];
    assert!(!push.success);
    assert_eq!(push.error.as_deref(), Some("no active device tokens"));
    assert_eq!(harness.push.send_count(), 0);
}

#[tokio::test]
async fn test_invalid_tokens_are_never_targeted_again() {
    let harness = Harness::new().await.unwrap();
    let parties = seed(&harness).await;
    register(&harness, &parties.client, &["stale", "fresh"]).await;
    harness
        .push
        .set_behavior(SendBehavior::RejectTargets(vec!["stale".to_owned()]));

    let event = LifecycleEvent::ReminderDue {
        notice: parties.notice.clone(),
        kind: ReminderKind::DayBefore,
    };
    let report = harness.orchestrator.dispatch(&event).await;
    let push = &report[&DeliveryRoute::ClientPush];
    assert!(push.success);
    assert_eq!(push.invalidated_targets, vec!["stale".to_owned()]);
    assert_eq!(
        harness
            .database
            .active_tokens(parties.client.user_id)
            .await
            .unwrap(),
        vec!["fresh".to_owned()]
    );

    harness.push.set_behavior(SendBehavior::Succeed);
    harness.orchestrator.dispatch(&event).await;
    let sends = harness.push.device_sends();
    assert_eq!(sends.len(), 2);
    assert_eq!(sends[1].1, vec!["fresh".to_owned()]);
}

#[tokio::test]
async fn test_tokens_rejected_in_failed_send_are_pruned() {
    let harness = Harness::new().await.unwrap();
    let parties = seed(&harness).await;
    register(&harness, &parties.client, &["gone"]).await;
    harness.push.set_behavior(SendBehavior::Fail(ChannelError::rejected_targets(
        "push",
        "all tokens rejected",
        vec!["gone".to_owned()],
    )));

    let report = harness
        .orchestrator
        .dispatch(&LifecycleEvent::ReminderDue {
            notice: parties.notice.clone(),
            kind: ReminderKind::DayBefore,
        })
        .await;

    assert!(!report[&DeliveryRoute::ClientPush].success);
    assert!(harness
        .database
        .active_tokens(parties.client.user_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_cancellation_deletes_calendar_event_when_synced() {
    let harness = Harness::new().await.unwrap();
    let mut parties = seed(&harness).await;

    // Never synced: nothing to delete, still a success
    let report = harness
        .orchestrator
        .dispatch(&LifecycleEvent::BookingCancelled(parties.notice.clone()))
        .await;
    assert_eq!(report.len(), 1);
    assert!(report[&DeliveryRoute::CalendarDelete].success);
    assert!(harness.calendar.deletes().is_empty());

    harness
        .database
        .set_calendar_event_id(parties.notice.booking.id, Some("evt-9"))
        .await
        .unwrap();
    parties.notice.booking.calendar_event_id = Some("evt-9".to_owned());
    let report = harness
        .orchestrator
        .dispatch(&LifecycleEvent::BookingCancelled(parties.notice.clone()))
        .await;
    assert!(report[&DeliveryRoute::CalendarDelete].success);
    assert_eq!(harness.calendar.deletes(), vec!["evt-9".to_owned()]);
    assert_eq!(harness.email.send_count(), 0);
    assert_eq!(harness.push.send_count(), 0);
}

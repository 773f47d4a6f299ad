// ABOUTME: Integration tests for slot availability against the SQLite schedule store
// ABOUTME: Covers working hours, breaks, absences, booking conflicts and slot listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::TimeDelta;
use common::{
    at, create_test_database, monday, seed_booking, seed_client, seed_employee,
    seed_monday_schedule, slot,
};
use slotwise::availability::{AvailabilityChecker, AvailabilityDecision};
use slotwise::database::{BookingRepository, Database};
use slotwise::errors::ErrorCode;
use slotwise::models::{Absence, BookingStatus, DateRange, TimeInterval};
use std::sync::Arc;
use uuid::Uuid;

async fn setup() -> (AvailabilityChecker, Arc<Database>, Uuid, Uuid) {
    let database = create_test_database().await.unwrap();
    let employee = seed_employee(&database, "Grace").await;
    let client = seed_client(&database, "Ada").await;
    seed_monday_schedule(&database, employee.user_id).await;
    let checker = AvailabilityChecker::new(database.clone());
    (checker, database, employee.user_id, client.user_id)
}

#[tokio::test]
async fn test_break_blocks_only_overlapping_slots() {
    let (checker, _db, employee, _client) = setup().await;

    assert!(!checker
        .is_available(employee, &slot(13, 0, 13, 30), None)
        .await
        .unwrap());
    assert!(checker
        .is_available(employee, &slot(12, 30, 13, 0), None)
        .await
        .unwrap());
    assert!(checker
        .is_available(employee, &slot(14, 0, 14, 30), None)
        .await
        .unwrap());
    assert_eq!(
        checker.check(employee, &slot(12, 45, 13, 15), None).await.unwrap(),
        AvailabilityDecision::DuringBreak
    );
}

#[tokio::test]
async fn test_slot_outside_shift_or_on_day_off_is_unavailable() {
    let (checker, _db, employee, _client) = setup().await;

    assert_eq!(
        checker.check(employee, &slot(8, 30, 9, 30), None).await.unwrap(),
        AvailabilityDecision::OutsideWorkingHours
    );
    assert_eq!(
        checker.check(employee, &slot(16, 30, 17, 30), None).await.unwrap(),
        AvailabilityDecision::OutsideWorkingHours
    );

    let tuesday = monday() + TimeDelta::days(1);
    let candidate = TimeInterval::new(at(tuesday, 10, 0), at(tuesday, 11, 0)).unwrap();
    assert_eq!(
        checker.check(employee, &candidate, None).await.unwrap(),
        AvailabilityDecision::OutsideWorkingHours
    );
}

#[tokio::test]
async fn test_slot_crossing_midnight_is_never_available() {
    let (checker, _db, employee, _client) = setup().await;
    let candidate = TimeInterval::new(
        at(monday(), 23, 30),
        at(monday() + TimeDelta::days(1), 0, 30),
    )
    .unwrap();
    assert_eq!(
        checker.check(employee, &candidate, None).await.unwrap(),
        AvailabilityDecision::OutsideWorkingHours
    );
}

#[tokio::test]
async fn test_approved_absence_blocks_whole_day() {
    let (checker, database, employee, _client) = setup().await;
    let absence = Absence {
        id: Uuid::new_v4(),
        employee_id: employee,
        period: DateRange::new(monday(), monday()).unwrap(),
        approved: false,
        reason: Some("training".to_owned()),
    };
    database.add_absence(&absence).await.unwrap();

    // Pending absences do not block
    assert!(checker
        .is_available(employee, &slot(10, 0, 11, 0), None)
        .await
        .unwrap());

    database.approve_absence(absence.id).await.unwrap();
    assert_eq!(
        checker.check(employee, &slot(10, 0, 11, 0), None).await.unwrap(),
        AvailabilityDecision::EmployeeAbsent
    );
    assert_eq!(
        checker.check(employee, &slot(16, 0, 17, 0), None).await.unwrap(),
        AvailabilityDecision::EmployeeAbsent
    );
}

#[tokio::test]
async fn test_existing_booking_conflicts_but_touching_does_not() {
    let (checker, database, employee, client) = setup().await;
    let booking = seed_booking(&database, employee, client, slot(10, 0, 11, 0)).await;

    assert_eq!(
        checker.check(employee, &slot(10, 30, 11, 30), None).await.unwrap(),
        AvailabilityDecision::Conflict {
            booking_id: booking.id
        }
    );
    assert!(checker
        .is_available(employee, &slot(11, 0, 12, 0), None)
        .await
        .unwrap());
    assert!(checker
        .is_available(employee, &slot(9, 0, 10, 0), None)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_cancelled_and_no_show_bookings_free_the_slot() {
    let (checker, database, employee, client) = setup().await;
    let cancelled = seed_booking(&database, employee, client, slot(10, 0, 11, 0)).await;
    database
        .update_status(cancelled.id, BookingStatus::Cancelled)
        .await
        .unwrap();
    let missed = seed_booking(&database, employee, client, slot(11, 0, 12, 0)).await;
    database
        .update_status(missed.id, BookingStatus::NoShow)
        .await
        .unwrap();

    assert!(checker
        .is_available(employee, &slot(10, 0, 12, 0), None)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_completed_booking_still_occupies_its_slot() {
    let (checker, database, employee, client) = setup().await;
    let booking = seed_booking(&database, employee, client, slot(10, 0, 11, 0)).await;
    database
        .update_status(booking.id, BookingStatus::Completed)
        .await
        .unwrap();

    assert!(!checker
        .is_available(employee, &slot(10, 0, 11, 0), None)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_excluding_own_booking_allows_unchanged_edit() {
    let (checker, database, employee, client) = setup().await;
    let booking = seed_booking(&database, employee, client, slot(10, 0, 11, 0)).await;

    assert!(!checker
        .is_available(employee, &slot(10, 0, 11, 0), None)
        .await
        .unwrap());
    assert!(checker
        .is_available(employee, &slot(10, 0, 11, 0), Some(booking.id))
        .await
        .unwrap());
    assert!(checker
        .is_available(employee, &slot(10, 30, 11, 30), Some(booking.id))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_invalid_requests_are_rejected() {
    let (checker, _db, employee, _client) = setup().await;

    let err = checker
        .is_available_between(employee, at(monday(), 11, 0), at(monday(), 10, 0), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = checker
        .is_available(Uuid::nil(), &slot(10, 0, 11, 0), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = checker
        .is_available(Uuid::new_v4(), &slot(10, 0, 11, 0), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_client_id_is_not_an_employee() {
    let (checker, _db, _employee, client) = setup().await;
    let err = checker
        .is_available(client, &slot(10, 0, 11, 0), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_available_slots_skip_break_and_bookings() {
    let (checker, database, employee, client) = setup().await;
    seed_booking(&database, employee, client, slot(9, 0, 10, 0)).await;

    let slots = checker
        .available_slots(employee, monday(), TimeDelta::minutes(60), TimeDelta::minutes(60))
        .await
        .unwrap();
    let starts: Vec<String> = slots
        .iter()
        .map(|s| s.start().format("%H:%M").to_string())
        .collect();

    assert_eq!(starts, vec!["10:00", "11:00", "12:00", "14:00", "15:00", "16:00"]);
    for found in &slots {
        assert!(checker.is_available(employee, found, None).await.unwrap());
    }
}

#[tokio::test]
async fn test_available_slots_reject_non_positive_duration() {
    let (checker, _db, employee, _client) = setup().await;
    let err = checker
        .available_slots(employee, monday(), TimeDelta::zero(), TimeDelta::minutes(15))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

// ABOUTME: Slot availability decisions against shifts, breaks, absences and bookings
// ABOUTME: Short-circuits on the first violated rule so later schedule lookups are skipped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Availability
//!
//! A candidate interval is bookable for an employee when, in this order:
//!
//! 1. it lies inside one working shift of its weekday and overlaps no break,
//! 2. it overlaps no approved absence,
//! 3. it overlaps no slot-occupying booking (other than the one being edited).
//!
//! The checker is advisory. The booking insert re-checks rule 3 atomically.

use crate::database::ScheduleRepository;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{Absence, Booking, TimeInterval, WorkShift};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of an availability check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AvailabilityDecision {
    /// The slot can be booked
    Available,
    /// Not fully inside a working shift (or crosses midnight)
    OutsideWorkingHours,
    /// Overlaps a break
    DuringBreak,
    /// Overlaps an approved absence
    EmployeeAbsent,
    /// Overlaps an existing booking
    Conflict {
        /// The booking in the way
        booking_id: Uuid,
    },
}

impl AvailabilityDecision {
    /// Whether the slot can be booked
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    /// Stable label for logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::OutsideWorkingHours => "outside_working_hours",
            Self::DuringBreak => "during_break",
            Self::EmployeeAbsent => "employee_absent",
            Self::Conflict { .. } => "conflict",
        }
    }

    /// Turn a negative decision into the error returned to the booking caller
    ///
    /// # Errors
    ///
    /// Returns `ResourceConflict` for every decision except `Available`
    pub fn into_result(self, employee_id: Uuid, candidate: &TimeInterval) -> AppResult<()> {
        let error = match self {
            Self::Available => return Ok(()),
            Self::Conflict { booking_id } => {
                AppError::conflict(format!("employee is already booked during {candidate}"))
                    .with_booking_id(booking_id)
            }
            other => AppError::conflict(format!("slot {candidate} is not bookable: {other}")),
        };
        Err(error.with_employee_id(employee_id))
    }
}

impl fmt::Display for AvailabilityDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().replace('_', " "))
    }
}

/// Working-hours rule over the shifts of the candidate's weekday
fn hours_rule(shifts: &[WorkShift], candidate: &TimeInterval) -> Option<AvailabilityDecision> {
    let Some(hours) = candidate.time_of_day() else {
        return Some(AvailabilityDecision::OutsideWorkingHours);
    };
    let day = candidate.day_of_week();
    let on_day = || shifts.iter().filter(move |shift| shift.applies_on(day));

    if !on_day().any(|shift| !shift.is_break && shift.hours.contains(&hours)) {
        return Some(AvailabilityDecision::OutsideWorkingHours);
    }
    if on_day().any(|shift| shift.is_break && shift.hours.overlaps(&hours)) {
        return Some(AvailabilityDecision::DuringBreak);
    }
    None
}

fn absence_rule(absences: &[Absence], candidate: &TimeInterval) -> Option<AvailabilityDecision> {
    absences
        .iter()
        .any(|absence| absence.blocks(candidate))
        .then_some(AvailabilityDecision::EmployeeAbsent)
}

fn booking_rule(
    bookings: &[Booking],
    candidate: &TimeInterval,
    excluding: Option<Uuid>,
) -> Option<AvailabilityDecision> {
    bookings
        .iter()
        .find(|booking| booking.blocks(candidate, excluding))
        .map(|booking| AvailabilityDecision::Conflict {
            booking_id: booking.id,
        })
}

/// Availability decisions for employees of one business
#[derive(Clone)]
pub struct AvailabilityChecker {
    schedule: Arc<dyn ScheduleRepository>,
}

impl AvailabilityChecker {
    /// Create a checker reading through `schedule`
    #[must_use]
    pub fn new(schedule: Arc<dyn ScheduleRepository>) -> Self {
        Self { schedule }
    }

    async fn ensure_employee(&self, employee_id: Uuid) -> AppResult<()> {
        if employee_id.is_nil() {
            return Err(AppError::invalid_input("employee_id must not be nil"));
        }
        if !self.schedule.employee_exists(employee_id).await? {
            return Err(AppError::not_found(format!("Employee {employee_id}")).with_employee_id(employee_id));
        }
        Ok(())
    }

    /// Decide whether `candidate` is bookable, with the reason when it is not
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a nil employee id, `ResourceNotFound` for an
    /// unknown employee, or a storage error
    pub async fn check(
        &self,
        employee_id: Uuid,
        candidate: &TimeInterval,
        excluding_booking_id: Option<Uuid>,
    ) -> AppResult<AvailabilityDecision> {
        self.ensure_employee(employee_id).await?;
        let decision = self.evaluate(employee_id, candidate, excluding_booking_id).await?;
        AppLogger::log_availability_decision(employee_id, candidate, &decision);
        Ok(decision)
    }

    async fn evaluate(
        &self,
        employee_id: Uuid,
        candidate: &TimeInterval,
        excluding_booking_id: Option<Uuid>,
    ) -> AppResult<AvailabilityDecision> {
        let shifts = self
            .schedule
            .get_shifts(employee_id, candidate.day_of_week())
            .await?;
        if let Some(decision) = hours_rule(&shifts, candidate) {
            return Ok(decision);
        }

        let absences = self.schedule.get_absences(employee_id, candidate).await?;
        if let Some(decision) = absence_rule(&absences, candidate) {
            return Ok(decision);
        }

        let bookings = self
            .schedule
            .get_overlapping_bookings(employee_id, candidate, excluding_booking_id)
            .await?;
        Ok(booking_rule(&bookings, candidate, excluding_booking_id)
            .unwrap_or(AvailabilityDecision::Available))
    }

    /// Whether `candidate` is bookable
    ///
    /// # Errors
    ///
    /// Same as [`check`](Self::check)
    pub async fn is_available(
        &self,
        employee_id: Uuid,
        candidate: &TimeInterval,
        excluding_booking_id: Option<Uuid>,
    ) -> AppResult<bool> {
        Ok(self
            .check(employee_id, candidate, excluding_booking_id)
            .await?
            .is_available())
    }

    /// Whether `[start, end)` is bookable
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `start >= end`, otherwise the same as [`check`](Self::check)
    pub async fn is_available_between(
        &self,
        employee_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
        excluding_booking_id: Option<Uuid>,
    ) -> AppResult<bool> {
        let candidate = TimeInterval::new(start, end)?;
        self.is_available(employee_id, &candidate, excluding_booking_id)
            .await
    }

    /// Every bookable slot of `duration` on `date`, starting every `step` inside each shift
    ///
    /// Reads the day's schedule once and evaluates all candidates against that snapshot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a non-positive duration or step, otherwise
    /// the same as [`check`](Self::check)
    pub async fn available_slots(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
        duration: TimeDelta,
        step: TimeDelta,
    ) -> AppResult<Vec<TimeInterval>> {
        if duration <= TimeDelta::zero() || step <= TimeDelta::zero() {
            return Err(AppError::invalid_input("slot duration and step must be positive"));
        }
        self.ensure_employee(employee_id).await?;

        let day_of_week = date.weekday().number_from_monday() as u8;
        let shifts = self.schedule.get_shifts(employee_id, day_of_week).await?;
        let day = day_interval(date)?;
        let absences = self.schedule.get_absences(employee_id, &day).await?;
        let bookings = self
            .schedule
            .get_overlapping_bookings(employee_id, &day, None)
            .await?;

        let mut slots: Vec<TimeInterval> = Vec::new();
        for shift in shifts.iter().filter(|shift| !shift.is_break) {
            let shift_end = date.and_time(shift.hours.end());
            let mut cursor = date.and_time(shift.hours.start());
            while let Some(slot_end) = cursor.checked_add_signed(duration) {
                if slot_end > shift_end {
                    break;
                }
                let candidate = TimeInterval::new(cursor, slot_end)?;
                let blocked = hours_rule(&shifts, &candidate)
                    .or_else(|| absence_rule(&absences, &candidate))
                    .or_else(|| booking_rule(&bookings, &candidate, None));
                if blocked.is_none() && !slots.contains(&candidate) {
                    slots.push(candidate);
                }
                let Some(next) = cursor.checked_add_signed(step) else {
                    break;
                };
                cursor = next;
            }
        }
        slots.sort_by_key(TimeInterval::start);
        Ok(slots)
    }
}

fn day_interval(date: NaiveDate) -> AppResult<TimeInterval> {
    let next = date
        .succ_opt()
        .ok_or_else(|| AppError::invalid_input(format!("no day follows {date}")))?;
    TimeInterval::new(date.and_time(NaiveTime::MIN), next.and_time(NaiveTime::MIN))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::models::{BookingStatus, DateRange};
    use chrono::Utc;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot(h1: u32, m1: u32, h2: u32, m2: u32) -> TimeInterval {
        TimeInterval::new(monday().and_time(time(h1, m1)), monday().and_time(time(h2, m2))).unwrap()
    }

    fn monday_shifts(employee: Uuid) -> Vec<WorkShift> {
        vec![
            WorkShift::new(employee, 1, time(9, 0), time(17, 0), false).unwrap(),
            WorkShift::new(employee, 1, time(13, 0), time(14, 0), true).unwrap(),
        ]
    }

    #[test]
    fn test_break_blocks_overlapping_slot_only() {
        let shifts = monday_shifts(Uuid::new_v4());
        assert_eq!(
            hours_rule(&shifts, &slot(13, 0, 13, 30)),
            Some(AvailabilityDecision::DuringBreak)
        );
        assert_eq!(hours_rule(&shifts, &slot(12, 30, 13, 0)), None);
        assert_eq!(hours_rule(&shifts, &slot(14, 0, 14, 30)), None);
    }

    #[test]
    fn test_slot_must_be_inside_a_shift() {
        let shifts = monday_shifts(Uuid::new_v4());
        assert_eq!(
            hours_rule(&shifts, &slot(16, 30, 17, 30)),
            Some(AvailabilityDecision::OutsideWorkingHours)
        );
        assert_eq!(
            hours_rule(&shifts, &slot(8, 0, 9, 0)),
            Some(AvailabilityDecision::OutsideWorkingHours)
        );
    }

    #[test]
    fn test_unapproved_absence_does_not_block() {
        let employee = Uuid::new_v4();
        let absence = Absence {
            id: Uuid::new_v4(),
            employee_id: employee,
            period: DateRange::new(monday(), monday()).unwrap(),
            approved: false,
            reason: None,
        };
        assert_eq!(absence_rule(&[absence.clone()], &slot(10, 0, 11, 0)), None);

        let approved = Absence {
            approved: true,
            ..absence
        };
        assert_eq!(
            absence_rule(&[approved], &slot(10, 0, 11, 0)),
            Some(AvailabilityDecision::EmployeeAbsent)
        );
    }

    #[test]
    fn test_excluded_booking_does_not_conflict_with_itself() {
        let booking = Booking {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            service_name: "Haircut".into(),
            interval: slot(10, 0, 11, 0),
            status: BookingStatus::Confirmed,
            reminder_sent: false,
            reminder_2h_sent: false,
            calendar_event_id: None,
            created_at: Utc::now(),
        };
        let candidate = slot(10, 30, 11, 30);
        assert_eq!(
            booking_rule(&[booking.clone()], &candidate, None),
            Some(AvailabilityDecision::Conflict { booking_id: booking.id })
        );
        assert_eq!(booking_rule(&[booking.clone()], &candidate, Some(booking.id)), None);
    }

    #[test]
    fn test_negative_decision_maps_to_conflict_error() {
        let candidate = slot(13, 0, 13, 30);
        let err = AvailabilityDecision::DuringBreak
            .into_result(Uuid::new_v4(), &candidate)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceConflict);
        assert!(err.message.contains("during break"));
    }
}

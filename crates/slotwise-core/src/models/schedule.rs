// ABOUTME: Working-hours and time-off models read by the availability checker
// ABOUTME: WorkShift (weekly recurring hours, optionally a break) and Absence (approved date ranges)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::interval::TimeInterval;
use crate::constants::availability::{FIRST_DAY_OF_WEEK, LAST_DAY_OF_WEEK};
use crate::errors::{AppError, AppResult};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

/// Weekly recurring block of working hours
///
/// A shift flagged `is_break` carves a pause out of the working hours of the
/// same day: candidates overlapping it are unavailable even though they sit
/// inside the outer shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkShift {
    /// Shift row id
    pub id: Uuid,
    /// Employee the shift belongs to
    pub employee_id: Uuid,
    /// ISO day of week (Monday = 1 ... Sunday = 7)
    pub day_of_week: u8,
    /// Hours covered on that day
    pub hours: TimeInterval<NaiveTime>,
    /// Whether this block is a break inside working hours
    pub is_break: bool,
}

impl WorkShift {
    /// Create a shift
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `day_of_week` is outside 1..=7 or `start >= end`
    pub fn new(
        employee_id: Uuid,
        day_of_week: u8,
        start: NaiveTime,
        end: NaiveTime,
        is_break: bool,
    ) -> AppResult<Self> {
        if !(FIRST_DAY_OF_WEEK..=LAST_DAY_OF_WEEK).contains(&day_of_week) {
            return Err(AppError::invalid_input(format!(
                "day_of_week must be between {FIRST_DAY_OF_WEEK} and {LAST_DAY_OF_WEEK}, got {day_of_week}"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            employee_id,
            day_of_week,
            hours: TimeInterval::new(start, end)?,
            is_break,
        })
    }

    /// Whether this shift applies to the given ISO weekday
    #[must_use]
    pub const fn applies_on(&self, day_of_week: u8) -> bool {
        self.day_of_week == day_of_week
    }
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// First day covered
    pub first: NaiveDate,
    /// Last day covered (inclusive)
    pub last: NaiveDate,
}

impl DateRange {
    /// Create a date range
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `last` is before `first`
    pub fn new(first: NaiveDate, last: NaiveDate) -> AppResult<Self> {
        if last < first {
            return Err(AppError::invalid_input(format!(
                "date range ends ({last}) before it starts ({first})"
            )));
        }
        Ok(Self { first, last })
    }

    /// Wall-clock interval `[first 00:00, (last + 1) 00:00)`
    ///
    /// A range ending on the last representable date is clamped to end at
    /// `NaiveDateTime::MAX`, one nanosecond short of the following midnight.
    #[must_use]
    pub fn to_interval(&self) -> TimeInterval {
        let end = self
            .last
            .checked_add_days(Days::new(1))
            .map_or(NaiveDateTime::MAX, |after_last| after_last.and_time(NaiveTime::MIN));
        TimeInterval::from_ordered(self.first.and_time(NaiveTime::MIN), end)
    }
}

/// Time off for an employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Absence {
    /// Absence row id
    pub id: Uuid,
    /// Employee who is away
    pub employee_id: Uuid,
    /// Days covered
    pub period: DateRange,
    /// Only approved absences block bookings
    pub approved: bool,
    /// Free-form reason (vacation, sick leave, ...)
    pub reason: Option<String>,
}

impl Absence {
    /// Whether this absence makes `candidate` unbookable
    #[must_use]
    pub fn blocks(&self, candidate: &TimeInterval) -> bool {
        self.approved && self.period.to_interval().overlaps(candidate)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[test]
    fn test_shift_rejects_invalid_weekday() {
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let end = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        assert!(WorkShift::new(Uuid::new_v4(), 0, start, end, false).is_err());
        assert!(WorkShift::new(Uuid::new_v4(), 8, start, end, false).is_err());
        assert!(WorkShift::new(Uuid::new_v4(), 7, start, end, false).is_ok());
    }

    #[test]
    fn test_absence_covers_whole_last_day() {
        let absence = Absence {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            period: DateRange::new(date(3), date(4)).unwrap(),
            approved: true,
            reason: None,
        };
        let late_on_last_day =
            TimeInterval::new(date(4).and_hms_opt(22, 0, 0).unwrap(), date(4).and_hms_opt(23, 0, 0).unwrap())
                .unwrap();
        let next_morning =
            TimeInterval::new(date(5).and_hms_opt(0, 0, 0).unwrap(), date(5).and_hms_opt(1, 0, 0).unwrap())
                .unwrap();

        assert!(absence.blocks(&late_on_last_day));
        assert!(!absence.blocks(&next_morning));
    }

    #[test]
    fn test_unapproved_absence_never_blocks() {
        let absence = Absence {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            period: DateRange::new(date(3), date(3)).unwrap(),
            approved: false,
            reason: Some("pending request".into()),
        };
        let noon =
            TimeInterval::new(date(3).and_hms_opt(12, 0, 0).unwrap(), date(3).and_hms_opt(13, 0, 0).unwrap())
                .unwrap();
        assert!(!absence.blocks(&noon));
    }

    #[test]
    fn test_range_ending_on_last_date_keeps_a_nonempty_interval() {
        let day_before = NaiveDate::MAX.pred_opt().unwrap();
        let single_day = DateRange::new(NaiveDate::MAX, NaiveDate::MAX).unwrap();
        let interval = single_day.to_interval();
        assert!(interval.start() < interval.end());
        assert_eq!(interval.end(), NaiveDateTime::MAX);

        let evening = TimeInterval::new(
            NaiveDate::MAX.and_hms_opt(22, 0, 0).unwrap(),
            NaiveDate::MAX.and_hms_opt(23, 0, 0).unwrap(),
        )
        .unwrap();
        assert!(interval.overlaps(&evening));

        let earlier = DateRange::new(day_before, NaiveDate::MAX).unwrap().to_interval();
        assert_eq!(earlier.start(), day_before.and_time(NaiveTime::MIN));
        assert!(earlier.contains(&evening));
    }
}

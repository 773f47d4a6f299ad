// ABOUTME: Half-open time interval value type shared by bookings, shifts and absences
// ABOUTME: Enforces start < end at construction and implements overlap/containment rules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;
use std::fmt;

/// Half-open time range `[start, end)`
///
/// Booking instants use the default `NaiveDateTime` parameter (business-local
/// wall clock); recurring shift hours use `TimeInterval<NaiveTime>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeInterval<T = NaiveDateTime> {
    start: T,
    end: T,
}

impl<T: Ord + Copy + fmt::Debug> TimeInterval<T> {
    /// Create an interval
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `start >= end` (zero-length or inverted)
    pub fn new(start: T, end: T) -> AppResult<Self> {
        if start >= end {
            return Err(AppError::invalid_input(format!(
                "interval start {start:?} must be strictly before end {end:?}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Caller guarantees `start < end`
    pub(crate) fn from_ordered(start: T, end: T) -> Self {
        debug_assert!(start < end);
        Self { start, end }
    }

    /// Inclusive lower bound
    #[must_use]
    pub fn start(&self) -> T {
        self.start
    }

    /// Exclusive upper bound
    #[must_use]
    pub fn end(&self) -> T {
        self.end
    }

    /// `[a,b)` and `[c,d)` overlap iff `a < d && c < b`; touching bounds do not
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies entirely inside `self`
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl TimeInterval<NaiveDateTime> {
    /// Length of the interval
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Calendar date the interval starts on
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// ISO day of week of the start (Monday = 1 ... Sunday = 7)
    #[must_use]
    pub fn day_of_week(&self) -> u8 {
        self.start.weekday().number_from_monday() as u8
    }

    /// Wall-clock hours covered, or `None` when the interval crosses midnight
    #[must_use]
    pub fn time_of_day(&self) -> Option<TimeInterval<NaiveTime>> {
        (self.start.date() == self.end.date())
            .then(|| TimeInterval::from_ordered(self.start.time(), self.end.time()))
    }

    /// Project daily hours onto a concrete date
    #[must_use]
    pub fn on_date(date: NaiveDate, hours: &TimeInterval<NaiveTime>) -> Self {
        Self::from_ordered(date.and_time(hours.start), date.and_time(hours.end))
    }
}

impl<T: fmt::Display> fmt::Display for TimeInterval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

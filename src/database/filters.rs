// ABOUTME: Typed predicates for booking queries compiled into parameter-bound SQL
// ABOUTME: No caller-supplied value is ever spliced into the statement text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::models::{BookingStatus, ReminderKind, TimeInterval};
use chrono::NaiveDateTime;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

const BOOKING_COLUMNS: &str = "id, employee_id, client_id, service_name, start_at, end_at, status, \
     reminder_sent, reminder_2h_sent, calendar_event_id, created_at";

/// One condition on the bookings table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingPredicate {
    /// Exactly this booking
    Id(Uuid),
    /// Owned by this employee
    Employee(Uuid),
    /// Booked by this client
    Client(Uuid),
    /// Status is one of these
    StatusIn(Vec<BookingStatus>),
    /// Time overlaps this interval (half-open)
    Overlaps(TimeInterval),
    /// Not this booking
    Excluding(Uuid),
    /// Starts in `(after, until]`
    StartsWithin {
        /// Exclusive lower bound
        after: NaiveDateTime,
        /// Inclusive upper bound
        until: NaiveDateTime,
    },
    /// The given reminder has not been sent
    ReminderPending(ReminderKind),
}

/// Conjunction of booking predicates, ordered by start time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    predicates: Vec<BookingPredicate>,
    limit: Option<i64>,
}

impl BookingFilter {
    /// Empty filter matching every booking
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an arbitrary predicate
    #[must_use]
    pub fn with(mut self, predicate: BookingPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Restrict to one employee
    #[must_use]
    pub fn for_employee(self, employee_id: Uuid) -> Self {
        self.with(BookingPredicate::Employee(employee_id))
    }

    /// Restrict to one client
    #[must_use]
    pub fn for_client(self, client_id: Uuid) -> Self {
        self.with(BookingPredicate::Client(client_id))
    }

    /// Restrict to bookings that occupy their slot
    #[must_use]
    pub fn occupying(self) -> Self {
        self.with(BookingPredicate::StatusIn(BookingStatus::OCCUPYING.to_vec()))
    }

    /// Restrict to bookings overlapping `interval`
    #[must_use]
    pub fn overlapping(self, interval: TimeInterval) -> Self {
        self.with(BookingPredicate::Overlaps(interval))
    }

    /// Skip one booking (used when editing it)
    #[must_use]
    pub fn excluding(self, booking_id: Option<Uuid>) -> Self {
        match booking_id {
            Some(id) => self.with(BookingPredicate::Excluding(id)),
            None => self,
        }
    }

    /// Cap the number of rows
    #[must_use]
    pub const fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Pending or confirmed bookings whose `kind` window is open at `now`
    ///
    /// The window `start - lead <= now < start - close` is the same as
    /// `now + close < start <= now + lead`.
    #[must_use]
    pub fn reminder_due(kind: ReminderKind, now: NaiveDateTime) -> Self {
        Self::new()
            .with(BookingPredicate::StatusIn(BookingStatus::REMINDABLE.to_vec()))
            .with(BookingPredicate::ReminderPending(kind))
            .with(BookingPredicate::StartsWithin {
                after: now + kind.closes_before_start(),
                until: now + kind.lead_time(),
            })
    }

    /// Predicates in insertion order
    #[must_use]
    pub fn predicates(&self) -> &[BookingPredicate] {
        &self.predicates
    }

    /// Compile into a `SELECT` over the bookings table
    #[must_use]
    pub fn to_select(&self) -> QueryBuilder<'static, Sqlite> {
        let mut query = QueryBuilder::new(format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE 1 = 1"));
        for predicate in &self.predicates {
            push_predicate(&mut query, predicate);
        }
        query.push(" ORDER BY start_at ASC, id ASC");
        if let Some(limit) = self.limit {
            query.push(" LIMIT ").push_bind(limit);
        }
        query
    }
}

fn push_predicate(query: &mut QueryBuilder<'static, Sqlite>, predicate: &BookingPredicate) {
    match predicate {
        BookingPredicate::Id(id) => {
            query.push(" AND id = ").push_bind(id.to_string());
        }
        BookingPredicate::Employee(id) => {
            query.push(" AND employee_id = ").push_bind(id.to_string());
        }
        BookingPredicate::Client(id) => {
            query.push(" AND client_id = ").push_bind(id.to_string());
        }
        BookingPredicate::StatusIn(statuses) => {
            if statuses.is_empty() {
                query.push(" AND 0");
                return;
            }
            query.push(" AND status IN (");
            let mut list = query.separated(", ");
            for status in statuses {
                list.push_bind(status.as_str());
            }
            list.push_unseparated(")");
        }
        BookingPredicate::Overlaps(interval) => {
            query
                .push(" AND start_at < ")
                .push_bind(interval.end())
                .push(" AND end_at > ")
                .push_bind(interval.start());
        }
        BookingPredicate::Excluding(id) => {
            query.push(" AND id <> ").push_bind(id.to_string());
        }
        BookingPredicate::StartsWithin { after, until } => {
            query
                .push(" AND start_at > ")
                .push_bind(*after)
                .push(" AND start_at <= ")
                .push_bind(*until);
        }
        BookingPredicate::ReminderPending(kind) => {
            query.push(match kind {
                ReminderKind::DayBefore => " AND reminder_sent = 0",
                ReminderKind::ShortNotice => " AND reminder_2h_sent = 0",
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_values_are_bound_not_inlined() {
        let employee = Uuid::new_v4();
        let filter = BookingFilter::new()
            .for_employee(employee)
            .occupying()
            .overlapping(TimeInterval::new(at(9), at(10)).unwrap());
        let query = filter.to_select();
        let sql = query.sql();

        assert!(!sql.contains(&employee.to_string()));
        assert!(!sql.contains("confirmed"));
        assert!(sql.contains("employee_id = ?"));
        assert!(sql.contains("status IN (?, ?, ?)"));
        assert!(sql.contains("start_at < ?"));
    }

    #[test]
    fn test_empty_status_list_matches_nothing() {
        let query = BookingFilter::new()
            .with(BookingPredicate::StatusIn(Vec::new()))
            .to_select();
        assert!(query.sql().contains("AND 0"));
    }

    #[test]
    fn test_reminder_due_window_bounds() {
        let now = at(8);
        let filter = BookingFilter::reminder_due(ReminderKind::ShortNotice, now);
        assert!(filter.predicates().contains(&BookingPredicate::StartsWithin {
            after: now,
            until: at(10),
        }));
    }

    #[test]
    fn test_excluding_none_adds_nothing() {
        assert!(BookingFilter::new().excluding(None).predicates().is_empty());
    }
}

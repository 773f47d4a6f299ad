// ABOUTME: Message rendering for booking lifecycle notifications
// ABOUTME: Builds email/push payloads and calendar events from a lifecycle event
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::events::{BookingNotice, LifecycleEvent};
use crate::models::{Booking, ReminderKind};
use serde_json::json;
use slotwise_channels::{CalendarEvent, NotificationPayload};

fn when(booking: &Booking) -> String {
    format!(
        "{} from {} to {}",
        booking.interval.date().format("%A %-d %B %Y"),
        booking.interval.start().format("%H:%M"),
        booking.interval.end().format("%H:%M"),
    )
}

fn data(event: &LifecycleEvent) -> serde_json::Value {
    json!({
        "booking_id": event.booking_id(),
        "event": event.kind_str(),
    })
}

/// Message addressed to the client
#[must_use]
pub fn client_payload(event: &LifecycleEvent) -> NotificationPayload {
    let BookingNotice {
        booking, employee, ..
    } = event.notice();
    let (title, body) = match event {
        LifecycleEvent::BookingConfirmed(_) => (
            format!("Booking confirmed: {}", booking.service_name),
            format!(
                "Your {} with {} is confirmed for {}.",
                booking.service_name,
                employee.name,
                when(booking)
            ),
        ),
        LifecycleEvent::ReminderDue { kind, .. } => {
            let lead = match kind {
                ReminderKind::DayBefore => "tomorrow",
                ReminderKind::ShortNotice => "in two hours",
            };
            (
                format!("Reminder: {} {lead}", booking.service_name),
                format!(
                    "Your {} with {} is {lead}: {}.",
                    booking.service_name,
                    employee.name,
                    when(booking)
                ),
            )
        }
        LifecycleEvent::BookingCancelled(_) => (
            format!("Booking cancelled: {}", booking.service_name),
            format!("Your {} on {} was cancelled.", booking.service_name, when(booking)),
        ),
    };
    NotificationPayload {
        title,
        body,
        data: data(event),
    }
}

/// Message addressed to the employee
#[must_use]
pub fn employee_payload(event: &LifecycleEvent) -> NotificationPayload {
    let BookingNotice {
        booking, client, ..
    } = event.notice();
    NotificationPayload {
        title: format!("New booking: {}", booking.service_name),
        body: format!(
            "{} booked {} on {}.",
            client.name,
            booking.service_name,
            when(booking)
        ),
        data: data(event),
    }
}

/// Calendar entry mirroring the booking
#[must_use]
pub fn calendar_event(notice: &BookingNotice) -> CalendarEvent {
    let BookingNotice {
        booking,
        client,
        employee,
    } = notice;
    CalendarEvent {
        booking_id: booking.id,
        external_id: booking.calendar_event_id.clone(),
        title: format!("{} with {}", booking.service_name, client.name),
        description: format!(
            "{} for {} ({}), provided by {}",
            booking.service_name, client.name, client.email, employee.name
        ),
        interval: booking.interval,
        attendees: vec![client.email.clone(), employee.email.clone()],
    }
}

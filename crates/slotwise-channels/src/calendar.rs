// ABOUTME: Calendar channel mirroring bookings as events in an external calendar API
// ABOUTME: Creates (POST), updates (PUT) and deletes (DELETE) event resources by external id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::http_client::{classify_transport, ensure_success};
use crate::{CalendarChannel, CalendarEvent, ChannelError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use slotwise_core::constants::channels::CALENDAR;
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct EventBody<'a> {
    booking_id: String,
    title: &'a str,
    description: &'a str,
    start: String,
    end: String,
    attendees: &'a [String],
}

impl<'a> From<&'a CalendarEvent> for EventBody<'a> {
    fn from(event: &'a CalendarEvent) -> Self {
        Self {
            booking_id: event.booking_id.to_string(),
            title: &event.title,
            description: &event.description,
            start: event.interval.start().format("%Y-%m-%dT%H:%M:%S").to_string(),
            end: event.interval.end().format("%Y-%m-%dT%H:%M:%S").to_string(),
            attendees: &event.attendees,
        }
    }
}

#[derive(Deserialize)]
struct CreatedEvent {
    id: String,
}

/// Calendar synchronisation through a REST events resource
pub struct HttpCalendarChannel {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl HttpCalendarChannel {
    /// Create a calendar channel for `base_url` (events live under `{base_url}/events`)
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            request_timeout,
        }
    }

    fn event_url(&self, external_id: &str) -> String {
        format!("{}/events/{external_id}", self.base_url)
    }
}

#[async_trait]
impl CalendarChannel for HttpCalendarChannel {
    fn name(&self) -> &str {
        CALENDAR
    }

    async fn upsert(&self, event: &CalendarEvent) -> Result<String, ChannelError> {
        let body = EventBody::from(event);
        let request = match &event.external_id {
            Some(existing) => self.client.put(self.event_url(existing)),
            None => self.client.post(format!("{}/events", self.base_url)),
        };

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport(CALENDAR, &e, self.request_timeout))?;
        let response = ensure_success(CALENDAR, response).await?;

        if let Some(existing) = &event.external_id {
            debug!(booking.id = %event.booking_id, event.id = %existing, "Calendar event updated");
            return Ok(existing.clone());
        }

        let created: CreatedEvent = response
            .json()
            .await
            .map_err(|e| ChannelError::send_failed(CALENDAR, format!("unreadable create reply: {e}")))?;
        debug!(booking.id = %event.booking_id, event.id = %created.id, "Calendar event created");
        Ok(created.id)
    }

    async fn delete(&self, external_event_id: &str) -> Result<(), ChannelError> {
        let response = self
            .client
            .delete(self.event_url(external_event_id))
            .send()
            .await
            .map_err(|e| classify_transport(CALENDAR, &e, self.request_timeout))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(event.id = %external_event_id, "Calendar event already gone");
            return Ok(());
        }
        ensure_success(CALENDAR, response).await?;
        Ok(())
    }
}

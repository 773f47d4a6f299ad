// ABOUTME: Stand-in adapter for channels that have no backend configured
// ABOUTME: Always reports itself unreachable so fallback policies engage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::{
    CalendarChannel, CalendarEvent, ChannelError, DeliveryReport, NotificationChannel,
    NotificationPayload, Target,
};
use async_trait::async_trait;

/// Channel without a configured backend
pub struct DisabledChannel {
    name: &'static str,
}

impl DisabledChannel {
    /// Create a disabled channel carrying the given name
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    fn not_configured(&self) -> ChannelError {
        ChannelError::unreachable(self.name, "channel is not configured")
    }
}

#[async_trait]
impl NotificationChannel for DisabledChannel {
    fn name(&self) -> &str {
        self.name
    }

    fn is_reachable(&self) -> bool {
        false
    }

    async fn send(
        &self,
        _target: &Target,
        _payload: &NotificationPayload,
    ) -> Result<DeliveryReport, ChannelError> {
        Err(self.not_configured())
    }
}

#[async_trait]
impl CalendarChannel for DisabledChannel {
    fn name(&self) -> &str {
        self.name
    }

    async fn upsert(&self, _event: &CalendarEvent) -> Result<String, ChannelError> {
        Err(self.not_configured())
    }

    async fn delete(&self, _external_event_id: &str) -> Result<(), ChannelError> {
        Err(self.not_configured())
    }
}

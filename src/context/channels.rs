// ABOUTME: Construction of the notification channel adapters from configuration
// ABOUTME: Shares one HTTP client and substitutes disabled channels for missing URLs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::config::ChannelConfig;
use crate::constants::channels;
use anyhow::{Context as _, Result};
use slotwise_channels::http_client::build_client;
use slotwise_channels::{
    CalendarChannel, CircuitBreaker, CircuitBreakerConfig, DisabledChannel, HttpCalendarChannel,
    HttpEmailChannel, HttpPushChannel, NotificationChannel,
};
use std::sync::Arc;
use tracing::warn;

/// The three delivery backends the orchestrator fans out to
#[derive(Clone)]
pub struct ChannelSet {
    /// Email relay
    pub email: Arc<dyn NotificationChannel>,
    /// Push gateway
    pub push: Arc<dyn NotificationChannel>,
    /// External calendar
    pub calendar: Arc<dyn CalendarChannel>,
}

impl ChannelSet {
    /// Build HTTP adapters for every configured backend
    ///
    /// # Errors
    ///
    /// Returns an error if the shared HTTP client cannot be built
    pub fn from_config(config: &ChannelConfig) -> Result<Self> {
        let client = build_client(config.send_timeout, config.connect_timeout)
            .context("failed to build HTTP client for notification channels")?;

        let email: Arc<dyn NotificationChannel> = match &config.email_relay_url {
            Some(url) => Arc::new(HttpEmailChannel::new(
                client.clone(),
                url.as_str(),
                config.email_sender.as_str(),
                config.send_timeout,
            )),
            None => disabled(channels::EMAIL, "EMAIL_RELAY_URL"),
        };

        let push: Arc<dyn NotificationChannel> = match &config.push_gateway_url {
            Some(url) => {
                let breaker = CircuitBreaker::with_config(
                    channels::PUSH,
                    CircuitBreakerConfig::new(config.push_failure_threshold, config.push_recovery_timeout),
                );
                Arc::new(HttpPushChannel::new(client.clone(), url.as_str(), breaker, config.send_timeout))
            }
            None => disabled(channels::PUSH, "PUSH_GATEWAY_URL"),
        };

        let calendar: Arc<dyn CalendarChannel> = match &config.calendar_api_url {
            Some(url) => Arc::new(HttpCalendarChannel::new(client, url.as_str(), config.send_timeout)),
            None => {
                warn!(channel = channels::CALENDAR, "CALENDAR_API_URL not set, calendar sync disabled");
                Arc::new(DisabledChannel::new(channels::CALENDAR))
            }
        };

        Ok(Self {
            email,
            push,
            calendar,
        })
    }
}

fn disabled(name: &'static str, variable: &str) -> Arc<dyn NotificationChannel> {
    warn!(channel = name, "{variable} not set, channel disabled");
    Arc::new(DisabledChannel::new(name))
}

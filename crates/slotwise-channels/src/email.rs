// ABOUTME: Email channel posting rendered messages to an HTTP mail relay
// ABOUTME: One send per mailbox; relay outages are reported as structural failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::http_client::{classify_transport, ensure_success};
use crate::{ChannelError, DeliveryReport, NotificationChannel, NotificationPayload, Target};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use slotwise_core::constants::channels::EMAIL;
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    to_name: &'a str,
    subject: &'a str,
    text: &'a str,
    metadata: &'a serde_json::Value,
}

/// Email delivery through an HTTP relay endpoint
pub struct HttpEmailChannel {
    client: Client,
    endpoint: String,
    sender: String,
    request_timeout: Duration,
}

impl HttpEmailChannel {
    /// Create an email channel
    #[must_use]
    pub fn new(client: Client, endpoint: impl Into<String>, sender: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            sender: sender.into(),
            request_timeout,
        }
    }
}

#[async_trait]
impl NotificationChannel for HttpEmailChannel {
    fn name(&self) -> &str {
        EMAIL
    }

    async fn send(
        &self,
        target: &Target,
        payload: &NotificationPayload,
    ) -> Result<DeliveryReport, ChannelError> {
        let Target::Email { address, name } = target else {
            return Err(ChannelError::send_failed(
                EMAIL,
                format!("cannot email {}", target.describe()),
            ));
        };

        let message = RelayMessage {
            from: &self.sender,
            to: address,
            to_name: name,
            subject: &payload.title,
            text: &payload.body,
            metadata: &payload.data,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&message)
            .send()
            .await
            .map_err(|e| classify_transport(EMAIL, &e, self.request_timeout))?;
        ensure_success(EMAIL, response).await?;

        debug!(to = %address, subject = %payload.title, "Email accepted by relay");
        Ok(DeliveryReport::single())
    }
}

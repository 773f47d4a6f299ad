// ABOUTME: Push channel posting to a multicast push gateway behind a circuit breaker
// ABOUTME: Reports unregistered device tokens so the caller can stop targeting them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::circuit_breaker::CircuitBreaker;
use crate::http_client::{classify_transport, ensure_success};
use crate::{ChannelError, DeliveryReport, NotificationChannel, NotificationPayload, Target};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use slotwise_core::constants::channels::PUSH;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Serialize)]
struct MulticastRequest<'a> {
    tokens: &'a [String],
    title: &'a str,
    body: &'a str,
    data: &'a serde_json::Value,
}

/// Gateway answer to a multicast send
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayReply {
    /// Devices the message was handed to
    #[serde(default)]
    pub delivered: usize,
    /// Tokens the provider no longer recognises
    #[serde(default)]
    pub invalid_tokens: Vec<String>,
}

impl GatewayReply {
    /// Interpret the reply for a send to `requested` tokens
    ///
    /// # Errors
    ///
    /// Returns `SendFailed` (carrying the invalid tokens) when no device accepted the message
    pub fn into_report(self, requested: usize) -> Result<DeliveryReport, ChannelError> {
        if self.delivered == 0 && requested > 0 {
            return Err(ChannelError::rejected_targets(
                PUSH,
                format!("no device accepted the message ({} invalid)", self.invalid_tokens.len()),
                self.invalid_tokens,
            ));
        }
        Ok(DeliveryReport {
            accepted: self.delivered,
            invalid_targets: self.invalid_tokens,
        })
    }
}

/// Push delivery through a multicast gateway
pub struct HttpPushChannel {
    client: Client,
    endpoint: String,
    breaker: CircuitBreaker,
    request_timeout: Duration,
}

impl HttpPushChannel {
    /// Create a push channel guarded by `breaker`
    #[must_use]
    pub fn new(client: Client, endpoint: impl Into<String>, breaker: CircuitBreaker, request_timeout: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            breaker,
            request_timeout,
        }
    }

    async fn post(&self, tokens: &[String], payload: &NotificationPayload) -> Result<GatewayReply, ChannelError> {
        let request = MulticastRequest {
            tokens,
            title: &payload.title,
            body: &payload.body,
            data: &payload.data,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_transport(PUSH, &e, self.request_timeout))?;
        let response = ensure_success(PUSH, response).await?;
        response
            .json::<GatewayReply>()
            .await
            .map_err(|e| ChannelError::send_failed(PUSH, format!("unreadable gateway reply: {e}")))
    }
}

#[async_trait]
impl NotificationChannel for HttpPushChannel {
    fn name(&self) -> &str {
        PUSH
    }

    fn is_reachable(&self) -> bool {
        !self.breaker.is_open()
    }

    async fn send(
        &self,
        target: &Target,
        payload: &NotificationPayload,
    ) -> Result<DeliveryReport, ChannelError> {
        let Target::Devices { user_id, tokens } = target else {
            return Err(ChannelError::send_failed(
                PUSH,
                format!("cannot push to {}", target.describe()),
            ));
        };
        if tokens.is_empty() {
            return Err(ChannelError::send_failed(PUSH, "no device tokens given"));
        }

        let reply = self.breaker.call(self.post(tokens, payload)).await?;
        if !reply.invalid_tokens.is_empty() {
            warn!(
                user.id = %user_id,
                invalid = reply.invalid_tokens.len(),
                "Push gateway reported unregistered device tokens"
            );
        }
        debug!(user.id = %user_id, delivered = reply.delivered, "Push handed to gateway");
        reply.into_report(tokens.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_delivery_reports_invalid_tokens() {
        let reply = GatewayReply {
            delivered: 1,
            invalid_tokens: vec!["dead".into()],
        };
        let report = reply.into_report(2).unwrap();
        assert_eq!(report.accepted, 1);
        assert_eq!(report.invalid_targets, vec!["dead".to_owned()]);
    }

    #[test]
    fn test_nothing_delivered_is_a_failed_send() {
        let reply = GatewayReply {
            delivered: 0,
            invalid_tokens: vec!["a".into(), "b".into()],
        };
        let err = reply.into_report(2).unwrap_err();
        assert!(!err.is_structural());
        assert_eq!(err.invalid_targets().len(), 2);
    }

    #[test]
    fn test_gateway_reply_fields_default() {
        let reply: GatewayReply = serde_json::from_str("{}").unwrap();
        assert_eq!(reply.delivered, 0);
        assert!(reply.invalid_tokens.is_empty());
    }
}

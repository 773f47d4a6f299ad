// ABOUTME: HTTP client construction shared by all channel adapters
// ABOUTME: Maps transport failures and HTTP statuses onto structural vs per-send channel errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use reqwest::{Client, ClientBuilder, Response, StatusCode};
use slotwise_core::errors::ChannelError;
use std::time::Duration;

/// Build the HTTP client shared by the channel adapters
///
/// Constructed once at process start and handed to each adapter.
///
/// # Errors
///
/// Returns `ChannelError::Unreachable` if the TLS backend cannot be initialised
pub fn build_client(request_timeout: Duration, connect_timeout: Duration) -> Result<Client, ChannelError> {
    ClientBuilder::new()
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        .user_agent(concat!("slotwise/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ChannelError::unreachable("http", format!("client construction failed: {e}")))
}

/// Classify a transport-level failure
///
/// Connection failures are structural; anything that got as far as sending a
/// request is a per-send failure.
#[must_use]
pub fn classify_transport(channel: &str, error: &reqwest::Error, timeout: Duration) -> ChannelError {
    if error.is_timeout() {
        ChannelError::timeout(channel, timeout.as_millis() as u64)
    } else if error.is_connect() {
        ChannelError::unreachable(channel, format!("connection failed: {error}"))
    } else {
        ChannelError::send_failed(channel, error.to_string())
    }
}

/// Classify a non-success HTTP status
///
/// Gateway errors (502/503/504) mean the backend behind the endpoint is down.
#[must_use]
pub fn classify_status(channel: &str, status: StatusCode, body: &str) -> ChannelError {
    let detail = if body.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {}", truncate(body, 200))
    };

    match status {
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            ChannelError::unreachable(channel, detail)
        }
        _ => ChannelError::send_failed(channel, detail),
    }
}

/// Turn a response into an error unless its status is a success
///
/// # Errors
///
/// Returns the classified `ChannelError` for non-2xx responses
pub async fn ensure_success(channel: &str, response: Response) -> Result<Response, ChannelError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify_status(channel, status, &body))
}

fn truncate(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(idx, _)| &text[..idx])
}

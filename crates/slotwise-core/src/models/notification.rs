// ABOUTME: Per-channel outcome of a notification dispatch
// ABOUTME: Records success, error text, invalidated targets and external references
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::errors::ChannelError;
use serde::{Deserialize, Serialize};

/// Result of one channel send within a dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOutcome {
    /// Channel that produced the outcome (e.g. `push`, `email`)
    pub channel_name: String,
    /// Whether the send succeeded
    pub success: bool,
    /// Failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Targets the channel reported as permanently invalid
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalidated_targets: Vec<String>,
    /// Identifier returned by the channel (calendar event id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
    /// Wall time spent on the send
    pub elapsed_ms: u64,
}

impl NotificationOutcome {
    /// Successful send
    pub fn delivered(channel_name: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            channel_name: channel_name.into(),
            success: true,
            error: None,
            invalidated_targets: Vec::new(),
            external_ref: None,
            elapsed_ms,
        }
    }

    /// Failed send
    pub fn failed(channel_name: impl Into<String>, error: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            channel_name: channel_name.into(),
            success: false,
            error: Some(error.into()),
            invalidated_targets: Vec::new(),
            external_ref: None,
            elapsed_ms,
        }
    }

    /// Failed send described by a channel error
    #[must_use]
    pub fn from_channel_error(error: &ChannelError, elapsed_ms: u64) -> Self {
        Self {
            invalidated_targets: error.invalid_targets().to_vec(),
            ..Self::failed(error.channel(), error.to_string(), elapsed_ms)
        }
    }

    /// Attach targets reported invalid
    #[must_use]
    pub fn with_invalidated_targets(mut self, targets: Vec<String>) -> Self {
        self.invalidated_targets = targets;
        self
    }

    /// Attach an external reference
    #[must_use]
    pub fn with_external_ref(mut self, external_ref: impl Into<String>) -> Self {
        self.external_ref = Some(external_ref.into());
        self
    }
}

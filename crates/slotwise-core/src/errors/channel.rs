// ABOUTME: Structured error types for notification channel sends
// ABOUTME: Separates structural outages from single failed sends and timeouts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use thiserror::Error;

/// Failure of a single channel operation (email, push, calendar)
///
/// Only [`ChannelError::Unreachable`] describes a structural outage. The
/// notification orchestrator uses that distinction to decide whether an
/// employee push is replaced by an email.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// Backend cannot be reached at all (not configured, connection refused, circuit open)
    #[error("{channel} is unreachable: {reason}")]
    Unreachable {
        /// Channel name
        channel: String,
        /// What made the backend unreachable
        reason: String,
    },

    /// Backend was reached but rejected or failed this send
    #[error("{channel} send failed: {reason}")]
    SendFailed {
        /// Channel name
        channel: String,
        /// Failure description
        reason: String,
        /// Targets the backend reported as permanently invalid
        invalid_targets: Vec<String>,
    },

    /// Send did not complete within its timeout
    #[error("{channel} did not respond within {timeout_ms}ms")]
    Timeout {
        /// Channel name
        channel: String,
        /// Timeout that elapsed
        timeout_ms: u64,
    },
}

impl ChannelError {
    /// Create an unreachable error
    pub fn unreachable(channel: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unreachable {
            channel: channel.into(),
            reason: reason.into(),
        }
    }

    /// Create a send failure without invalid targets
    pub fn send_failed(channel: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SendFailed {
            channel: channel.into(),
            reason: reason.into(),
            invalid_targets: Vec::new(),
        }
    }

    /// Create a send failure naming targets the backend rejected permanently
    pub fn rejected_targets(
        channel: impl Into<String>,
        reason: impl Into<String>,
        invalid_targets: Vec<String>,
    ) -> Self {
        Self::SendFailed {
            channel: channel.into(),
            reason: reason.into(),
            invalid_targets,
        }
    }

    /// Create a timeout error
    pub fn timeout(channel: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            channel: channel.into(),
            timeout_ms,
        }
    }

    /// Whether the backend is structurally unavailable
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }

    /// Whether the failure says something about backend health
    ///
    /// Rejections of a single payload do not; outages and timeouts do.
    #[must_use]
    pub const fn counts_against_backend(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::Timeout { .. })
    }

    /// Targets reported as permanently invalid
    #[must_use]
    pub fn invalid_targets(&self) -> &[String] {
        match self {
            Self::SendFailed {
                invalid_targets, ..
            } => invalid_targets,
            Self::Unreachable { .. } | Self::Timeout { .. } => &[],
        }
    }

    /// Channel the error originated from
    #[must_use]
    pub fn channel(&self) -> &str {
        match self {
            Self::Unreachable { channel, .. }
            | Self::SendFailed { channel, .. }
            | Self::Timeout { channel, .. } => channel,
        }
    }
}

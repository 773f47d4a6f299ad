// ABOUTME: Addressable identities of clients and employees
// ABOUTME: Contact details and registered push device tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AppError;

/// Role a user plays towards the business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Books services
    Client,
    /// Provides services and owns a schedule
    Employee,
}

impl UserRole {
    /// Stored representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Employee => "employee",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "employee" => Ok(Self::Employee),
            other => Err(AppError::invalid_input(format!("unknown user role '{other}'"))),
        }
    }
}

/// Who a notification is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// User id
    pub user_id: Uuid,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Client or employee
    pub role: UserRole,
}

/// Push device registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceToken {
    /// Token issued by the push provider
    pub token: String,
    /// Owner of the device
    pub user_id: Uuid,
    /// Platform label (ios, android, web)
    pub platform: String,
    /// Inactive tokens are never targeted again
    pub active: bool,
    /// Registration time
    pub registered_at: DateTime<Utc>,
}

// ABOUTME: Argument value parsers for slotwise-cli
// ABOUTME: Accepts minute-precision local datetimes and times without seconds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{NaiveDateTime, NaiveTime};
use slotwise::errors::AppError;
use slotwise::models::UserRole;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse `YYYY-MM-DDTHH:MM` (seconds optional)
pub fn parse_local_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| format!("invalid datetime '{raw}', expected YYYY-MM-DDTHH:MM"))
}

/// Parse `HH:MM` (seconds optional)
pub fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|e| format!("invalid time '{raw}': {e}"))
}

/// Parse `client` or `employee`
pub fn parse_role(raw: &str) -> Result<UserRole, String> {
    raw.trim().to_lowercase().parse().map_err(|e: AppError| e.message)
}

// ABOUTME: Push device token database operations
// ABOUTME: Registration, active-token lookup and deactivation of tokens the push provider rejected
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::{parse_uuid, Database};
use crate::database::DeviceTokenRepository;
use crate::errors::{AppError, AppResult, DatabaseError};
use crate::models::DeviceToken;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::info;
use uuid::Uuid;

impl Database {
    pub(super) async fn migrate_tokens(&self) -> Result<(), DatabaseError> {
        self.run_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS device_tokens (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                platform TEXT NOT NULL,
                active BOOLEAN NOT NULL DEFAULT 1,
                registered_at DATETIME NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_device_tokens_user_active ON device_tokens(user_id, active)",
        ])
        .await
    }

    /// Every token registered for a user, active or not
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded
    pub async fn list_tokens(&self, user_id: Uuid) -> AppResult<Vec<DeviceToken>> {
        let rows = sqlx::query(
            "SELECT token, user_id, platform, active, registered_at FROM device_tokens WHERE user_id = ? ORDER BY registered_at",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> AppResult<DeviceToken> {
                let owner: String = row.try_get("user_id")?;
                let registered_at: DateTime<Utc> = row.try_get("registered_at")?;
                Ok(DeviceToken {
                    token: row.try_get("token")?,
                    user_id: parse_uuid("device_tokens.user_id", &owner)?,
                    platform: row.try_get("platform")?,
                    active: row.try_get("active")?,
                    registered_at,
                })
            })
            .collect()
    }
}

#[async_trait]
impl DeviceTokenRepository for Database {
    async fn active_tokens(&self, user_id: Uuid) -> AppResult<Vec<String>> {
        let tokens: Vec<(String,)> = sqlx::query_as(
            "SELECT token FROM device_tokens WHERE user_id = ? AND active = 1 ORDER BY registered_at",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        Ok(tokens.into_iter().map(|(token,)| token).collect())
    }

    async fn register_token(&self, user_id: Uuid, token: &str, platform: &str) -> AppResult<DeviceToken> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::invalid_input("device token must not be empty"));
        }

        let registered = DeviceToken {
            token: token.to_owned(),
            user_id,
            platform: platform.trim().to_lowercase(),
            active: true,
            registered_at: Utc::now(),
        };

        // A token moving to another user (device handed over) follows the latest registration
        sqlx::query(
            r"
            INSERT INTO device_tokens (token, user_id, platform, active, registered_at)
            VALUES (?, ?, ?, 1, ?)
            ON CONFLICT(token) DO UPDATE SET
                user_id = excluded.user_id,
                platform = excluded.platform,
                active = 1,
                registered_at = excluded.registered_at
            ",
        )
        .bind(&registered.token)
        .bind(user_id.to_string())
        .bind(&registered.platform)
        .bind(registered.registered_at)
        .execute(&self.pool)
        .await?;

        Ok(registered)
    }

    async fn deactivate_tokens(&self, tokens: &[String]) -> AppResult<u64> {
        if tokens.is_empty() {
            return Ok(0);
        }

        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("UPDATE device_tokens SET active = 0 WHERE active = 1 AND token IN (");
        {
            let mut list = query.separated(", ");
            for token in tokens {
                list.push_bind(token.as_str());
            }
            list.push_unseparated(")");
        }

        let changed = query.build().execute(&self.pool).await?.rows_affected();
        info!(requested = tokens.len(), deactivated = changed, "Deactivated invalid push tokens");
        Ok(changed)
    }
}

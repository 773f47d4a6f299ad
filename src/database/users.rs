// ABOUTME: User and contact database operations
// ABOUTME: Stores clients and employees and answers contact lookups for notifications
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::{parse_uuid, Database};
use crate::database::ContactRepository;
use crate::errors::{AppError, AppResult, DatabaseError};
use crate::models::{Contact, UserRole};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    pub(super) async fn migrate_users(&self) -> Result<(), DatabaseError> {
        self.run_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('client', 'employee')),
                created_at DATETIME NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)",
        ])
        .await
    }

    /// Create a client or employee
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank name or email and `ResourceConflict`
    /// if the email is already registered
    pub async fn create_user(&self, name: &str, email: &str, role: UserRole) -> AppResult<Contact> {
        let name = name.trim();
        let email = email.trim().to_lowercase();
        if name.is_empty() || email.is_empty() {
            return Err(AppError::invalid_input("name and email are required"));
        }

        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_some() {
            return Err(AppError::conflict(format!("email {email} is already registered")));
        }

        let contact = Contact {
            user_id: Uuid::new_v4(),
            name: name.to_owned(),
            email,
            role,
        };
        sqlx::query("INSERT INTO users (id, name, email, role, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(contact.user_id.to_string())
            .bind(&contact.name)
            .bind(&contact.email)
            .bind(role.as_str())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(contact)
    }

    /// Every user with the given role, by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded
    pub async fn list_users(&self, role: UserRole) -> AppResult<Vec<Contact>> {
        let rows = sqlx::query("SELECT id, name, email, role FROM users WHERE role = ? ORDER BY name")
            .bind(role.as_str())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(contact_from_row).collect()
    }
}

fn contact_from_row(row: &SqliteRow) -> AppResult<Contact> {
    let id: String = row.try_get("id")?;
    let role: String = row.try_get("role")?;
    Ok(Contact {
        user_id: parse_uuid("users.id", &id)?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role: role.parse().map_err(|e: AppError| DatabaseError::InvalidData {
            field: "users.role",
            reason: e.message,
        })?,
    })
}

#[async_trait]
impl ContactRepository for Database {
    async fn get_contact(&self, user_id: Uuid) -> AppResult<Option<Contact>> {
        let row = sqlx::query("SELECT id, name, email, role FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(contact_from_row).transpose()
    }
}

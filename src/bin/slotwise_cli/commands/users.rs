// ABOUTME: User management subcommands for slotwise-cli
// ABOUTME: Registers clients and employees and lists them by role
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::helpers::display::display_contacts;
use anyhow::Result;
use slotwise::context::AppContext;
use slotwise::models::UserRole;

pub async fn create(context: &AppContext, name: &str, email: &str, role: UserRole) -> Result<()> {
    let contact = context.database().create_user(name, email, role).await?;
    println!("Created {} {} <{}>", contact.role, contact.user_id, contact.email);
    Ok(())
}

pub async fn list(context: &AppContext, role: UserRole) -> Result<()> {
    let contacts = context.database().list_users(role).await?;
    display_contacts(&contacts);
    Ok(())
}

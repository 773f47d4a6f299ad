// ABOUTME: Slotwise CLI - command-line tool for schedule inspection and maintenance
// ABOUTME: Runs migrations, checks availability, lists free slots and triggers reminder cycles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
//!
//! Usage:
//! ```bash
//! # Create the schema
//! slotwise-cli migrate
//!
//! # Register an employee and a Monday shift with a lunch break
//! slotwise-cli user create --name "Grace" --email grace@example.com --role employee
//! slotwise-cli shift add --employee <uuid> --day 1 --start 09:00 --end 17:00
//! slotwise-cli shift add --employee <uuid> --day 1 --start 13:00 --end 14:00 --break
//!
//! # Ask whether a slot is bookable
//! slotwise-cli availability --employee <uuid> --start 2025-06-02T13:00 --end 2025-06-02T13:30
//!
//! # List bookable 30-minute slots of a day
//! slotwise-cli slots --employee <uuid> --date 2025-06-02 --duration 30
//!
//! # Show a client's bookings
//! slotwise-cli bookings --client <uuid>
//!
//! # Run one reminder cycle at a fixed business-local time
//! slotwise-cli reminders --now 2025-06-01T10:00
//! ```

mod commands;
mod helpers;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use slotwise::config::{DatabaseUrl, ServerConfig};
use slotwise::constants::availability::DEFAULT_SLOT_STEP_MINUTES;
use slotwise::context::AppContext;
use slotwise::models::UserRole;
use tracing::debug;
use uuid::Uuid;

use commands::{reminders, schedule, users};
use helpers::parse::{parse_local_datetime, parse_role, parse_time};

#[derive(Parser)]
#[command(
    name = "slotwise-cli",
    about = "Slotwise management CLI",
    long_about = "Command-line tool for inspecting schedules, checking availability and running reminder cycles."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Create or upgrade the database schema
    Migrate,

    /// User management commands
    User {
        #[command(subcommand)]
        action: UserCommand,
    },

    /// Work shift commands
    Shift {
        #[command(subcommand)]
        action: ShiftCommand,
    },

    /// Check whether a slot is bookable for an employee
    Availability {
        /// Employee id
        #[arg(long)]
        employee: Uuid,

        /// Slot start, business-local (`YYYY-MM-DDTHH:MM`)
        #[arg(long, value_parser = parse_local_datetime)]
        start: NaiveDateTime,

        /// Slot end, business-local (`YYYY-MM-DDTHH:MM`)
        #[arg(long, value_parser = parse_local_datetime)]
        end: NaiveDateTime,

        /// Booking to ignore (the one being edited)
        #[arg(long)]
        excluding: Option<Uuid>,
    },

    /// List every bookable slot of one day
    Slots {
        /// Employee id
        #[arg(long)]
        employee: Uuid,

        /// Day to search (`YYYY-MM-DD`)
        #[arg(long)]
        date: NaiveDate,

        /// Slot length in minutes
        #[arg(long, default_value = "30")]
        duration: i64,

        /// Minutes between candidate starts
        #[arg(long, default_value_t = DEFAULT_SLOT_STEP_MINUTES)]
        step: i64,
    },

    /// List bookings of an employee or a client
    Bookings {
        /// Employee id
        #[arg(long, conflicts_with = "client", required_unless_present = "client")]
        employee: Option<Uuid>,

        /// Client id
        #[arg(long)]
        client: Option<Uuid>,
    },

    /// Run one reminder cycle
    Reminders {
        /// Business-local time to evaluate windows at (defaults to the current time)
        #[arg(long, value_parser = parse_local_datetime)]
        now: Option<NaiveDateTime>,
    },
}

#[derive(Subcommand)]
enum UserCommand {
    /// Register a client or employee
    Create {
        /// Display name
        #[arg(long)]
        name: String,

        /// Email address
        #[arg(long)]
        email: String,

        /// `client` or `employee`
        #[arg(long, value_parser = parse_role)]
        role: UserRole,
    },

    /// List users with a role
    List {
        /// `client` or `employee`
        #[arg(long, value_parser = parse_role)]
        role: UserRole,
    },
}

#[derive(Subcommand)]
enum ShiftCommand {
    /// Add a working shift or break segment
    Add {
        /// Employee id
        #[arg(long)]
        employee: Uuid,

        /// ISO weekday, Monday = 1
        #[arg(long)]
        day: u8,

        /// Start time (`HH:MM`)
        #[arg(long, value_parser = parse_time)]
        start: NaiveTime,

        /// End time (`HH:MM`)
        #[arg(long, value_parser = parse_time)]
        end: NaiveTime,

        /// Mark the segment as a break
        #[arg(long = "break")]
        is_break: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let mut config = ServerConfig::from_env()?;
    if let Some(url) = cli.database_url.as_deref() {
        config.database.url = DatabaseUrl::parse_url(url)?;
    }
    // Only the `migrate` subcommand touches the schema
    config.database.auto_migrate = false;
    debug!("{}", config.summary());

    let context = AppContext::bootstrap(&config).await?;

    match cli.command {
        Command::Migrate => schedule::migrate(&context).await,
        Command::User { action } => match action {
            UserCommand::Create { name, email, role } => {
                users::create(&context, &name, &email, role).await
            }
            UserCommand::List { role } => users::list(&context, role).await,
        },
        Command::Shift { action } => match action {
            ShiftCommand::Add {
                employee,
                day,
                start,
                end,
                is_break,
            } => schedule::add_shift(&context, employee, day, start, end, is_break).await,
        },
        Command::Availability {
            employee,
            start,
            end,
            excluding,
        } => schedule::availability(&context, employee, start, end, excluding).await,
        Command::Slots {
            employee,
            date,
            duration,
            step,
        } => schedule::slots(&context, employee, date, duration, step).await,
        Command::Bookings { employee, client } => {
            schedule::list_bookings(&context, employee, client).await
        }
        Command::Reminders { now } => reminders::run_cycle(&context, now).await,
    }
}

// ABOUTME: Output formatting helpers for slotwise-cli
// ABOUTME: Consistent rendering of availability decisions, slots and contacts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use slotwise::availability::AvailabilityDecision;
use slotwise::models::{Booking, Contact, TimeInterval};

/// Print an availability decision
pub fn display_decision(candidate: &TimeInterval, decision: &AvailabilityDecision) {
    if decision.is_available() {
        println!("Available: {candidate}");
        return;
    }
    match decision {
        AvailabilityDecision::Conflict { booking_id } => {
            println!("Unavailable: {candidate} conflicts with booking {booking_id}");
        }
        other => println!("Unavailable: {candidate} ({other})"),
    }
}

/// Print the bookable slots of a day
pub fn display_slots(slots: &[TimeInterval]) {
    if slots.is_empty() {
        println!("No bookable slots.");
        return;
    }
    println!("{} bookable slot(s):", slots.len());
    for slot in slots {
        println!(
            "   {} - {}",
            slot.start().format("%H:%M"),
            slot.end().format("%H:%M")
        );
    }
}

/// Print a table of contacts
pub fn display_contacts(contacts: &[Contact]) {
    if contacts.is_empty() {
        println!("No users found.");
        return;
    }
    println!("{:<38} {:<10} {:<24} Email", "Id", "Role", "Name");
    println!("{}", "=".repeat(90));
    for contact in contacts {
        println!(
            "{:<38} {:<10} {:<24} {}",
            contact.user_id.to_string(),
            contact.role.as_str(),
            contact.name,
            contact.email
        );
    }
}

/// Print bookings with their status and length
pub fn display_bookings(bookings: &[Booking]) {
    if bookings.is_empty() {
        println!("No bookings found.");
        return;
    }
    for booking in bookings {
        println!(
            "{}  {}  {:>4} min  {:<10} {}",
            booking.id,
            booking.interval.start().format("%Y-%m-%d %H:%M"),
            booking.interval.duration().num_minutes(),
            booking.status.as_str(),
            booking.service_name
        );
    }
}

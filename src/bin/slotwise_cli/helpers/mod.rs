// ABOUTME: Shared helpers for slotwise-cli
// ABOUTME: Argument parsers and output formatting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

pub mod display;
pub mod parse;

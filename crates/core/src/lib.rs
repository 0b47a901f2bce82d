// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Lumber

//! Core types shared across the lumber workspace.
//!
//! This crate contains the severity [`Level`] used by the logger hierarchy
//! and the status reporting types components use to record internal
//! anomalies instead of raising them to callers.

pub mod level;
pub mod status;

pub use level::{Level, ParseLevelError};
pub use status::{Severity, StatusChecker, StatusRecord, StatusReporter};

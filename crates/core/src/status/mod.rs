// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Lumber

//! Status reporting for internal component health.
//!
//! Components append [`StatusRecord`]s to a [`StatusReporter`] instead of
//! returning errors or panicking; tests assert on the collected records
//! afterwards through a [`StatusChecker`].

mod checker;
mod record;
mod reporter;

pub use checker::StatusChecker;
pub use record::{Severity, StatusRecord};
pub use reporter::StatusReporter;

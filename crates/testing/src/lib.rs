// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Lumber

//! Concrete worker roles for exercising the logger registry under
//! contention. Consumed by other crates as a dev-dependency.

pub mod roles;

pub use roles::{DEFAULT_BURST_LENGTH, LookupBurst, Resetter};

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Lumber

//! Generic multi-threaded contention harness.
//!
//! Workloads implement [`Worker`] around a shared [`WorkerState`] counter
//! and done flag; the [`Harness`] drives any mix of them against a shared
//! subject until a counter-driven end condition holds.

pub mod harness;
pub mod worker;

pub use harness::{
	DEFAULT_POLL_INTERVAL, DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_TIMEOUT, Harness, HarnessError,
};
pub use worker::{ClosureWorker, Worker, WorkerState};

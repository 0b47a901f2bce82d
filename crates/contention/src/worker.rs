// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Lumber

//! Worker capability shared between workloads and the harness.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Progress state embedded by every harness worker.
///
/// The owning worker increments the counter, the harness reads it to
/// evaluate end conditions. The done flag flows the other way: the harness
/// sets it, the worker observes it and stops within one loop iteration.
#[derive(Debug, Default)]
pub struct WorkerState {
	counter: AtomicU64,
	done: AtomicBool,
}

impl WorkerState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record one completed unit of work. Called only by the owning worker.
	pub fn increment(&self) {
		self.counter.fetch_add(1, Ordering::Release);
	}

	pub fn counter(&self) -> u64 {
		self.counter.load(Ordering::Acquire)
	}

	pub fn is_done(&self) -> bool {
		self.done.load(Ordering::Acquire)
	}

	pub fn set_done(&self) {
		self.done.store(true, Ordering::Release);
	}
}

/// A unit of workload driven by the [`Harness`](crate::Harness).
///
/// Implementations loop until their done flag turns true, incrementing the
/// counter once per completed iteration. Workers are shared with the harness
/// as `Arc<dyn Worker>`, so workloads keep their state in atomics or locks.
pub trait Worker: Send + Sync {
	/// Progress state shared with the harness.
	fn state(&self) -> &WorkerState;

	/// Descriptive name, used for thread names and failure reports.
	fn name(&self) -> &str;

	/// Run the workload until [`WorkerState::is_done`] turns true.
	fn run(&self);

	fn counter(&self) -> u64 {
		self.state().counter()
	}

	fn is_done(&self) -> bool {
		self.state().is_done()
	}

	fn set_done(&self) {
		self.state().set_done()
	}
}

/// Worker built from a closure, mainly for tests.
pub struct ClosureWorker {
	name: String,
	state: WorkerState,
	body: Box<dyn Fn(&WorkerState) + Send + Sync>,
}

impl ClosureWorker {
	pub fn new(name: impl Into<String>, body: impl Fn(&WorkerState) + Send + Sync + 'static) -> Self {
		Self {
			name: name.into(),
			state: WorkerState::new(),
			body: Box::new(body),
		}
	}
}

impl Worker for ClosureWorker {
	fn state(&self) -> &WorkerState {
		&self.state
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn run(&self) {
		(self.body)(&self.state)
	}
}

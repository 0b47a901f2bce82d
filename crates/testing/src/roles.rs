// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Lumber

//! Worker roles that exercise the logger registry under contention.

use std::{
	sync::{Arc, Barrier},
	thread,
};

use lumber_contention::{Worker, WorkerState};
use lumber_hierarchy::LoggerContext;

/// Default number of distinct leaf loggers a [`LookupBurst`] cycles through.
pub const DEFAULT_BURST_LENGTH: u64 = 30;

/// Worker that destructively resets the registry in a tight loop.
///
/// Awaits the shared start barrier, then resets the context once per
/// iteration until told to stop, yielding between iterations so lookups get
/// scheduled in between. The counter equals the number of completed resets.
pub struct Resetter {
	context: LoggerContext,
	barrier: Arc<Barrier>,
	state: WorkerState,
}

impl Resetter {
	pub fn new(context: LoggerContext, barrier: Arc<Barrier>) -> Self {
		Self {
			context,
			barrier,
			state: WorkerState::new(),
		}
	}
}

impl Worker for Resetter {
	fn state(&self) -> &WorkerState {
		&self.state
	}

	fn name(&self) -> &str {
		"resetter"
	}

	fn run(&self) {
		self.barrier.wait();
		while !self.state.is_done() {
			self.context.reset();
			self.state.increment();
			thread::yield_now();
		}
	}
}

/// Worker that hammers lookups with a cycling burst of dotted names.
///
/// Awaits the shared start barrier, then looks up
/// `<namespace>.<suffix>.x<i>` with `i` cycling through the burst length,
/// re-materializing the same small subtree over and over as the resetter
/// keeps discarding it. Yields once per completed burst.
pub struct LookupBurst {
	context: LoggerContext,
	barrier: Arc<Barrier>,
	namespace: String,
	suffix: String,
	burst_length: u64,
	name: String,
	state: WorkerState,
}

impl LookupBurst {
	pub fn new(
		context: LoggerContext,
		barrier: Arc<Barrier>,
		namespace: impl Into<String>,
		suffix: impl Into<String>,
	) -> Self {
		let suffix = suffix.into();
		Self {
			context,
			barrier,
			namespace: namespace.into(),
			name: format!("lookup-{}", suffix),
			suffix,
			burst_length: DEFAULT_BURST_LENGTH,
			state: WorkerState::new(),
		}
	}

	pub fn with_burst_length(mut self, burst_length: u64) -> Self {
		self.burst_length = burst_length;
		self
	}
}

impl Worker for LookupBurst {
	fn state(&self) -> &WorkerState {
		&self.state
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn run(&self) {
		self.barrier.wait();
		while !self.state.is_done() {
			let index = self.state.counter() % self.burst_length;
			self.context.get_logger(&format!(
				"{}.{}.x{}",
				self.namespace, self.suffix, index
			));
			self.state.increment();
			if index == 0 {
				thread::yield_now();
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::{thread, time::Duration};

	use super::*;

	fn run_until<W, F>(worker: Arc<W>, condition: F)
	where
		W: Worker + 'static,
		F: Fn() -> bool,
	{
		let runner = {
			let worker = Arc::clone(&worker);
			thread::spawn(move || worker.run())
		};

		let mut attempts = 0;
		while !condition() && attempts < 500 {
			thread::sleep(Duration::from_millis(1));
			attempts += 1;
		}
		worker.set_done();
		runner.join().unwrap();
		assert!(condition(), "worker never reached the expected state");
	}

	#[test]
	fn test_resetter_counts_completed_resets() {
		let context = LoggerContext::new();
		let resetter = Arc::new(Resetter::new(context.clone(), Arc::new(Barrier::new(1))));

		run_until(Arc::clone(&resetter), || resetter.counter() >= 5);

		// Only full iterations count, so the two totals agree exactly
		assert_eq!(context.reset_count(), resetter.counter());
	}

	#[test]
	fn test_lookup_burst_materializes_the_burst_subtree() {
		let context = LoggerContext::new();
		let burst = Arc::new(LookupBurst::new(
			context.clone(),
			Arc::new(Barrier::new(1)),
			"org.bla",
			"mouse-1",
		));

		run_until(Arc::clone(&burst), || burst.counter() >= 2 * DEFAULT_BURST_LENGTH);

		let names = context.logger_names();
		for i in 0..DEFAULT_BURST_LENGTH {
			let leaf = format!("org.bla.mouse-1.x{}", i);
			assert!(names.contains(&leaf), "missing logger '{}'", leaf);
		}
		// The burst wraps instead of growing unbounded
		assert!(!names.contains(&format!("org.bla.mouse-1.x{}", DEFAULT_BURST_LENGTH)));
		assert!(context.check_consistency());
	}

	#[test]
	fn test_lookup_burst_custom_length() {
		let context = LoggerContext::new();
		let burst = Arc::new(
			LookupBurst::new(context.clone(), Arc::new(Barrier::new(1)), "org.bla", "rat")
				.with_burst_length(5),
		);

		run_until(Arc::clone(&burst), || burst.counter() >= 10);

		let names = context.logger_names();
		assert!(names.contains(&"org.bla.rat.x4".to_string()));
		assert!(!names.contains(&"org.bla.rat.x5".to_string()));
	}

	#[test]
	fn test_worker_names() {
		let context = LoggerContext::new();
		let barrier = Arc::new(Barrier::new(1));
		assert_eq!(Resetter::new(context.clone(), Arc::clone(&barrier)).name(), "resetter");
		assert_eq!(LookupBurst::new(context, barrier, "org.bla", "mouse-3").name(), "lookup-mouse-3");
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Lumber

//! Multi-threaded contention harness.
//!
//! Runs a set of workers on dedicated OS threads until a caller-supplied end
//! condition holds, then asks every worker to stop and joins them within a
//! bound, reporting panics and stragglers per worker.

use std::{
	io,
	sync::Arc,
	thread,
	time::{Duration, Instant},
};

use crossbeam_channel::{RecvTimeoutError, Sender, bounded};
use thiserror::Error;
use tracing::debug;

use crate::worker::Worker;

/// Default deadline for the end condition.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default end condition poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Default bound on waiting for workers to stop after the done broadcast.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Failure modes of a harness run.
///
/// [`HarnessError::Timeout`] is a liveness failure, distinct from worker
/// panics which signal correctness failures in the workload itself.
#[derive(Debug, Error)]
pub enum HarnessError {
	#[error("failed to spawn worker thread '{name}'")]
	Spawn {
		name: String,
		#[source]
		source: io::Error,
	},

	#[error("end condition not reached within {timeout:?}")]
	Timeout {
		timeout: Duration,
	},

	#[error("workers did not stop within {timeout:?}: {names:?}")]
	JoinTimeout {
		timeout: Duration,
		names: Vec<String>,
	},

	#[error("workers panicked: {names:?}")]
	WorkerPanicked {
		names: Vec<String>,
	},
}

/// Signals worker completion on drop so panicking workers still report.
struct CompletionGuard {
	index: usize,
	completion_tx: Sender<usize>,
}

impl Drop for CompletionGuard {
	fn drop(&mut self) {
		let _ = self.completion_tx.send(self.index);
	}
}

/// Driver for multi-threaded contention runs.
///
/// The harness is workload-agnostic: workers coordinate their own
/// simultaneous start (typically through a [`std::sync::Barrier`] awaited as
/// the first action of [`Worker::run`]) and the harness only drives the end
/// of the run. See [`Harness::execute`] for the protocol.
#[derive(Debug, Clone)]
pub struct Harness {
	timeout: Duration,
	poll_interval: Duration,
	shutdown_timeout: Duration,
}

impl Harness {
	pub fn new() -> Self {
		Self {
			timeout: DEFAULT_TIMEOUT,
			poll_interval: DEFAULT_POLL_INTERVAL,
			shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
		}
	}

	/// Deadline for the end condition.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	/// How often the end condition is evaluated.
	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = poll_interval;
		self
	}

	/// Bound on waiting for workers to stop after the done broadcast.
	pub fn with_shutdown_timeout(mut self, shutdown_timeout: Duration) -> Self {
		self.shutdown_timeout = shutdown_timeout;
		self
	}

	/// Run all workers to completion.
	///
	/// Spawns one named thread per worker, polls `end_condition` until it
	/// holds or the timeout expires, sets every worker's done flag and joins
	/// the threads. On success every worker has observably stopped: all done
	/// flags are set, all threads are joined and no counter moves anymore.
	///
	/// Workers that never signal completion within the shutdown bound are
	/// reported by name and their threads abandoned to process teardown; a
	/// worker blocked in a barrier wait cannot be interrupted, so a
	/// mis-sized barrier surfaces as [`HarnessError::JoinTimeout`] rather
	/// than a hang. The same abandonment applies to workers already spawned
	/// when a later spawn fails.
	pub fn execute<F>(&self, workers: &[Arc<dyn Worker>], end_condition: F) -> Result<(), HarnessError>
	where
		F: Fn() -> bool,
	{
		let (completion_tx, completion_rx) = bounded(workers.len());

		debug!(workers = workers.len(), "Harness starting workers");
		let mut handles = Vec::with_capacity(workers.len());
		for (index, worker) in workers.iter().enumerate() {
			let worker = Arc::clone(worker);
			let completion_tx = completion_tx.clone();
			let name = worker.name().to_string();
			let thread_name = name.clone();

			let spawned = thread::Builder::new().name(name.clone()).spawn(move || {
				let _completion = CompletionGuard {
					index,
					completion_tx,
				};
				debug!(worker = %thread_name, "Worker thread starting");
				worker.run();
				debug!(worker = %thread_name, "Worker thread stopped");
			});

			match spawned {
				Ok(handle) => handles.push(handle),
				Err(source) => {
					// Already spawned workers may be blocked at a start
					// barrier waiting for peers that will never arrive;
					// they are told to stop and abandoned to teardown
					for worker in workers {
						worker.set_done();
					}
					return Err(HarnessError::Spawn {
						name,
						source,
					});
				}
			}
		}
		drop(completion_tx);

		// Poll the end condition under the deadline
		let deadline = Instant::now() + self.timeout;
		let mut timed_out = false;
		while !end_condition() {
			if Instant::now() >= deadline {
				timed_out = true;
				break;
			}
			thread::sleep(self.poll_interval);
		}
		debug!(timed_out, "End condition wait finished");

		for worker in workers.iter() {
			worker.set_done();
		}

		// Bounded join: completions arrive through the channel even when a
		// workload panics, because the guard sends during unwind
		let mut finished = vec![false; workers.len()];
		let mut finished_count = 0;
		let shutdown_deadline = Instant::now() + self.shutdown_timeout;
		while finished_count < workers.len() {
			let remaining = shutdown_deadline.saturating_duration_since(Instant::now());
			match completion_rx.recv_timeout(remaining) {
				Ok(index) => {
					finished[index] = true;
					finished_count += 1;
				}
				Err(RecvTimeoutError::Timeout) => break,
				Err(RecvTimeoutError::Disconnected) => break,
			}
		}

		let mut panicked = Vec::new();
		let mut stragglers = Vec::new();
		for (index, handle) in handles.into_iter().enumerate() {
			if !finished[index] {
				// Joining a thread that never signalled could block forever
				stragglers.push(workers[index].name().to_string());
				continue;
			}
			if handle.join().is_err() {
				panicked.push(workers[index].name().to_string());
			}
		}
		debug!(
			panicked = panicked.len(),
			stragglers = stragglers.len(),
			"Worker threads joined"
		);

		if !panicked.is_empty() {
			return Err(HarnessError::WorkerPanicked {
				names: panicked,
			});
		}
		if !stragglers.is_empty() {
			return Err(HarnessError::JoinTimeout {
				timeout: self.shutdown_timeout,
				names: stragglers,
			});
		}
		if timed_out {
			return Err(HarnessError::Timeout {
				timeout: self.timeout,
			});
		}
		Ok(())
	}
}

impl Default for Harness {
	fn default() -> Self {
		Self::new()
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Lumber

//! Tests for the contention harness lifecycle.

use std::{
	sync::{Arc, Barrier},
	thread,
	time::{Duration, Instant},
};

use lumber_contention::{ClosureWorker, Harness, HarnessError, Worker};

fn spinner(name: &str) -> Arc<dyn Worker> {
	Arc::new(ClosureWorker::new(name, |state| {
		while !state.is_done() {
			state.increment();
			thread::yield_now();
		}
	}))
}

#[test]
fn test_execute_reaches_end_condition() {
	let workers: Vec<Arc<dyn Worker>> = vec![spinner("alpha"), spinner("beta"), spinner("gamma")];
	let lead = Arc::clone(&workers[0]);

	let harness = Harness::new().with_timeout(Duration::from_secs(5));
	let result = harness.execute(&workers, || lead.counter() >= 1000);
	assert!(result.is_ok(), "harness run failed: {:?}", result);

	assert!(lead.counter() >= 1000);
	for worker in &workers {
		assert!(worker.is_done(), "worker '{}' still running", worker.name());
	}

	// All threads are joined, so no counter moves anymore
	let counters: Vec<u64> = workers.iter().map(|w| w.counter()).collect();
	thread::sleep(Duration::from_millis(20));
	let counters_after: Vec<u64> = workers.iter().map(|w| w.counter()).collect();
	assert_eq!(counters, counters_after, "counters moved after the harness returned");
}

#[test]
fn test_execute_with_barrier_start() {
	let barrier = Arc::new(Barrier::new(4));
	let workers: Vec<Arc<dyn Worker>> = (0..4)
		.map(|i| {
			let barrier = Arc::clone(&barrier);
			Arc::new(ClosureWorker::new(format!("worker-{}", i), move |state| {
				barrier.wait();
				while !state.is_done() {
					state.increment();
					thread::yield_now();
				}
			})) as Arc<dyn Worker>
		})
		.collect();

	let probes: Vec<Arc<dyn Worker>> = workers.to_vec();
	let harness = Harness::new();
	let result = harness.execute(&workers, || probes.iter().all(|w| w.counter() >= 10));
	assert!(result.is_ok(), "harness run failed: {:?}", result);

	for worker in &workers {
		assert!(worker.counter() >= 10);
	}
}

#[test]
fn test_execute_times_out_when_condition_never_holds() {
	let workers: Vec<Arc<dyn Worker>> = vec![spinner("alpha"), spinner("beta")];

	let harness = Harness::new().with_timeout(Duration::from_millis(50));
	let started = Instant::now();
	let result = harness.execute(&workers, || false);

	match result {
		Err(HarnessError::Timeout {
			timeout,
		}) => assert_eq!(timeout, Duration::from_millis(50)),
		other => panic!("expected timeout, got {:?}", other),
	}

	// The run still tore down cleanly: workers stopped, counters frozen
	assert!(started.elapsed() < Duration::from_secs(5), "timeout did not bound the run");
	for worker in &workers {
		assert!(worker.is_done());
	}
	let counters: Vec<u64> = workers.iter().map(|w| w.counter()).collect();
	thread::sleep(Duration::from_millis(20));
	assert_eq!(counters, workers.iter().map(|w| w.counter()).collect::<Vec<u64>>());
}

#[test]
fn test_execute_reports_panicked_workers_by_name() {
	let healthy = spinner("healthy");
	let workers: Vec<Arc<dyn Worker>> = vec![
		Arc::clone(&healthy),
		Arc::new(ClosureWorker::new("badger", |state| {
			while !state.is_done() {
				if state.counter() >= 10 {
					panic!("badger gave up");
				}
				state.increment();
				thread::yield_now();
			}
		})),
	];

	let harness = Harness::new();
	let result = harness.execute(&workers, || healthy.counter() >= 100);

	match result {
		Err(HarnessError::WorkerPanicked {
			names,
		}) => assert_eq!(names, vec!["badger".to_string()]),
		other => panic!("expected worker panic report, got {:?}", other),
	}

	// The healthy worker was still wound down normally
	assert!(healthy.is_done());
}

#[test]
fn test_panic_wins_over_timeout_in_reporting() {
	// A worker that dies immediately can also starve the end condition; the
	// panic is the root cause and must be the reported error
	let workers: Vec<Arc<dyn Worker>> =
		vec![Arc::new(ClosureWorker::new("badger", |_state| panic!("instant death")))];

	let harness = Harness::new().with_timeout(Duration::from_millis(50));
	let result = harness.execute(&workers, || false);

	match result {
		Err(HarnessError::WorkerPanicked {
			names,
		}) => assert_eq!(names, vec!["badger".to_string()]),
		other => panic!("expected worker panic report, got {:?}", other),
	}
}

#[test]
fn test_execute_reports_stragglers_by_name() {
	// Ignores its done flag forever; the harness must not hang on it
	let workers: Vec<Arc<dyn Worker>> = vec![
		spinner("obedient"),
		Arc::new(ClosureWorker::new("stubborn", |_state| {
			loop {
				thread::sleep(Duration::from_millis(50));
			}
		})),
	];

	let harness = Harness::new().with_shutdown_timeout(Duration::from_millis(100));
	let started = Instant::now();
	let result = harness.execute(&workers, || true);

	match result {
		Err(HarnessError::JoinTimeout {
			names,
			..
		}) => assert_eq!(names, vec!["stubborn".to_string()]),
		other => panic!("expected join timeout, got {:?}", other),
	}
	assert!(started.elapsed() < Duration::from_secs(5), "join was not bounded");
}

#[test]
fn test_execute_with_no_workers_is_immediate() {
	let harness = Harness::new();
	let result = harness.execute(&[], || true);
	assert!(result.is_ok());
}

#[test]
fn test_poll_interval_is_configurable() {
	let workers: Vec<Arc<dyn Worker>> = vec![spinner("alpha")];
	let lead = Arc::clone(&workers[0]);

	let harness = Harness::new().with_poll_interval(Duration::from_millis(5));
	let result = harness.execute(&workers, || lead.counter() >= 1);
	assert!(result.is_ok(), "harness run failed: {:?}", result);
}

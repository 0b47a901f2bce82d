// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Lumber

//! The logger registry.
//!
//! A [`LoggerContext`] owns one *generation* of the hierarchy: the root node
//! plus a full-name cache, replaced wholesale by [`LoggerContext::reset`].
//! The generation lives behind a single lock, which is what makes a reset
//! atomic with respect to any concurrent lookup.

use std::{
	collections::{HashMap, HashSet},
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
};

use lumber_core::{Level, StatusReporter};
use parking_lot::RwLock;

use crate::logger::{Logger, NAME_SEPARATOR, ROOT_LOGGER_NAME};

/// Name of a context constructed with [`LoggerContext::new`].
pub const DEFAULT_CONTEXT_NAME: &str = "default";

/// Listener notified after the context swapped in a fresh generation.
///
/// Listeners run outside the generation lock and may call back into the
/// registry.
pub trait ResetListener: Send + Sync {
	fn on_reset(&self, generation: u64);
}

/// One complete tree plus name cache, replaced as a unit by reset.
struct Generation {
	root: Logger,
	/// Cache of every non-root logger, keyed by full name
	by_name: HashMap<String, Logger>,
}

impl Generation {
	fn new(status: &Arc<StatusReporter>) -> Self {
		Self {
			root: Logger::new_root(Level::DEFAULT, Arc::clone(status)),
			by_name: HashMap::new(),
		}
	}
}

struct ContextInner {
	name: String,
	generation: RwLock<Generation>,
	reset_count: AtomicU64,
	status: Arc<StatusReporter>,
	reset_listeners: RwLock<Vec<Arc<dyn ResetListener>>>,
}

/// Thread-safe registry of hierarchically named loggers.
///
/// Lookups get-or-create the named node and every missing ancestor in one
/// atomic step. [`LoggerContext::reset`] discards the entire hierarchy and
/// installs a fresh one; loggers handed out before the reset stay usable but
/// detached. Cloning is cheap; all clones address the same registry.
///
/// The registry never returns errors and never panics. Invariant violations
/// are appended to the context's [`StatusReporter`] instead and asserted
/// after the fact.
#[derive(Clone)]
pub struct LoggerContext {
	inner: Arc<ContextInner>,
}

impl LoggerContext {
	pub fn new() -> Self {
		Self::with_name(DEFAULT_CONTEXT_NAME)
	}

	pub fn with_name(name: impl Into<String>) -> Self {
		let status = Arc::new(StatusReporter::new());
		Self {
			inner: Arc::new(ContextInner {
				name: name.into(),
				generation: RwLock::new(Generation::new(&status)),
				reset_count: AtomicU64::new(0),
				status,
				reset_listeners: RwLock::new(Vec::new()),
			}),
		}
	}

	pub fn name(&self) -> &str {
		&self.inner.name
	}

	/// Root logger of the current generation.
	pub fn root(&self) -> Logger {
		self.inner.generation.read().root.clone()
	}

	/// Status reporter collecting this context's internal anomalies.
	pub fn status(&self) -> &StatusReporter {
		&self.inner.status
	}

	/// Number of completed resets.
	pub fn reset_count(&self) -> u64 {
		self.inner.reset_count.load(Ordering::Acquire)
	}

	/// Get or create the logger with the given dotted name.
	///
	/// The empty name and `"root"` (case-insensitive) return the root
	/// logger. Any other name is split on `'.'` and walked from the root,
	/// creating and caching every missing ancestor along the way; segments
	/// are never validated, so empty segments name ordinary nodes. The
	/// returned logger and any ancestors it created belong wholly to one
	/// generation, even when lookups race a concurrent reset.
	pub fn get_logger(&self, name: &str) -> Logger {
		// Fast path: the name is already materialized (read lock)
		{
			let generation = self.inner.generation.read();
			if name.is_empty() || name.eq_ignore_ascii_case(ROOT_LOGGER_NAME) {
				return generation.root.clone();
			}
			if let Some(logger) = generation.by_name.get(name) {
				return logger.clone();
			}
		}

		// Slow path: materialize missing ancestors (write lock)
		let mut generation = self.inner.generation.write();

		// Double-check after acquiring the write lock
		if let Some(logger) = generation.by_name.get(name) {
			return logger.clone();
		}

		let mut logger = generation.root.clone();
		let mut walked = String::with_capacity(name.len());
		for (index, segment) in name.split(NAME_SEPARATOR).enumerate() {
			if index > 0 {
				walked.push(NAME_SEPARATOR);
			}
			walked.push_str(segment);

			logger = match generation.by_name.get(walked.as_str()) {
				Some(existing) => existing.clone(),
				None => {
					let child = logger.create_child(segment);
					generation.by_name.insert(walked.clone(), child.clone());
					child
				}
			};
		}
		logger
	}

	/// Discard the entire hierarchy and install a fresh generation.
	///
	/// Atomic with respect to any single lookup: a concurrent
	/// [`LoggerContext::get_logger`] observes either the old or the new
	/// generation, never a mixture. Reset listeners fire after the swap,
	/// outside the generation lock.
	pub fn reset(&self) {
		let previous = {
			let mut generation = self.inner.generation.write();
			std::mem::replace(&mut *generation, Generation::new(&self.inner.status))
		};
		// Tear the old tree down outside the lock
		drop(previous);

		let count = self.inner.reset_count.fetch_add(1, Ordering::AcqRel) + 1;

		let listeners: Vec<Arc<dyn ResetListener>> =
			self.inner.reset_listeners.read().iter().cloned().collect();
		for listener in &listeners {
			listener.on_reset(count);
		}
	}

	pub fn add_reset_listener(&self, listener: Arc<dyn ResetListener>) {
		self.inner.reset_listeners.write().push(listener);
	}

	/// Number of loggers in the current generation, the root included.
	pub fn logger_count(&self) -> usize {
		self.inner.generation.read().by_name.len() + 1
	}

	/// Sorted names of all loggers in the current generation.
	pub fn logger_names(&self) -> Vec<String> {
		let generation = self.inner.generation.read();
		let mut names: Vec<String> = generation.by_name.keys().cloned().collect();
		names.push(ROOT_LOGGER_NAME.to_string());
		names.sort();
		names
	}

	/// Verify that the tree and the name cache agree.
	///
	/// Checks that every cached name matches its node, that every node
	/// reachable from the root is cached, that every cache entry is
	/// reachable and that child names extend their parent's. Appends an
	/// error status record per discrepancy and returns whether the registry
	/// is consistent. Meant for quiescent verification after a run, not for
	/// use while a reset may be in flight.
	pub fn check_consistency(&self) -> bool {
		let generation = self.inner.generation.read();
		let mut consistent = true;
		let mut report = |message: String| {
			consistent = false;
			self.inner.status.error(self.inner.name.as_str(), message);
		};

		// Walk the tree, verifying names and cache membership per node
		let mut reachable_names = HashSet::new();
		let mut pending = vec![generation.root.clone()];
		while let Some(logger) = pending.pop() {
			for (segment, child) in logger.children_with_segments() {
				let expected = if logger.is_root() {
					segment.clone()
				} else {
					format!("{}{}{}", logger.name(), NAME_SEPARATOR, segment)
				};
				if child.name() != expected {
					report(format!(
						"logger '{}' under segment '{}' should be named '{}'",
						child.name(),
						segment,
						expected
					));
				}

				match generation.by_name.get(child.name()) {
					Some(cached) if cached.same_node(&child) => {}
					Some(_) => report(format!(
						"logger '{}' is cached under a different node",
						child.name()
					)),
					None => report(format!(
						"logger '{}' is reachable but not cached",
						child.name()
					)),
				}

				reachable_names.insert(child.name().to_string());
				pending.push(child);
			}
		}

		// Every cache entry must name a reachable node
		for (name, logger) in &generation.by_name {
			if name != logger.name() {
				report(format!(
					"cache key '{}' does not match logger name '{}'",
					name,
					logger.name()
				));
			}
			if !reachable_names.contains(name.as_str()) {
				report(format!("logger '{}' is cached but not reachable", name));
			}
		}

		consistent
	}
}

impl Default for LoggerContext {
	fn default() -> Self {
		Self::new()
	}
}

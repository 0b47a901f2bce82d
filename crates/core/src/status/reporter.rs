// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Lumber

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::Sender;
use parking_lot::RwLock;

use super::record::{Severity, StatusRecord};

/// Append-only collector of status records.
///
/// Safe for concurrent appends from any number of threads. Per-severity
/// counters make [`StatusReporter::is_error_free`] lock-free, so it can be
/// polled while producers are still running.
pub struct StatusReporter {
	records: RwLock<Vec<StatusRecord>>,
	info_count: AtomicUsize,
	warn_count: AtomicUsize,
	error_count: AtomicUsize,
	subscribers: RwLock<Vec<Sender<StatusRecord>>>,
}

impl StatusReporter {
	pub fn new() -> Self {
		Self {
			records: RwLock::new(Vec::new()),
			info_count: AtomicUsize::new(0),
			warn_count: AtomicUsize::new(0),
			error_count: AtomicUsize::new(0),
			subscribers: RwLock::new(Vec::new()),
		}
	}

	/// Append a record and forward it to every live subscriber.
	pub fn append(&self, record: StatusRecord) {
		match record.severity {
			Severity::Info => &self.info_count,
			Severity::Warn => &self.warn_count,
			Severity::Error => &self.error_count,
		}
		.fetch_add(1, Ordering::Release);

		self.records.write().push(record.clone());

		// Disconnected subscribers drop out on their next delivery
		self.subscribers.write().retain(|subscriber| subscriber.send(record.clone()).is_ok());
	}

	pub fn record(&self, severity: Severity, message: impl Into<String>) {
		self.append(StatusRecord::new(severity, message));
	}

	pub fn info(&self, origin: impl Into<String>, message: impl Into<String>) {
		self.append(StatusRecord::new(Severity::Info, message).with_origin(origin));
	}

	pub fn warn(&self, origin: impl Into<String>, message: impl Into<String>) {
		self.append(StatusRecord::new(Severity::Warn, message).with_origin(origin));
	}

	pub fn error(&self, origin: impl Into<String>, message: impl Into<String>) {
		self.append(StatusRecord::new(Severity::Error, message).with_origin(origin));
	}

	/// Whether no error record has been appended so far.
	pub fn is_error_free(&self) -> bool {
		self.error_count.load(Ordering::Acquire) == 0
	}

	pub fn count(&self, severity: Severity) -> usize {
		match severity {
			Severity::Info => &self.info_count,
			Severity::Warn => &self.warn_count,
			Severity::Error => &self.error_count,
		}
		.load(Ordering::Acquire)
	}

	pub fn len(&self) -> usize {
		self.records.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.read().is_empty()
	}

	/// Snapshot of all records appended so far.
	pub fn records(&self) -> Vec<StatusRecord> {
		self.records.read().clone()
	}

	/// Forward every subsequently appended record into the given channel.
	pub fn subscribe(&self, subscriber: Sender<StatusRecord>) {
		self.subscribers.write().push(subscriber);
	}
}

impl Default for StatusReporter {
	fn default() -> Self {
		Self::new()
	}
}

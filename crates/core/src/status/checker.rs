// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Lumber

use super::{record::Severity, reporter::StatusReporter};

/// Assertion helper over a [`StatusReporter`].
///
/// Used by tests to verify that a component stayed healthy after a run.
pub struct StatusChecker<'a> {
	reporter: &'a StatusReporter,
}

impl<'a> StatusChecker<'a> {
	pub fn new(reporter: &'a StatusReporter) -> Self {
		Self {
			reporter,
		}
	}

	pub fn is_error_free(&self) -> bool {
		self.reporter.is_error_free()
	}

	pub fn error_count(&self) -> usize {
		self.reporter.count(Severity::Error)
	}

	/// Panic with every collected error message if any error was reported.
	pub fn assert_error_free(&self) {
		if self.reporter.is_error_free() {
			return;
		}

		let errors: Vec<String> = self
			.reporter
			.records()
			.iter()
			.filter(|record| record.severity == Severity::Error)
			.map(|record| record.to_string())
			.collect();
		panic!("status reporter contains {} error(s): {}", errors.len(), errors.join("; "));
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Lumber

use std::{collections::HashMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a status record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
	Info = 0,
	Warn = 1,
	Error = 2,
}

impl Severity {
	pub fn as_str(&self) -> &'static str {
		match self {
			Severity::Info => "INFO",
			Severity::Warn => "WARN",
			Severity::Error => "ERROR",
		}
	}
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// A single diagnostic entry describing the internal health of a component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
	/// Timestamp when the record was created
	pub timestamp: DateTime<Utc>,
	/// Record severity
	pub severity: Severity,
	/// Component that emitted the record
	pub origin: Option<String>,
	/// Human-readable description
	pub message: String,
	/// Structured fields (key-value pairs)
	pub fields: HashMap<String, serde_json::Value>,
}

impl StatusRecord {
	pub fn new(severity: Severity, message: impl Into<String>) -> Self {
		Self {
			timestamp: Utc::now(),
			severity,
			origin: None,
			message: message.into(),
			fields: HashMap::new(),
		}
	}

	pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
		self.origin = Some(origin.into());
		self
	}

	pub fn with_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
		if let Ok(json_value) = serde_json::to_value(value) {
			self.fields.insert(key.into(), json_value);
		}
		self
	}
}

impl fmt::Display for StatusRecord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.origin {
			Some(origin) => write!(f, "{} [{}] {}", self.severity, origin, self.message),
			None => write!(f, "{} {}", self.severity, self.message),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_severities_are_ordered() {
		assert!(Severity::Info < Severity::Warn);
		assert!(Severity::Warn < Severity::Error);
	}

	#[test]
	fn test_record_builder() {
		let record = StatusRecord::new(Severity::Error, "cache out of sync")
			.with_origin("default")
			.with_field("logger", "app.db");

		assert_eq!(record.severity, Severity::Error);
		assert_eq!(record.origin.as_deref(), Some("default"));
		assert_eq!(record.message, "cache out of sync");
		assert_eq!(record.fields.get("logger"), Some(&serde_json::json!("app.db")));
	}

	#[test]
	fn test_record_display_includes_origin() {
		let record = StatusRecord::new(Severity::Warn, "something odd").with_origin("ctx");
		assert_eq!(record.to_string(), "WARN [ctx] something odd");

		let record = StatusRecord::new(Severity::Info, "plain");
		assert_eq!(record.to_string(), "INFO plain");
	}

	#[test]
	fn test_record_serializes() {
		let record = StatusRecord::new(Severity::Info, "hello").with_origin("ctx");
		let json = serde_json::to_string(&record).unwrap();
		assert!(json.contains("\"severity\":\"Info\""));
		assert!(json.contains("\"message\":\"hello\""));
	}
}

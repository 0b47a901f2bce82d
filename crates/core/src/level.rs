// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Lumber

//! Logger severity levels.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logger severity levels, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
	Trace = 0,
	Debug = 1,
	Info = 2,
	Warn = 3,
	Error = 4,
}

impl Level {
	/// Level assigned to a freshly created root logger.
	pub const DEFAULT: Level = Level::Debug;

	pub fn as_str(&self) -> &'static str {
		match self {
			Level::Trace => "TRACE",
			Level::Debug => "DEBUG",
			Level::Info => "INFO",
			Level::Warn => "WARN",
			Level::Error => "ERROR",
		}
	}
}

impl fmt::Display for Level {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// Error returned when a level name does not match any known level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown level '{0}'")]
pub struct ParseLevelError(String);

impl FromStr for Level {
	type Err = ParseLevelError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_uppercase().as_str() {
			"TRACE" => Ok(Level::Trace),
			"DEBUG" => Ok(Level::Debug),
			"INFO" => Ok(Level::Info),
			"WARN" => Ok(Level::Warn),
			"ERROR" => Ok(Level::Error),
			_ => Err(ParseLevelError(s.to_string())),
		}
	}
}

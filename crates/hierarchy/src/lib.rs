// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Lumber

//! Hierarchical logger registry.
//!
//! Loggers form a tree addressed by dotted names. The [`LoggerContext`]
//! materializes them lazily on first lookup and supports a destructive
//! [`LoggerContext::reset`] that atomically replaces the whole hierarchy
//! while lookups keep running on other threads.

pub mod context;
pub mod logger;

pub use context::{DEFAULT_CONTEXT_NAME, LoggerContext, ResetListener};
pub use logger::{Logger, NAME_SEPARATOR, ROOT_LOGGER_NAME};

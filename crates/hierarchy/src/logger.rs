// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Lumber

//! Logger nodes of the hierarchy.

use std::{
	collections::HashMap,
	fmt,
	sync::{Arc, Weak},
};

use lumber_core::{Level, StatusReporter};
use parking_lot::RwLock;

/// Separator between name segments in a logger's full name.
pub const NAME_SEPARATOR: char = '.';

/// Name of the root logger.
pub const ROOT_LOGGER_NAME: &str = "root";

/// Explicit and cached effective level of a node.
///
/// Kept behind a single lock so the two can never be observed out of step.
struct LevelState {
	/// Explicitly assigned level, `None` when inherited
	explicit: Option<Level>,
	/// Cached effective level, always valid
	effective: Level,
}

struct LoggerNode {
	/// Full dotted name, immutable once created
	name: String,
	/// Non-owning back reference, `None` for the root
	parent: Option<Weak<LoggerNode>>,
	level: RwLock<LevelState>,
	/// Owning links, keyed by immediate name segment
	children: RwLock<HashMap<String, Logger>>,
	/// Status reporter of the owning context
	status: Arc<StatusReporter>,
}

/// Handle to a node in the logger hierarchy.
///
/// Cloning is cheap; all clones address the same node. A node detached by a
/// registry reset stays internally consistent: its name, levels and subtree
/// keep working, only [`Logger::parent`] may start returning `None` once the
/// old generation is dropped.
///
/// Lock order within the tree is strictly descending: a node's level lock
/// before its children lock, a parent's locks before any child's.
#[derive(Clone)]
pub struct Logger {
	node: Arc<LoggerNode>,
}

impl Logger {
	pub(crate) fn new_root(level: Level, status: Arc<StatusReporter>) -> Self {
		Self {
			node: Arc::new(LoggerNode {
				name: ROOT_LOGGER_NAME.to_string(),
				parent: None,
				level: RwLock::new(LevelState {
					explicit: Some(level),
					effective: level,
				}),
				children: RwLock::new(HashMap::new()),
				status,
			}),
		}
	}

	/// Create the child for `segment` and link it under this node.
	///
	/// Callers must hold the registry's generation write lock, which is what
	/// keeps structural mutation single-writer. The level read guard is held
	/// across the insert so the child inherits exactly the effective level a
	/// concurrent propagation would hand it.
	pub(crate) fn create_child(&self, segment: &str) -> Logger {
		let level = self.node.level.read();
		let child = Logger {
			node: Arc::new(LoggerNode {
				name: self.child_name(segment),
				parent: Some(Arc::downgrade(&self.node)),
				level: RwLock::new(LevelState {
					explicit: None,
					effective: level.effective,
				}),
				children: RwLock::new(HashMap::new()),
				status: Arc::clone(&self.node.status),
			}),
		};
		self.node.children.write().insert(segment.to_string(), child.clone());
		drop(level);
		child
	}

	/// Full name of the child for `segment`.
	///
	/// The root contributes no segment of its own: children of the root are
	/// named by their segment alone.
	fn child_name(&self, segment: &str) -> String {
		if self.is_root() {
			segment.to_string()
		} else {
			format!("{}{}{}", self.node.name, NAME_SEPARATOR, segment)
		}
	}

	pub fn name(&self) -> &str {
		&self.node.name
	}

	pub fn is_root(&self) -> bool {
		self.node.parent.is_none()
	}

	/// Explicitly assigned level, `None` when inherited.
	pub fn level(&self) -> Option<Level> {
		self.node.level.read().explicit
	}

	/// Effective level, inherited from the nearest ancestor with an explicit
	/// level when none is assigned here.
	pub fn effective_level(&self) -> Level {
		self.node.level.read().effective
	}

	pub fn is_enabled_for(&self, level: Level) -> bool {
		level >= self.node.level.read().effective
	}

	/// Parent node, `None` for the root and for detached nodes whose old
	/// generation has been dropped.
	pub fn parent(&self) -> Option<Logger> {
		self.node.parent.as_ref()?.upgrade().map(|node| Logger {
			node,
		})
	}

	/// Whether two handles address the same node.
	pub fn same_node(&self, other: &Logger) -> bool {
		Arc::ptr_eq(&self.node, &other.node)
	}

	/// Immediate children, in no particular order.
	pub fn children(&self) -> Vec<Logger> {
		self.node.children.read().values().cloned().collect()
	}

	pub(crate) fn children_with_segments(&self) -> Vec<(String, Logger)> {
		self.node.children.read().iter().map(|(segment, child)| (segment.clone(), child.clone())).collect()
	}

	/// Assign or clear the explicit level.
	///
	/// Clearing re-inherits from the parent; the new effective level is
	/// propagated to every descendant without an explicit level of its own.
	/// Clearing the level of the root is an invariant violation: it appends
	/// an error status record and changes nothing.
	pub fn set_level(&self, level: Option<Level>) {
		// The inherited level is sampled before taking our own lock to keep
		// the parent-before-child lock order
		let effective = match level {
			Some(level) => level,
			None => match &self.node.parent {
				None => {
					self.node.status.error(
						ROOT_LOGGER_NAME,
						"level of the root logger cannot be cleared",
					);
					return;
				}
				Some(weak) => match weak.upgrade() {
					Some(parent) => parent.level.read().effective,
					// Detached from a dropped generation; keep the
					// current effective level
					None => self.node.level.read().effective,
				},
			},
		};

		let mut state = self.node.level.write();
		state.explicit = level;
		state.effective = effective;

		// The level write guard stays held across the walk so concurrent
		// child creations observe either the old or the new level, never a
		// torn update
		let children: Vec<Logger> = self.node.children.read().values().cloned().collect();
		for child in &children {
			child.apply_inherited(effective);
		}
	}

	/// Push an inherited effective level down the subtree, stopping at nodes
	/// with an explicit level of their own.
	fn apply_inherited(&self, level: Level) {
		let mut state = self.node.level.write();
		if state.explicit.is_some() {
			return;
		}
		state.effective = level;

		let children: Vec<Logger> = self.node.children.read().values().cloned().collect();
		for child in &children {
			child.apply_inherited(level);
		}
	}
}

impl fmt::Debug for Logger {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.node.level.read();
		f.debug_struct("Logger")
			.field("name", &self.node.name)
			.field("level", &state.explicit)
			.field("effective", &state.effective)
			.finish()
	}
}

//! Invalidation tracking across incremental rebuilds.
//!
//! The registry is append-only for a session, so keeping an assembled
//! stylesheet current only requires re-running assembly whenever a module
//! that contributes rules changes. The tracker remembers which modules
//! contribute rules and which stylesheets consume them, and asks the host to
//! mark those stylesheets stale.

use indexmap::IndexSet;
use parking_lot::RwLock;

use crate::hooks::ModuleHost;

/// Tracked source and stylesheet modules of one session.
#[derive(Debug, Default)]
pub struct InvalidationTracker {
	/// Source modules with at least one tagged literal.
	sources: RwLock<IndexSet<String>>,
	/// Stylesheet modules containing the directive.
	stylesheets: RwLock<IndexSet<String>>,
	/// Stylesheets whose output was produced and not yet invalidated.
	assembled: RwLock<IndexSet<String>>,
}

impl InvalidationTracker {
	/// Creates an empty tracker.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records a source module. Returns `true` the first time.
	pub fn track_source(&self, id: &str) -> bool {
		if self.sources.read().contains(id) {
			return false;
		}
		self.sources.write().insert(id.to_string())
	}

	/// Records a stylesheet module. Returns `true` the first time.
	pub fn track_stylesheet(&self, id: &str) -> bool {
		if self.stylesheets.read().contains(id) {
			return false;
		}
		let inserted = self.stylesheets.write().insert(id.to_string());
		if inserted {
			tracing::info!(module = %id, "registered stylesheet for rule injection");
		}
		inserted
	}

	/// Records that a stylesheet's output reflects the current registry.
	pub fn mark_assembled(&self, id: &str) {
		self.assembled.write().insert(id.to_string());
	}

	/// Whether `id` is a tracked source module.
	pub fn is_tracked_source(&self, id: &str) -> bool {
		self.sources.read().contains(id)
	}

	/// Whether `id` is a tracked stylesheet module.
	pub fn is_tracked_stylesheet(&self, id: &str) -> bool {
		self.stylesheets.read().contains(id)
	}

	/// Tracked source modules in first-seen order.
	pub fn tracked_sources(&self) -> Vec<String> {
		self.sources.read().iter().cloned().collect()
	}

	/// Tracked stylesheet modules in first-seen order.
	pub fn tracked_stylesheets(&self) -> Vec<String> {
		self.stylesheets.read().iter().cloned().collect()
	}

	/// Handles a change notification from the host.
	///
	/// If any of `changed` is a tracked source module, every tracked
	/// stylesheet is marked stale exactly once. Returns the number of
	/// stylesheets invalidated.
	pub fn on_source_changed(&self, host: &dyn ModuleHost, changed: &[String]) -> usize {
		let Some(trigger) = changed.iter().find(|id| self.is_tracked_source(id)) else {
			return 0;
		};

		let targets = self.tracked_stylesheets();
		for stylesheet in &targets {
			host.invalidate_module(stylesheet);
		}
		self.assembled.write().clear();

		tracing::debug!(
			module = %trigger,
			stylesheets = targets.len(),
			"source change invalidated stylesheets"
		);
		targets.len()
	}

	/// Marks every already-assembled stylesheet stale.
	///
	/// Used when new rules appear after a stylesheet was produced, so the
	/// first build pass converges without waiting for a change event.
	pub fn invalidate_assembled(&self, host: &dyn ModuleHost) -> usize {
		let targets: Vec<String> = self.assembled.write().drain(..).collect();
		for stylesheet in &targets {
			host.invalidate_module(stylesheet);
		}
		if !targets.is_empty() {
			tracing::debug!(
				stylesheets = targets.len(),
				"new rules invalidated assembled stylesheets"
			);
		}
		targets.len()
	}
}

//! Session context.
//!
//! One [`ExtractContext`] lives for one host build or dev session and is
//! passed to every hook. It owns the style registry, the invalidation tracker
//! and the configuration; a new session starts from a new context.

use std::sync::Arc;

use crate::config::ExtractConfig;
use crate::invalidation::InvalidationTracker;
use crate::registry::StyleRegistry;

/// Shared state of one extraction session.
///
/// # Thread Safety
///
/// Cloning is cheap and clones share state, so the context can be handed to
/// hooks running concurrently on different modules.
#[derive(Debug, Clone)]
pub struct ExtractContext {
	config: Arc<ExtractConfig>,
	registry: Arc<StyleRegistry>,
	tracker: Arc<InvalidationTracker>,
}

impl ExtractContext {
	/// Starts a session with the given configuration.
	pub fn new(config: ExtractConfig) -> Self {
		let registry = StyleRegistry::new(config.class_prefix.clone());
		tracing::debug!(
			tag = %config.tag,
			directive = %config.directive,
			"started extraction session"
		);
		Self {
			config: Arc::new(config),
			registry: Arc::new(registry),
			tracker: Arc::new(InvalidationTracker::new()),
		}
	}

	/// Returns the session configuration.
	pub fn config(&self) -> &ExtractConfig {
		&self.config
	}

	/// Returns the style registry.
	pub fn registry(&self) -> &StyleRegistry {
		&self.registry
	}

	/// Returns the invalidation tracker.
	pub fn tracker(&self) -> &InvalidationTracker {
		&self.tracker
	}
}

impl Default for ExtractContext {
	fn default() -> Self {
		Self::new(ExtractConfig::default())
	}
}

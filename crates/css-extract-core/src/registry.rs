//! Style registry.
//!
//! Maps generated class names to their wrapped rules in first-seen order, so
//! the assembled stylesheet is deterministic for a given module processing
//! order.

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::hash;

/// A registered rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEntry {
	/// Generated class name.
	pub identifier: String,
	/// Scoped rule text, e.g. `.css-2p {\na\n}`.
	pub rule_text: String,
	/// Whitespace-normalized body the identifier was derived from.
	pub normalized: String,
}

/// Outcome of [`StyleRegistry::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
	/// Generated class name.
	pub identifier: String,
	/// Whether this call inserted a new entry.
	pub inserted: bool,
}

/// Insertion-ordered, deduplicated rule store.
///
/// # Thread Safety
///
/// Lookup and insertion happen under one write lock, so concurrent
/// registrations of the same body never produce duplicate entries.
#[derive(Debug)]
pub struct StyleRegistry {
	prefix: String,
	entries: RwLock<IndexMap<String, RuleEntry>>,
}

impl StyleRegistry {
	/// Creates an empty registry generating names with `prefix`.
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			entries: RwLock::new(IndexMap::new()),
		}
	}

	/// Registers a rule body and returns its class name.
	///
	/// Registering a body whose normalized form is already present is a no-op.
	///
	/// # Examples
	///
	/// ```rust
	/// use css_extract_core::registry::StyleRegistry;
	///
	/// let registry = StyleRegistry::new("css-");
	/// let first = registry.register("color: red;");
	/// let second = registry.register("color:   red;");
	///
	/// assert_eq!(first.identifier, second.identifier);
	/// assert!(first.inserted);
	/// assert!(!second.inserted);
	/// assert_eq!(registry.len(), 1);
	/// ```
	pub fn register(&self, body: &str) -> Registration {
		let normalized = hash::normalize(body);
		let identifier = hash::class_name(&self.prefix, &normalized);

		let mut entries = self.entries.write();
		if let Some(existing) = entries.get(&identifier) {
			if existing.normalized != normalized {
				tracing::warn!(
					identifier = %identifier,
					"hash collision between distinct rule bodies; keeping the first"
				);
			}
			return Registration {
				identifier,
				inserted: false,
			};
		}

		let rule_text = format!(".{} {{\n{}\n}}", identifier, body);
		tracing::debug!(identifier = %identifier, "registered rule");
		entries.insert(
			identifier.clone(),
			RuleEntry {
				identifier: identifier.clone(),
				rule_text,
				normalized,
			},
		);
		Registration {
			identifier,
			inserted: true,
		}
	}

	/// Returns every wrapped rule in insertion order.
	pub fn snapshot_all(&self) -> Vec<String> {
		self.entries
			.read()
			.values()
			.map(|entry| entry.rule_text.clone())
			.collect()
	}

	/// Gets an entry by class name.
	pub fn get(&self, identifier: &str) -> Option<RuleEntry> {
		self.entries.read().get(identifier).cloned()
	}

	/// Checks whether a class name is registered.
	pub fn contains(&self, identifier: &str) -> bool {
		self.entries.read().contains_key(identifier)
	}

	/// Number of registered rules.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Whether no rule has been registered yet.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

impl Default for StyleRegistry {
	fn default() -> Self {
		Self::new(crate::config::DEFAULT_CLASS_PREFIX)
	}
}

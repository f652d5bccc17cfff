//! Source module rewriting.
//!
//! Replaces every tagged literal with a quoted class name and records the
//! literal's body in the session registry.

use crate::context::ExtractContext;
use crate::hooks::TransformOutcome;
use crate::registry::StyleRegistry;
use crate::scanner::{ScanReport, ScanState, Scanner};

/// Rules collected from one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
	/// Class names of the literals, left to right (duplicates kept).
	pub identifiers: Vec<String>,
	/// Number of entries that were new to the registry.
	pub inserted: usize,
	/// Terminal scan state.
	pub state: ScanState,
}

/// Result of rewriting one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
	/// Rewritten text, or [`TransformOutcome::Unchanged`] without literals.
	pub outcome: TransformOutcome,
	/// Rules collected while rewriting.
	pub collection: Collection,
}

/// Registers every literal in `source` without rewriting it.
pub fn collect_literals(registry: &StyleRegistry, tag: &str, source: &str) -> Collection {
	collect_with(registry, &Scanner::new(tag), source)
}

/// Like [`collect_literals`], with an explicit scanner.
pub fn collect_with(registry: &StyleRegistry, scanner: &Scanner<'_>, source: &str) -> Collection {
	let report = scanner.scan(source);
	register_all(registry, source, &report)
}

/// Registers every literal in `source` and replaces each with `"<class name>"`.
///
/// # Examples
///
/// ```rust
/// use css_extract_core::registry::StyleRegistry;
/// use css_extract_core::rewrite::rewrite_literals;
///
/// let registry = StyleRegistry::new("css-");
/// let rewrite = rewrite_literals(&registry, "css", "const a = css`a`;");
///
/// assert_eq!(rewrite.outcome.replaced(), Some("const a = \"css-2p\";"));
/// ```
pub fn rewrite_literals(registry: &StyleRegistry, tag: &str, source: &str) -> Rewrite {
	rewrite_with(registry, &Scanner::new(tag), source)
}

/// Like [`rewrite_literals`], with an explicit scanner.
pub fn rewrite_with(registry: &StyleRegistry, scanner: &Scanner<'_>, source: &str) -> Rewrite {
	let report = scanner.scan(source);
	let collection = register_all(registry, source, &report);
	if report.literals.is_empty() {
		return Rewrite {
			outcome: TransformOutcome::Unchanged,
			collection,
		};
	}

	let mut out = String::with_capacity(source.len());
	let mut cursor = 0;
	for (span, identifier) in report.literals.iter().zip(&collection.identifiers) {
		out.push_str(&source[cursor..span.range.start]);
		out.push('"');
		out.push_str(identifier);
		out.push('"');
		cursor = span.range.end;
	}
	out.push_str(&source[cursor..]);

	Rewrite {
		outcome: TransformOutcome::Replaced(out),
		collection,
	}
}

/// Rewrites a source module within a session, tracking it when it contributes rules.
pub fn transform_source(ctx: &ExtractContext, module_id: &str, source: &str) -> Rewrite {
	let scanner = Scanner::for_module(&ctx.config().tag, module_id);
	let rewrite = rewrite_with(ctx.registry(), &scanner, source);
	record(ctx, module_id, &rewrite.collection);
	rewrite
}

/// Collects a source module's rules ahead of transform.
pub fn collect_source(ctx: &ExtractContext, module_id: &str, source: &str) -> Collection {
	let scanner = Scanner::for_module(&ctx.config().tag, module_id);
	let collection = collect_with(ctx.registry(), &scanner, source);
	record(ctx, module_id, &collection);
	collection
}

fn register_all(registry: &StyleRegistry, source: &str, report: &ScanReport) -> Collection {
	let mut inserted = 0;
	let identifiers = report
		.literals
		.iter()
		.map(|span| {
			let registration = registry.register(span.body(source));
			inserted += usize::from(registration.inserted);
			registration.identifier
		})
		.collect();

	Collection {
		identifiers,
		inserted,
		state: report.state,
	}
}

fn record(ctx: &ExtractContext, module_id: &str, collection: &Collection) {
	if let ScanState::Unterminated { offset } = collection.state {
		tracing::debug!(
			module = %module_id,
			offset,
			"unterminated literal; rest of module left unprocessed"
		);
	}
	if collection.identifiers.is_empty() {
		return;
	}
	if ctx.tracker().track_source(module_id) {
		tracing::debug!(
			module = %module_id,
			literals = collection.identifiers.len(),
			"tracking source module"
		);
	}
}

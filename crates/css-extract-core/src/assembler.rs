//! Stylesheet assembly.
//!
//! Replaces the first injection directive in a stylesheet module with every
//! registered rule. Assembly reads the registry's current snapshot on every
//! call, so the host may re-run it any number of times per session.

use crate::context::ExtractContext;
use crate::hooks::{ModuleHost, TransformOutcome};

/// Separator between injected rules.
pub const RULE_SEPARATOR: &str = "\n\n";

/// Replaces the first `directive` in `text` with `rules` joined by a blank line.
///
/// Returns `None` when `text` has no directive.
///
/// # Examples
///
/// ```rust
/// use css_extract_core::assembler::inject;
///
/// let rules = vec![".a {}".to_string(), ".b {}".to_string()];
/// assert_eq!(
///     inject("x @extracted-css y", "@extracted-css", &rules).as_deref(),
///     Some("x .a {}\n\n.b {} y")
/// );
/// assert_eq!(inject("x", "@extracted-css", &rules), None);
/// ```
pub fn inject(text: &str, directive: &str, rules: &[String]) -> Option<String> {
	if !text.contains(directive) {
		return None;
	}
	Some(text.replacen(directive, &rules.join(RULE_SEPARATOR), 1))
}

/// Assembles a stylesheet module within a session.
///
/// A stylesheet containing the directive is tracked, every tracked source
/// module is registered as one of its watch files, and the directive is
/// replaced with the current registry snapshot.
pub fn assemble_stylesheet(
	ctx: &ExtractContext,
	host: &dyn ModuleHost,
	module_id: &str,
	text: &str,
) -> TransformOutcome {
	let directive = ctx.config().directive.as_str();
	if !text.contains(directive) {
		return TransformOutcome::Unchanged;
	}

	let tracker = ctx.tracker();
	tracker.track_stylesheet(module_id);
	for source in tracker.tracked_sources() {
		host.add_watch_file(module_id, &source);
	}

	let rules = ctx.registry().snapshot_all();
	tracing::debug!(module = %module_id, rules = rules.len(), "assembled stylesheet");
	tracker.mark_assembled(module_id);

	inject(text, directive, &rules).map_or(TransformOutcome::Unchanged, TransformOutcome::Replaced)
}

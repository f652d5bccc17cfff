//! Host hook contract.
//!
//! The host build tool owns module resolution, loading and scheduling. It
//! supplies a [`ModuleHost`] and drives a [`BuildHook`] through four
//! extension points:
//!
//! ```text
//!  host                         plugin
//!  ────                         ──────
//!  resolve specifier   ───────▶ resolve_id ──▶ virtual runtime id
//!  load module         ───────▶ load       ──▶ runtime source / pre-collect
//!  transform module    ───────▶ transform  ──▶ rewritten source / stylesheet
//!  file changed        ───────▶ on_change  ──▶ invalidate_module(stylesheet)
//! ```
//!
//! Every hook receives the session's [`ExtractContext`]; the plugin value
//! itself holds no state.

use async_trait::async_trait;

use crate::assembler;
use crate::config::ModuleKind;
use crate::context::ExtractContext;
use crate::error::ExtractResult;
use crate::rewrite;
use crate::runtime;

/// Result of a transform hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
	/// The plugin did not change the module; the host should skip it.
	Unchanged,
	/// Replacement module text.
	Replaced(String),
}

impl TransformOutcome {
	/// Returns the replacement text, if any.
	pub fn replaced(&self) -> Option<&str> {
		match self {
			Self::Unchanged => None,
			Self::Replaced(text) => Some(text),
		}
	}

	/// Whether the module was left untouched.
	pub fn is_unchanged(&self) -> bool {
		matches!(self, Self::Unchanged)
	}
}

/// Result of a load hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
	/// The host should load the module itself.
	Deferred,
	/// Synthetic module source.
	Source(String),
}

/// Capabilities the host supplies to the plugin.
#[async_trait]
pub trait ModuleHost: Send + Sync {
	/// Reads a module's text.
	///
	/// Fails with [`crate::ExtractError::ModuleNotFound`] when the module
	/// cannot be located.
	async fn read_module_text(&self, id: &str) -> ExtractResult<String>;

	/// Marks a previously produced module output as stale.
	fn invalidate_module(&self, id: &str);

	/// Registers `id` as a dependency of `importer`, so changes to `id`
	/// are reported while `importer` is live.
	fn add_watch_file(&self, importer: &str, id: &str);
}

/// Extension points a host invokes.
#[async_trait]
pub trait BuildHook: Send + Sync {
	/// Plugin name, for host diagnostics.
	fn name(&self) -> &str;

	/// Resolves an import specifier to a module id the plugin owns.
	fn resolve_id(&self, ctx: &ExtractContext, specifier: &str) -> Option<String>;

	/// Loads module content by id.
	async fn load(
		&self,
		ctx: &ExtractContext,
		host: &dyn ModuleHost,
		id: &str,
	) -> ExtractResult<LoadOutcome>;

	/// Transforms module content.
	fn transform(
		&self,
		ctx: &ExtractContext,
		host: &dyn ModuleHost,
		code: &str,
		id: &str,
	) -> TransformOutcome;

	/// Handles a change notification. Returns the number of modules invalidated.
	fn on_change(
		&self,
		ctx: &ExtractContext,
		host: &dyn ModuleHost,
		changed: &[String],
	) -> usize;
}

/// The extraction plugin.
///
/// # Examples
///
/// ```rust
/// use css_extract_core::prelude::*;
///
/// let ctx = ExtractContext::default();
/// let plugin = CssExtractPlugin::new();
///
/// assert_eq!(
///     plugin.resolve_id(&ctx, "css-extract/comptime"),
///     Some("\0css-extract/comptime".to_string())
/// );
/// assert_eq!(plugin.resolve_id(&ctx, "react"), None);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CssExtractPlugin;

/// Name reported by [`CssExtractPlugin`].
pub const PLUGIN_NAME: &str = "css-extract";

impl CssExtractPlugin {
	/// Creates the plugin.
	pub fn new() -> Self {
		Self
	}

	fn after_registration(&self, ctx: &ExtractContext, host: &dyn ModuleHost, inserted: usize) {
		if inserted > 0 && ctx.config().eager_invalidation {
			ctx.tracker().invalidate_assembled(host);
		}
	}
}

#[async_trait]
impl BuildHook for CssExtractPlugin {
	fn name(&self) -> &str {
		PLUGIN_NAME
	}

	fn resolve_id(&self, ctx: &ExtractContext, specifier: &str) -> Option<String> {
		(specifier == ctx.config().virtual_module).then(|| ctx.config().resolved_virtual_id())
	}

	async fn load(
		&self,
		ctx: &ExtractContext,
		host: &dyn ModuleHost,
		id: &str,
	) -> ExtractResult<LoadOutcome> {
		let config = ctx.config();
		match config.classify(id) {
			ModuleKind::VirtualRuntime => {
				Ok(LoadOutcome::Source(runtime::module_source(config)))
			}
			ModuleKind::Source if config.precollect => {
				let text = host.read_module_text(id).await?;
				let collection = rewrite::collect_source(ctx, id, &text);
				self.after_registration(ctx, host, collection.inserted);
				Ok(LoadOutcome::Deferred)
			}
			ModuleKind::Stylesheet if config.precollect => {
				let text = host.read_module_text(id).await?;
				if text.contains(config.directive.as_str()) {
					ctx.tracker().track_stylesheet(id);
				}
				Ok(LoadOutcome::Deferred)
			}
			_ => Ok(LoadOutcome::Deferred),
		}
	}

	fn transform(
		&self,
		ctx: &ExtractContext,
		host: &dyn ModuleHost,
		code: &str,
		id: &str,
	) -> TransformOutcome {
		match ctx.config().classify(id) {
			ModuleKind::Source => {
				let rewrite = rewrite::transform_source(ctx, id, code);
				self.after_registration(ctx, host, rewrite.collection.inserted);
				rewrite.outcome
			}
			ModuleKind::Stylesheet => assembler::assemble_stylesheet(ctx, host, id, code),
			ModuleKind::VirtualRuntime | ModuleKind::Other => TransformOutcome::Unchanged,
		}
	}

	fn on_change(
		&self,
		ctx: &ExtractContext,
		host: &dyn ModuleHost,
		changed: &[String],
	) -> usize {
		ctx.tracker().on_source_changed(host, changed)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_transform_outcome_accessors() {
		let replaced = TransformOutcome::Replaced("x".to_string());
		assert_eq!(replaced.replaced(), Some("x"));
		assert!(!replaced.is_unchanged());
		assert_eq!(TransformOutcome::Unchanged.replaced(), None);
		assert!(TransformOutcome::Unchanged.is_unchanged());
	}

	#[rstest]
	fn test_resolve_custom_virtual_module() {
		let config = crate::config::ExtractConfig::builder()
			.virtual_module("@app/styles/runtime")
			.build()
			.unwrap();
		let ctx = ExtractContext::new(config);
		let plugin = CssExtractPlugin::new();

		assert_eq!(
			plugin.resolve_id(&ctx, "@app/styles/runtime").as_deref(),
			Some("\0@app/styles/runtime")
		);
		assert_eq!(plugin.resolve_id(&ctx, "css-extract/comptime"), None);
		assert_eq!(plugin.name(), "css-extract");
	}
}

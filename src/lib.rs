//! # css-extract
//!
//! Build-time extraction of inline style literals into static stylesheets.
//!
//! Components keep their styles next to their markup as tagged template
//! literals. During a build every literal becomes a deterministic class name
//! and the rules are collected into the stylesheet that carries the
//! `@extracted-css` directive, so nothing is computed in the browser.
//!
//! ## Crates
//!
//! - [`css_extract_core`] - scanner, registry, assembler and the build hooks
//! - `css-extract-cli` - file-system host with `build` and `watch` commands
//!
//! ## Quick Example
//!
//! ```rust
//! use css_extract::prelude::*;
//!
//! let ctx = ExtractContext::default();
//! let registration = ctx.registry().register("color: red;");
//!
//! assert_eq!(registration.identifier, "css-34gjkj");
//! ```
//!
//! Hosts implement [`ModuleHost`] and drive a [`CssExtractPlugin`] through the
//! [`BuildHook`] methods: `load` for every module, then `transform` for source
//! modules before stylesheets, and `on_change` when files change.

pub use css_extract_core::{
	BuildHook, CssExtractPlugin, ExtractConfig, ExtractConfigBuilder, ExtractContext,
	ExtractError, ExtractResult, LoadOutcome, ModuleHost, ModuleKind, TransformOutcome,
};

pub use css_extract_core::{
	assembler, config, context, error, hash, hooks, invalidation, registry, rewrite, runtime,
	scanner,
};

/// Re-export commonly used types.
pub mod prelude {
	pub use css_extract_core::prelude::*;
}

#[cfg(test)]
mod tests {
	use super::prelude::*;
	use rstest::rstest;

	#[rstest]
	fn test_prelude_reaches_core() {
		let ctx = ExtractContext::new(ExtractConfig::default());
		let plugin = CssExtractPlugin::new();

		assert_eq!(plugin.name(), PLUGIN_NAME);
		assert_eq!(
			plugin.resolve_id(&ctx, "css-extract/comptime"),
			Some("\0css-extract/comptime".to_string())
		);
	}

	#[rstest]
	fn test_hash_module_is_reexported() {
		assert_eq!(crate::hash::hash("display: flex;"), "f0yu4a");
	}
}

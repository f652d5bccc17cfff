//! Build-time extraction of inline style literals.
//!
//! Application modules write styles next to their markup as tagged template
//! literals:
//!
//! ```js
//! import { css } from "css-extract/comptime"
//!
//! const button = css`
//!     background: blue;
//!     color: white;
//! `
//! ```
//!
//! At build time every literal is replaced with a deterministic class name
//! (`"css-1x2y3z"`), and the collected rules are injected into the stylesheet
//! module that contains the `@extracted-css` directive.
//!
//! # Architecture
//!
//! ```text
//! source module ──▶ Scanner ──▶ rewrite ──▶ rewritten source (to host)
//!                                  │
//!                                  ▼
//!                            StyleRegistry ──▶ assembler ──▶ stylesheet
//!                                                  ▲
//!            change event ──▶ InvalidationTracker ─┘ (re-assemble)
//! ```
//!
//! All session state lives in an [`ExtractContext`]; the host drives the
//! [`CssExtractPlugin`] through the [`BuildHook`] extension points and
//! supplies a [`ModuleHost`].
//!
//! # Quick Start
//!
//! ```ignore
//! use css_extract_core::prelude::*;
//!
//! let ctx = ExtractContext::new(ExtractConfig::default());
//! let plugin = CssExtractPlugin::new();
//!
//! plugin.load(&ctx, &host, "src/button.tsx").await?;
//! let js = plugin.transform(&ctx, &host, &source, "src/button.tsx");
//! let css = plugin.transform(&ctx, &host, &stylesheet, "src/main.css");
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod assembler;
pub mod config;
pub mod context;
pub mod error;
pub mod hash;
pub mod hooks;
pub mod invalidation;
pub mod registry;
pub mod rewrite;
pub mod runtime;
pub mod scanner;

pub use config::{ExtractConfig, ExtractConfigBuilder, ModuleKind};
pub use context::ExtractContext;
pub use error::{ExtractError, ExtractResult};
pub use hooks::{BuildHook, CssExtractPlugin, LoadOutcome, ModuleHost, TransformOutcome};

/// Re-export commonly used types.
pub mod prelude {
	pub use crate::config::{CONFIG_FILENAME, ExtractConfig, ExtractConfigBuilder, ModuleKind};
	pub use crate::context::ExtractContext;
	pub use crate::error::{ExtractError, ExtractResult};
	pub use crate::hooks::{
		BuildHook, CssExtractPlugin, LoadOutcome, ModuleHost, PLUGIN_NAME, TransformOutcome,
	};
	pub use crate::registry::{Registration, RuleEntry, StyleRegistry};
	pub use crate::scanner::{ScanState, Scanner};

	pub use async_trait::async_trait;
}

//! Plugin configuration.
//!
//! Every option has a default matching the conventional authoring surface
//! (`css` tag, `@extracted-css` directive), so an empty `css-extract.toml`
//! is a valid configuration.
//!
//! ```toml
//! tag = "css"
//! directive = "@extracted-css"
//! virtual_module = "css-extract/comptime"
//! source_extensions = ["js", "jsx", "ts", "tsx"]
//! excluded_segments = ["node_modules"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, ExtractResult};

/// Configuration file name looked up in a project root.
pub const CONFIG_FILENAME: &str = "css-extract.toml";

/// Default tag keyword.
pub const DEFAULT_TAG: &str = "css";

/// Default injection directive.
pub const DEFAULT_DIRECTIVE: &str = "@extracted-css";

/// Default virtual module identifier of the fallback runtime.
pub const DEFAULT_VIRTUAL_MODULE: &str = "css-extract/comptime";

/// Default prefix of generated class names.
pub const DEFAULT_CLASS_PREFIX: &str = "css-";

/// Marker prepended to resolved virtual ids so other plugins leave them alone.
pub const VIRTUAL_ID_MARKER: char = '\0';

/// What the plugin does with a module, decided from its identifier alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
	/// Application source that may contain tagged literals.
	Source,
	/// Stylesheet that may contain the injection directive.
	Stylesheet,
	/// The resolved fallback runtime module.
	VirtualRuntime,
	/// Anything else; passed through untouched.
	Other,
}

/// Plugin options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
	/// Tag keyword that marks a literal for extraction.
	pub tag: String,
	/// Token replaced by the collected rules in stylesheet modules.
	pub directive: String,
	/// Import specifier of the fallback runtime module.
	pub virtual_module: String,
	/// Prefix of generated class names.
	pub class_prefix: String,
	/// Extensions (without dot) of application source modules.
	pub source_extensions: Vec<String>,
	/// Extensions (without dot) of stylesheet modules.
	pub stylesheet_extensions: Vec<String>,
	/// Source ids containing any of these segments are skipped.
	pub excluded_segments: Vec<String>,
	/// Collect literals while loading source modules, ahead of transform.
	pub precollect: bool,
	/// Invalidate assembled stylesheets as soon as a new rule is registered.
	pub eager_invalidation: bool,
}

impl Default for ExtractConfig {
	fn default() -> Self {
		Self {
			tag: DEFAULT_TAG.to_string(),
			directive: DEFAULT_DIRECTIVE.to_string(),
			virtual_module: DEFAULT_VIRTUAL_MODULE.to_string(),
			class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
			source_extensions: ["js", "jsx", "ts", "tsx"]
				.into_iter()
				.map(String::from)
				.collect(),
			stylesheet_extensions: vec!["css".to_string()],
			excluded_segments: vec!["node_modules".to_string()],
			precollect: true,
			eager_invalidation: true,
		}
	}
}

impl ExtractConfig {
	/// Creates a configuration builder.
	pub fn builder() -> ExtractConfigBuilder {
		ExtractConfigBuilder::new()
	}

	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> ExtractResult<Self> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads and validates a TOML configuration file.
	pub fn from_file(path: impl AsRef<Path>) -> ExtractResult<Self> {
		let input = std::fs::read_to_string(path.as_ref())?;
		tracing::debug!(path = %path.as_ref().display(), "loaded extraction config");
		Self::from_toml_str(&input)
	}

	/// Checks that the configured tokens can actually be matched.
	pub fn validate(&self) -> ExtractResult<()> {
		if !is_identifier(&self.tag) {
			return Err(ExtractError::InvalidConfig(format!(
				"tag '{}' is not a valid identifier",
				self.tag
			)));
		}
		if self.directive.is_empty() {
			return Err(ExtractError::InvalidConfig(
				"directive must not be empty".to_string(),
			));
		}
		if self.virtual_module.is_empty() {
			return Err(ExtractError::InvalidConfig(
				"virtual_module must not be empty".to_string(),
			));
		}
		if self.class_prefix.is_empty() {
			return Err(ExtractError::InvalidConfig(
				"class_prefix must not be empty".to_string(),
			));
		}
		Ok(())
	}

	/// Returns the id the virtual runtime module resolves to.
	pub fn resolved_virtual_id(&self) -> String {
		format!("{}{}", VIRTUAL_ID_MARKER, self.virtual_module)
	}

	/// Classifies a module id.
	pub fn classify(&self, id: &str) -> ModuleKind {
		if id.strip_prefix(VIRTUAL_ID_MARKER) == Some(self.virtual_module.as_str()) {
			return ModuleKind::VirtualRuntime;
		}
		if has_extension(id, &self.source_extensions)
			&& !self
				.excluded_segments
				.iter()
				.any(|segment| id.contains(segment.as_str()))
		{
			return ModuleKind::Source;
		}
		if has_extension(id, &self.stylesheet_extensions) {
			return ModuleKind::Stylesheet;
		}
		ModuleKind::Other
	}
}

fn has_extension(id: &str, extensions: &[String]) -> bool {
	match id.rsplit_once('.') {
		Some((stem, ext)) if !stem.is_empty() => extensions.iter().any(|e| e == ext),
		_ => false,
	}
}

fn is_identifier(s: &str) -> bool {
	let mut chars = s.chars();
	match chars.next() {
		Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
			chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
		}
		_ => false,
	}
}

/// Builder for [`ExtractConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExtractConfigBuilder {
	config: ExtractConfig,
}

impl ExtractConfigBuilder {
	/// Creates a builder seeded with the defaults.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the tag keyword.
	pub fn tag(mut self, tag: impl Into<String>) -> Self {
		self.config.tag = tag.into();
		self
	}

	/// Sets the injection directive.
	pub fn directive(mut self, directive: impl Into<String>) -> Self {
		self.config.directive = directive.into();
		self
	}

	/// Sets the virtual runtime module specifier.
	pub fn virtual_module(mut self, id: impl Into<String>) -> Self {
		self.config.virtual_module = id.into();
		self
	}

	/// Sets the generated class name prefix.
	pub fn class_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.config.class_prefix = prefix.into();
		self
	}

	/// Adds an excluded id segment.
	pub fn exclude(mut self, segment: impl Into<String>) -> Self {
		self.config.excluded_segments.push(segment.into());
		self
	}

	/// Enables or disables load-phase collection.
	pub fn precollect(mut self, enabled: bool) -> Self {
		self.config.precollect = enabled;
		self
	}

	/// Enables or disables invalidation on newly registered rules.
	pub fn eager_invalidation(mut self, enabled: bool) -> Self {
		self.config.eager_invalidation = enabled;
		self
	}

	/// Validates and builds the configuration.
	pub fn build(self) -> ExtractResult<ExtractConfig> {
		self.config.validate()?;
		Ok(self.config)
	}
}

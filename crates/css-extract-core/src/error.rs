//! Error types for the extraction pipeline.
//!
//! Only two parts of the pipeline can fail: reading module text through the
//! host, and loading configuration. Hashing, registration and stylesheet
//! assembly are infallible, and an unterminated literal is reported as a scan
//! state rather than an error (see [`crate::scanner::ScanState`]).

use thiserror::Error;

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Extraction pipeline errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
	/// The host could not locate the module.
	#[error("module not found: {0}")]
	ModuleNotFound(String),

	/// The host located the module but failed to read it.
	#[error("failed to read module '{module}': {message}")]
	ModuleRead {
		/// Module identifier.
		module: String,
		/// Underlying failure reported by the host.
		message: String,
	},

	/// Plugin configuration is invalid.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// Configuration file could not be parsed.
	#[error("TOML parse error: {0}")]
	TomlParse(String),

	/// IO error.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

impl ExtractError {
	/// Builds a read failure for `module` from any displayable cause.
	pub fn module_read(module: impl Into<String>, cause: impl std::fmt::Display) -> Self {
		Self::ModuleRead {
			module: module.into(),
			message: cause.to_string(),
		}
	}
}

impl From<toml::de::Error> for ExtractError {
	fn from(err: toml::de::Error) -> Self {
		Self::TomlParse(err.to_string())
	}
}

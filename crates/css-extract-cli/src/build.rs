//! One-shot build driver
//!
//! Runs the hook passes over every module under the project root and writes
//! the results to the output directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use css_extract_core::prelude::*;
use walkdir::WalkDir;

use crate::host::FsHost;

/// Counts reported at the end of a build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
	/// Modules written with transformed text.
	pub transformed: usize,
	/// Modules copied unchanged.
	pub copied: usize,
}

/// Drives a [`CssExtractPlugin`] over a project directory.
pub struct Builder {
	ctx: ExtractContext,
	plugin: CssExtractPlugin,
	host: FsHost,
	out_dir: PathBuf,
}

impl Builder {
	/// Creates a builder for `root`, writing into `out_dir`.
	pub fn new(
		config: ExtractConfig,
		root: impl Into<PathBuf>,
		out_dir: impl Into<PathBuf>,
	) -> Self {
		Self {
			ctx: ExtractContext::new(config),
			plugin: CssExtractPlugin::new(),
			host: FsHost::new(root),
			out_dir: out_dir.into(),
		}
	}

	/// Session context shared by every pass.
	pub fn context(&self) -> &ExtractContext {
		&self.ctx
	}

	/// Host the plugin reads through.
	pub fn host(&self) -> &FsHost {
		&self.host
	}

	/// Output directory.
	pub fn out_dir(&self) -> &Path {
		&self.out_dir
	}

	/// Lists module ids under the root, skipping the output directory.
	///
	/// Sources and other modules come first and stylesheets last, so every
	/// rule is registered before a stylesheet is assembled.
	pub fn discover(&self) -> Result<Vec<String>> {
		let mut modules = Vec::new();
		let mut stylesheets = Vec::new();

		let walker = WalkDir::new(self.host.root())
			.sort_by_file_name()
			.into_iter()
			.filter_entry(|entry| !entry.path().starts_with(&self.out_dir));
		for entry in walker {
			let entry = entry.context("Failed to walk project root")?;
			if !entry.file_type().is_file() {
				continue;
			}
			let Some(id) = self.host.module_id(entry.path()) else {
				continue;
			};
			match self.ctx.config().classify(&id) {
				ModuleKind::Stylesheet => stylesheets.push(id),
				_ => modules.push(id),
			}
		}

		modules.extend(stylesheets);
		Ok(modules)
	}

	/// Builds every module under the root.
	pub async fn build(&self) -> Result<BuildSummary> {
		let modules = self.discover()?;
		tracing::info!(
			root = %self.host.root().display(),
			modules = modules.len(),
			"Starting build"
		);

		for id in &modules {
			self.plugin
				.load(&self.ctx, &self.host, id)
				.await
				.with_context(|| format!("Failed to load {}", id))?;
		}

		let mut summary = BuildSummary::default();
		for id in &modules {
			if self.emit(id).await? {
				summary.transformed += 1;
			} else {
				summary.copied += 1;
			}
		}

		// Stylesheets assembled during this build are current.
		self.host.take_stale();
		for stylesheet in self.ctx.tracker().tracked_stylesheets() {
			tracing::debug!(
				stylesheet = %stylesheet,
				dependencies = self.host.watch_files(&stylesheet).len(),
				"Stylesheet assembled"
			);
		}

		tracing::info!(
			transformed = summary.transformed,
			copied = summary.copied,
			rules = self.ctx.registry().len(),
			"Build finished"
		);
		Ok(summary)
	}

	/// Reports changed modules to the plugin.
	///
	/// Returns the number of stylesheets invalidated.
	pub fn changed(&self, ids: &[String]) -> usize {
		self.plugin.on_change(&self.ctx, &self.host, ids)
	}

	/// Loads, transforms and writes a single module.
	///
	/// Returns whether the written output differs from the input.
	pub async fn rebuild(&self, id: &str) -> Result<bool> {
		self.plugin
			.load(&self.ctx, &self.host, id)
			.await
			.with_context(|| format!("Failed to load {}", id))?;
		self.emit(id).await
	}

	async fn emit(&self, id: &str) -> Result<bool> {
		let target = self.out_dir.join(id);
		if let Some(parent) = target.parent() {
			tokio::fs::create_dir_all(parent)
				.await
				.with_context(|| format!("Failed to create {}", parent.display()))?;
		}

		if matches!(self.ctx.config().classify(id), ModuleKind::Other) {
			tokio::fs::copy(self.host.path_of(id), &target)
				.await
				.with_context(|| format!("Failed to copy {}", id))?;
			return Ok(false);
		}

		let code = self
			.host
			.read_module_text(id)
			.await
			.with_context(|| format!("Failed to read {}", id))?;
		let outcome = self.plugin.transform(&self.ctx, &self.host, &code, id);
		let (text, changed) = match outcome.replaced() {
			Some(text) => (text, true),
			None => (code.as_str(), false),
		};
		tokio::fs::write(&target, text)
			.await
			.with_context(|| format!("Failed to write {}", target.display()))?;

		tracing::debug!(module = %id, changed, "Module written");
		Ok(changed)
	}
}

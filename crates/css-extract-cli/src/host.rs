//! File-system module host
//!
//! Module ids are paths relative to the project root, always joined with `/`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use css_extract_core::{ExtractError, ExtractResult, ModuleHost};
use indexmap::IndexSet;
use parking_lot::Mutex;

/// [`ModuleHost`] that reads modules from disk.
///
/// Invalidated modules and watch-file edges are recorded so the driver can
/// re-run the affected transforms.
#[derive(Debug)]
pub struct FsHost {
	root: PathBuf,
	stale: Mutex<IndexSet<String>>,
	watched: Mutex<IndexSet<(String, String)>>,
}

impl FsHost {
	/// Creates a host rooted at `root`.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {
			root: root.into(),
			stale: Mutex::new(IndexSet::new()),
			watched: Mutex::new(IndexSet::new()),
		}
	}

	/// Project root.
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Absolute path of a module.
	pub fn path_of(&self, id: &str) -> PathBuf {
		self.root.join(id)
	}

	/// Converts a path under the root into a module id.
	///
	/// Returns `None` for paths outside the root.
	pub fn module_id(&self, path: &Path) -> Option<String> {
		let relative = path.strip_prefix(&self.root).ok()?;
		let segments: Vec<_> = relative
			.components()
			.map(|c| c.as_os_str().to_string_lossy())
			.collect();
		if segments.is_empty() {
			return None;
		}
		Some(segments.join("/"))
	}

	/// Drains the modules invalidated since the last call, in order.
	pub fn take_stale(&self) -> Vec<String> {
		self.stale.lock().drain(..).collect()
	}

	/// Modules registered as dependencies of `importer`.
	pub fn watch_files(&self, importer: &str) -> Vec<String> {
		self.watched
			.lock()
			.iter()
			.filter(|(from, _)| from == importer)
			.map(|(_, id)| id.clone())
			.collect()
	}
}

#[async_trait]
impl ModuleHost for FsHost {
	async fn read_module_text(&self, id: &str) -> ExtractResult<String> {
		match tokio::fs::read_to_string(self.path_of(id)).await {
			Ok(text) => Ok(text),
			Err(e) if e.kind() == ErrorKind::NotFound => {
				Err(ExtractError::ModuleNotFound(id.to_string()))
			}
			Err(e) => Err(ExtractError::module_read(id, e)),
		}
	}

	fn invalidate_module(&self, id: &str) {
		if self.stale.lock().insert(id.to_string()) {
			tracing::debug!(module = %id, "Module marked stale");
		}
	}

	fn add_watch_file(&self, importer: &str, id: &str) {
		self.watched
			.lock()
			.insert((importer.to_string(), id.to_string()));
	}
}

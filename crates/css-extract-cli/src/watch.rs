//! Watch mode
//!
//! Rebuilds changed modules and re-assembles the stylesheets they invalidate.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use tokio::sync::mpsc;

use crate::build::Builder;

/// Events emitted by the file watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
	/// A file was created or modified
	Changed(PathBuf),
	/// A file was deleted
	Deleted(PathBuf),
	/// An error occurred while watching
	Error(String),
}

impl WatchEvent {
	fn from_notify(res: Result<Event, notify::Error>) -> Vec<Self> {
		match res {
			Ok(event) => match event.kind {
				EventKind::Create(_) | EventKind::Modify(_) => {
					event.paths.into_iter().map(Self::Changed).collect()
				}
				EventKind::Remove(_) => event.paths.into_iter().map(Self::Deleted).collect(),
				_ => Vec::new(),
			},
			Err(e) => vec![Self::Error(e.to_string())],
		}
	}
}

/// Recursive file system watcher feeding a channel.
pub struct FileWatcher {
	_watcher: RecommendedWatcher,
	receiver: mpsc::UnboundedReceiver<WatchEvent>,
}

impl FileWatcher {
	/// Starts watching `path` recursively.
	pub fn new(path: &Path) -> Result<Self> {
		let (tx, rx) = mpsc::unbounded_channel();

		let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
			for event in WatchEvent::from_notify(res) {
				let _ = tx.send(event);
			}
		})
		.context("Failed to create file watcher")?;
		watcher
			.watch(path, RecursiveMode::Recursive)
			.with_context(|| format!("Failed to watch {}", path.display()))?;

		Ok(Self {
			_watcher: watcher,
			receiver: rx,
		})
	}

	/// Waits for the next event.
	///
	/// Returns `None` if the watcher has been closed.
	pub async fn next_event(&mut self) -> Option<WatchEvent> {
		self.receiver.recv().await
	}

	/// Receives every event already queued.
	pub fn drain(&mut self) -> Vec<WatchEvent> {
		std::iter::from_fn(|| self.receiver.try_recv().ok()).collect()
	}
}

/// Builds once, then rebuilds on every change until the watcher closes.
pub async fn run(builder: &Builder) -> Result<()> {
	builder.build().await?;

	let mut watcher = FileWatcher::new(builder.host().root())?;
	tracing::info!(root = %builder.host().root().display(), "Watching for changes");

	while let Some(first) = watcher.next_event().await {
		let mut events = vec![first];
		events.extend(watcher.drain());
		if let Err(e) = apply(builder, events).await {
			tracing::error!(error = %format!("{:#}", e), "Rebuild failed");
		}
	}
	Ok(())
}

/// Handles one batch of watcher events.
///
/// Returns the modules that were rewritten.
pub async fn apply(builder: &Builder, events: Vec<WatchEvent>) -> Result<Vec<String>> {
	let mut changed = Vec::new();
	let mut deleted = Vec::new();
	for event in events {
		let (path, is_delete) = match event {
			WatchEvent::Changed(path) => (path, false),
			WatchEvent::Deleted(path) => (path, true),
			WatchEvent::Error(message) => {
				tracing::warn!(%message, "Watcher error");
				continue;
			}
		};
		if path.starts_with(builder.out_dir()) || (!is_delete && !path.is_file()) {
			continue;
		}
		let Some(id) = builder.host().module_id(&path) else {
			continue;
		};
		let list = if is_delete { &mut deleted } else { &mut changed };
		if !list.contains(&id) {
			list.push(id);
		}
	}

	let reported: Vec<String> = changed.iter().chain(&deleted).cloned().collect();
	if reported.is_empty() {
		return Ok(Vec::new());
	}
	let invalidated = builder.changed(&reported);
	tracing::info!(modules = ?reported, invalidated, "Change detected");

	let mut rebuilt = Vec::new();
	for id in changed {
		builder.rebuild(&id).await?;
		rebuilt.push(id);
	}
	for id in builder.host().take_stale() {
		if rebuilt.contains(&id) || deleted.contains(&id) {
			continue;
		}
		builder.rebuild(&id).await?;
		rebuilt.push(id);
	}
	Ok(rebuilt)
}

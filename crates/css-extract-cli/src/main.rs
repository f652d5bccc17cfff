//! css-extract CLI
//!
//! Reference host for the extraction plugin: builds a project directory once
//! or keeps rebuilding it as files change.
//!
//! ## Usage
//!
//! ```bash
//! css-extract build --root . --out dist
//! css-extract watch --root . --out dist --config css-extract.toml
//! css-extract -vv build --root app --out dist
//! ```

mod build;
mod host;
mod watch;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use css_extract_core::config::CONFIG_FILENAME;
use css_extract_core::ExtractConfig;
use tracing_subscriber::EnvFilter;

use crate::build::Builder;

#[derive(Parser)]
#[command(name = "css-extract")]
#[command(about = "Extract inline style literals into stylesheets", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Verbosity level (can be repeated)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbosity: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Build the project once
	Build(BuildArgs),

	/// Build the project, then rebuild on every change
	Watch(BuildArgs),
}

#[derive(Args)]
struct BuildArgs {
	/// Project root to scan
	#[arg(long, value_name = "DIR", default_value = ".")]
	root: PathBuf,

	/// Output directory
	#[arg(long, value_name = "DIR", default_value = "dist")]
	out: PathBuf,

	/// Configuration file (defaults to css-extract.toml in the root, if present)
	#[arg(long, value_name = "FILE")]
	config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbosity);

	let result = match cli.command {
		Commands::Build(args) => run_build(args).await,
		Commands::Watch(args) => run_watch(args).await,
	};

	if let Err(e) = result {
		eprintln!("Error: {:#}", e);
		process::exit(1);
	}
}

fn init_tracing(verbosity: u8) {
	let level = match verbosity {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}

async fn run_build(args: BuildArgs) -> Result<()> {
	let builder = prepare(&args)?;
	let summary = builder.build().await?;
	println!(
		"Built {} module(s): {} transformed, {} copied, {} rule(s) extracted",
		summary.transformed + summary.copied,
		summary.transformed,
		summary.copied,
		builder.context().registry().len()
	);
	Ok(())
}

async fn run_watch(args: BuildArgs) -> Result<()> {
	let builder = prepare(&args)?;
	watch::run(&builder).await
}

fn prepare(args: &BuildArgs) -> Result<Builder> {
	let root = args
		.root
		.canonicalize()
		.with_context(|| format!("Project root {} not found", args.root.display()))?;
	std::fs::create_dir_all(&args.out)
		.with_context(|| format!("Failed to create {}", args.out.display()))?;
	let out = args.out.canonicalize()?;
	let config = load_config(&root, args.config.as_deref())?;

	Ok(Builder::new(config, root, out))
}

fn load_config(root: &Path, explicit: Option<&Path>) -> Result<ExtractConfig> {
	let path = match explicit {
		Some(path) => path.to_path_buf(),
		None => {
			let default = root.join(CONFIG_FILENAME);
			if !default.is_file() {
				tracing::debug!("No configuration file, using defaults");
				return Ok(ExtractConfig::default());
			}
			default
		}
	};
	ExtractConfig::from_file(&path)
		.with_context(|| format!("Failed to load configuration from {}", path.display()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;
	use rstest::rstest;
	use tempfile::TempDir;

	#[rstest]
	fn test_cli_definition() {
		Cli::command().debug_assert();
	}

	#[rstest]
	fn test_parse_build_arguments() {
		let cli = Cli::parse_from([
			"css-extract",
			"-vv",
			"build",
			"--root",
			"app",
			"--out",
			"public",
		]);

		assert_eq!(cli.verbosity, 2);
		let Commands::Build(args) = cli.command else {
			panic!("expected build command");
		};
		assert_eq!(args.root, PathBuf::from("app"));
		assert_eq!(args.out, PathBuf::from("public"));
		assert!(args.config.is_none());
	}

	#[rstest]
	fn test_load_config_defaults_without_file() {
		let dir = TempDir::new().unwrap();

		let config = load_config(dir.path(), None).unwrap();

		assert_eq!(config, ExtractConfig::default());
	}

	#[rstest]
	fn test_load_config_from_root() {
		let dir = TempDir::new().unwrap();
		std::fs::write(dir.path().join(CONFIG_FILENAME), "tag = \"style\"\n").unwrap();

		let config = load_config(dir.path(), None).unwrap();

		assert_eq!(config.tag, "style");
	}

	#[rstest]
	fn test_load_config_invalid_file() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("custom.toml");
		std::fs::write(&path, "tag = \"not valid\"\n").unwrap();

		let err = load_config(dir.path(), Some(&path)).unwrap_err();

		assert!(err.to_string().contains("custom.toml"));
	}
}

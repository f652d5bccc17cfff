//! End-to-end tests of the hook contract against an in-memory host.

use std::collections::HashMap;

use css_extract_core::prelude::*;
use parking_lot::Mutex;
use rstest::{fixture, rstest};

/// Host backed by an in-memory module table.
#[derive(Default)]
struct MemoryHost {
	modules: Mutex<HashMap<String, String>>,
	invalidated: Mutex<Vec<String>>,
	watched: Mutex<Vec<(String, String)>>,
}

impl MemoryHost {
	fn with_modules(modules: &[(&str, &str)]) -> Self {
		let host = Self::default();
		for (id, text) in modules {
			host.write(id, text);
		}
		host
	}

	fn write(&self, id: &str, text: &str) {
		self.modules.lock().insert(id.to_string(), text.to_string());
	}

	fn text(&self, id: &str) -> String {
		self.modules.lock().get(id).cloned().unwrap()
	}

	fn take_invalidated(&self) -> Vec<String> {
		std::mem::take(&mut *self.invalidated.lock())
	}
}

#[async_trait]
impl ModuleHost for MemoryHost {
	async fn read_module_text(&self, id: &str) -> ExtractResult<String> {
		self.modules
			.lock()
			.get(id)
			.cloned()
			.ok_or_else(|| ExtractError::ModuleNotFound(id.to_string()))
	}

	fn invalidate_module(&self, id: &str) {
		self.invalidated.lock().push(id.to_string());
	}

	fn add_watch_file(&self, importer: &str, id: &str) {
		self.watched
			.lock()
			.push((importer.to_string(), id.to_string()));
	}
}

const BUTTON: &str = "import { css } from \"css-extract/comptime\";\n\
	// Usage: css`color: green;`\n\
	export const button = css`\n  color: white;\n`;\n";

const CARD: &str = "export const card = css`padding: 4px;`;\n\
	export const title = css`\n  color: white;\n`;\n";

const MAIN_CSS: &str = "body { margin: 0 }\n@extracted-css\n";

#[fixture]
fn host() -> MemoryHost {
	MemoryHost::with_modules(&[
		("src/button.tsx", BUTTON),
		("src/card.jsx", CARD),
		("src/util.ts", "export const add = (a, b) => a + b;\n"),
		("src/main.css", MAIN_CSS),
		("node_modules/lib/index.js", "export const x = css`color: red;`;\n"),
	])
}

async fn run_pass(
	plugin: &CssExtractPlugin,
	ctx: &ExtractContext,
	host: &MemoryHost,
	ids: &[&str],
) -> HashMap<String, TransformOutcome> {
	let mut out = HashMap::new();
	for id in ids {
		plugin.load(ctx, host, id).await.unwrap();
	}
	for id in ids {
		let code = host.text(id);
		out.insert(id.to_string(), plugin.transform(ctx, host, &code, id));
	}
	out
}

#[rstest]
#[tokio::test]
async fn test_full_build_pass(host: MemoryHost) {
	let ctx = ExtractContext::default();
	let plugin = CssExtractPlugin::new();

	let out = run_pass(
		&plugin,
		&ctx,
		&host,
		&[
			"src/button.tsx",
			"src/card.jsx",
			"src/util.ts",
			"src/main.css",
			"node_modules/lib/index.js",
		],
	)
	.await;

	let button = out["src/button.tsx"].replaced().unwrap();
	assert!(button.contains("export const button = \"css-"));
	assert!(button.contains("// Usage: css`color: green;`"));

	let card = out["src/card.jsx"].replaced().unwrap();
	assert_eq!(card.matches("\"css-").count(), 2);
	assert!(!card.contains("css`"));

	assert!(out["src/util.ts"].is_unchanged());
	assert!(out["node_modules/lib/index.js"].is_unchanged());

	// Two distinct bodies; the shared "color: white" rule is deduplicated.
	assert_eq!(ctx.registry().len(), 2);
	let stylesheet = out["src/main.css"].replaced().unwrap();
	assert!(stylesheet.starts_with("body { margin: 0 }\n.css-"));
	assert!(!stylesheet.contains("@extracted-css"));
	assert_eq!(stylesheet.matches("\n}").count(), 2);
	assert!(!stylesheet.contains("color: green"));
	assert!(!stylesheet.contains("color: red"));

	assert_eq!(
		ctx.tracker().tracked_sources(),
		vec!["src/button.tsx".to_string(), "src/card.jsx".to_string()]
	);
	assert_eq!(ctx.tracker().tracked_stylesheets(), vec!["src/main.css".to_string()]);
	assert_eq!(
		*host.watched.lock(),
		vec![
			("src/main.css".to_string(), "src/button.tsx".to_string()),
			("src/main.css".to_string(), "src/card.jsx".to_string()),
		]
	);
}

#[rstest]
#[tokio::test]
async fn test_rewritten_identifier_matches_injected_rule(host: MemoryHost) {
	let ctx = ExtractContext::default();
	let plugin = CssExtractPlugin::new();

	let out = run_pass(&plugin, &ctx, &host, &["src/card.jsx", "src/main.css"]).await;

	let card = out["src/card.jsx"].replaced().unwrap();
	let stylesheet = out["src/main.css"].replaced().unwrap();
	let start = card.find("\"css-").unwrap() + 1;
	let end = start + card[start..].find('"').unwrap();
	let identifier = &card[start..end];

	assert!(stylesheet.contains(&format!(".{} {{\npadding: 4px;\n}}", identifier)));
}

#[rstest]
#[tokio::test]
async fn test_change_triggers_reassembly(host: MemoryHost) {
	let ctx = ExtractContext::default();
	let plugin = CssExtractPlugin::new();
	run_pass(&plugin, &ctx, &host, &["src/button.tsx", "src/main.css"]).await;
	host.take_invalidated();

	host.write(
		"src/button.tsx",
		"export const button = css`color: black;`;\n",
	);
	let count = plugin.on_change(&ctx, &host, &["src/button.tsx".to_string()]);

	assert_eq!(count, 1);
	assert_eq!(host.take_invalidated(), vec!["src/main.css".to_string()]);

	// The host reprocesses the changed module, then the stale stylesheet.
	let code = host.text("src/button.tsx");
	plugin.load(&ctx, &host, "src/button.tsx").await.unwrap();
	plugin.transform(&ctx, &host, &code, "src/button.tsx");
	assert!(host.take_invalidated().is_empty());

	let stylesheet = plugin.transform(&ctx, &host, MAIN_CSS, "src/main.css");
	let stylesheet = stylesheet.replaced().unwrap();
	assert!(stylesheet.contains("color: black;"));
	// Stale rules stay registered until the session restarts.
	assert!(stylesheet.contains("color: white;"));
}

#[rstest]
#[tokio::test]
async fn test_untracked_change_is_ignored(host: MemoryHost) {
	let ctx = ExtractContext::default();
	let plugin = CssExtractPlugin::new();
	run_pass(&plugin, &ctx, &host, &["src/button.tsx", "src/util.ts", "src/main.css"]).await;
	host.take_invalidated();

	let count = plugin.on_change(&ctx, &host, &["src/util.ts".to_string()]);

	assert_eq!(count, 0);
	assert!(host.take_invalidated().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_late_source_invalidates_assembled_stylesheet(host: MemoryHost) {
	let config = ExtractConfig::builder().precollect(false).build().unwrap();
	let ctx = ExtractContext::new(config);
	let plugin = CssExtractPlugin::new();

	// The stylesheet is transformed before any source module.
	let first = plugin.transform(&ctx, &host, MAIN_CSS, "src/main.css");
	assert_eq!(first.replaced(), Some("body { margin: 0 }\n\n"));

	plugin.transform(&ctx, &host, BUTTON, "src/button.tsx");
	assert_eq!(host.take_invalidated(), vec!["src/main.css".to_string()]);

	// Re-registering known rules does not invalidate again.
	plugin.transform(&ctx, &host, BUTTON, "src/button.tsx");
	assert!(host.take_invalidated().is_empty());

	let second = plugin.transform(&ctx, &host, MAIN_CSS, "src/main.css");
	assert!(second.replaced().unwrap().contains("color: white;"));
}

#[rstest]
#[tokio::test]
async fn test_eager_invalidation_can_be_disabled(host: MemoryHost) {
	let config = ExtractConfig::builder()
		.precollect(false)
		.eager_invalidation(false)
		.build()
		.unwrap();
	let ctx = ExtractContext::new(config);
	let plugin = CssExtractPlugin::new();

	plugin.transform(&ctx, &host, MAIN_CSS, "src/main.css");
	plugin.transform(&ctx, &host, BUTTON, "src/button.tsx");

	assert!(host.take_invalidated().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_precollect_registers_before_transform(host: MemoryHost) {
	let ctx = ExtractContext::default();
	let plugin = CssExtractPlugin::new();

	for id in ["src/button.tsx", "src/card.jsx", "src/main.css"] {
		let outcome = plugin.load(&ctx, &host, id).await.unwrap();
		assert_eq!(outcome, LoadOutcome::Deferred);
	}

	assert_eq!(ctx.registry().len(), 2);
	assert!(ctx.tracker().is_tracked_source("src/button.tsx"));
	assert!(ctx.tracker().is_tracked_stylesheet("src/main.css"));

	// The stylesheet sees every rule on its first assembly.
	let stylesheet = plugin.transform(&ctx, &host, MAIN_CSS, "src/main.css");
	assert!(stylesheet.replaced().unwrap().contains("padding: 4px;"));
}

#[rstest]
#[tokio::test]
async fn test_missing_module_propagates(host: MemoryHost) {
	let ctx = ExtractContext::default();
	let plugin = CssExtractPlugin::new();

	let result = plugin.load(&ctx, &host, "src/missing.tsx").await;

	assert!(matches!(result, Err(ExtractError::ModuleNotFound(id)) if id == "src/missing.tsx"));
}

#[rstest]
#[tokio::test]
async fn test_virtual_runtime_module(host: MemoryHost) {
	let ctx = ExtractContext::default();
	let plugin = CssExtractPlugin::new();

	let resolved = plugin.resolve_id(&ctx, "css-extract/comptime").unwrap();
	let loaded = plugin.load(&ctx, &host, &resolved).await.unwrap();

	let LoadOutcome::Source(source) = loaded else {
		panic!("expected synthetic source");
	};
	assert!(source.contains("export function css(strings, ...values)"));
	assert!(plugin.transform(&ctx, &host, &source, &resolved).is_unchanged());
}

#[rstest]
#[tokio::test]
async fn test_other_modules_are_deferred(host: MemoryHost) {
	let ctx = ExtractContext::default();
	let plugin = CssExtractPlugin::new();

	// Not readable through the host, but never read either.
	let outcome = plugin.load(&ctx, &host, "assets/logo.svg").await.unwrap();

	assert_eq!(outcome, LoadOutcome::Deferred);
}

#[rstest]
#[tokio::test]
async fn test_concurrent_transforms_share_registry() {
	let ctx = ExtractContext::default();
	let host = std::sync::Arc::new(MemoryHost::default());

	let tasks: Vec<_> = (0..16)
		.map(|i| {
			let ctx = ctx.clone();
			let host = std::sync::Arc::clone(&host);
			tokio::spawn(async move {
				let code = format!("a = css`shared`; b = css`own-{}`;", i);
				let id = format!("src/m{}.ts", i);
				CssExtractPlugin::new().transform(&ctx, host.as_ref(), &code, &id)
			})
		})
		.collect();
	for task in tasks {
		assert!(!task.await.unwrap().is_unchanged());
	}

	assert_eq!(ctx.registry().len(), 17);
	assert_eq!(ctx.tracker().tracked_sources().len(), 16);
}

#[rstest]
#[tokio::test]
async fn test_jsx_prose_and_regex_do_not_hide_literals() {
	let notice = "const clean = (s) => s.replace(/`/g, '');\n\
		export const Notice = () => (\n\
		\t<p className={css`color: red;`}>Don't {clean(\"x\")}</p>\n\
		);\n\
		export const banner = css`color: blue;`;\n";
	let host = MemoryHost::with_modules(&[("src/notice.tsx", notice), ("src/main.css", MAIN_CSS)]);
	let ctx = ExtractContext::default();
	let plugin = CssExtractPlugin::new();

	let out = run_pass(&plugin, &ctx, &host, &["src/notice.tsx", "src/main.css"]).await;

	let text = out["src/notice.tsx"].replaced().unwrap();
	assert!(text.contains("<p className={\"css-34gjkj\"}>Don't"));
	assert!(!text.contains("css`"));
	assert_eq!(ctx.registry().len(), 2);
	let stylesheet = out["src/main.css"].replaced().unwrap();
	assert!(stylesheet.contains("color: red;"));
	assert!(stylesheet.contains("color: blue;"));
}

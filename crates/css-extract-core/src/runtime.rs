//! Fallback runtime module.
//!
//! Call sites the scanner cannot rewrite (for example a tag reached through a
//! re-export or called as a plain function) import the tag from the virtual
//! runtime module instead. The runtime computes the same class name at call
//! time; its rules are not registered, so they never reach the assembled
//! stylesheet.

use std::fmt::Display;

use crate::config::ExtractConfig;
use crate::hash;

/// Returns the JavaScript source of the virtual runtime module.
///
/// The exported function is named after the configured tag and uses the
/// configured class name prefix.
pub fn module_source(config: &ExtractConfig) -> String {
	// A JSON string is a valid JS string literal.
	let prefix = serde_json::to_string(&config.class_prefix)
		.unwrap_or_else(|_| "\"css-\"".to_string());

	format!(
		r#"export function {tag}(strings, ...values) {{
	let result = strings[0];
	for (let i = 0; i < values.length; i++) {{
		result += values[i] + strings[i + 1];
	}}
	const hash = Array.from(result.replace(/\s+/g, " ")).reduce(
		(s, c) => (Math.imul(31, s) + c.charCodeAt(0)) | 0,
		0
	);
	return {prefix} + Math.abs(hash).toString(36);
}}

export default {tag};
"#,
		tag = config.tag,
		prefix = prefix,
	)
}

/// Evaluates a tagged call the way the runtime module does.
///
/// Segments and values are interleaved (`strings[0] + values[0] +
/// strings[1] + ...`) and the result is hashed.
///
/// # Examples
///
/// ```rust
/// use css_extract_core::runtime::evaluate;
///
/// let class = evaluate("css-", &["width: ", "px;"], &[12]);
/// assert_eq!(class, css_extract_core::hash::class_name("css-", "width: 12px;"));
/// ```
pub fn evaluate<V: Display>(prefix: &str, strings: &[&str], values: &[V]) -> String {
	let mut result = strings.first().copied().unwrap_or_default().to_string();
	for (i, value) in values.iter().enumerate() {
		result.push_str(&value.to_string());
		result.push_str(strings.get(i + 1).copied().unwrap_or_default());
	}
	hash::class_name(prefix, &result)
}

//! Content hashing for generated class names.
//!
//! The hash is a 32-bit polynomial rolling hash over the whitespace-normalized
//! rule body. It must stay bit-compatible with the fallback runtime module
//! (see [`crate::runtime`]), which computes the same value in the browser, so
//! the arithmetic mirrors 32-bit JavaScript integer semantics exactly.

/// Collapses every whitespace run into a single space.
///
/// Whitespace is what a JavaScript `\s` matches: the Unicode `White_Space`
/// set without U+0085 (NEL), plus U+FEFF.
pub fn normalize(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	let mut in_space = false;
	for c in text.chars() {
		if is_js_whitespace(c) {
			if !in_space {
				out.push(' ');
				in_space = true;
			}
		} else {
			out.push(c);
			in_space = false;
		}
	}
	out
}

/// Hashes `text` into a short base-36 string.
///
/// # Examples
///
/// ```rust
/// use css_extract_core::hash::hash;
///
/// assert_eq!(hash("a"), "2p");
/// assert_eq!(hash("color:   red;"), hash("color: red;"));
/// ```
pub fn hash(text: &str) -> String {
	let acc = normalize(text).chars().fold(0i32, |acc, c| {
		// First UTF-16 unit of the code point: the high surrogate for astral chars.
		let mut units = [0u16; 2];
		let unit = c.encode_utf16(&mut units)[0];
		acc.wrapping_mul(31).wrapping_add(i32::from(unit))
	});
	to_base36(acc.unsigned_abs())
}

/// Builds a class name from a prefix and the hash of `text`.
pub fn class_name(prefix: &str, text: &str) -> String {
	format!("{}{}", prefix, hash(text))
}

fn is_js_whitespace(c: char) -> bool {
	(c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

fn to_base36(mut value: u32) -> String {
	const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

	if value == 0 {
		return "0".to_string();
	}
	let mut buf = Vec::with_capacity(7);
	while value > 0 {
		buf.push(DIGITS[(value % 36) as usize]);
		value /= 36;
	}
	buf.reverse();
	String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("", "0")]
	#[case("a", "2p")]
	#[case("ab", "2e9")]
	#[case("color: red;", "34gjkj")]
	#[case("display: flex;", "f0yu4a")]
	#[case("\n  color: red;\n", "clg9zh")]
	#[case("😀", "16pp")]
	fn test_known_vectors(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(hash(input), expected);
	}

	#[rstest]
	fn test_whitespace_runs_collapse() {
		assert_eq!(hash("color:  red;"), hash("color: red;"));
		assert_eq!(hash("color:\t\n red;"), hash("color: red;"));
		assert_eq!(hash(" color: red; "), hash("\n\tcolor: red;\r\n"));
	}

	#[rstest]
	fn test_leading_whitespace_is_significant() {
		// Runs collapse to one space but are not trimmed.
		assert_ne!(hash(" color: red;"), hash("color: red;"));
	}

	#[rstest]
	fn test_order_sensitive() {
		assert_ne!(hash("ab"), hash("ba"));
	}

	#[rstest]
	fn test_normalize() {
		assert_eq!(normalize("a \n\t b\u{feff}c"), "a b c");
		assert_eq!(normalize("   "), " ");
		assert_eq!(normalize(""), "");
	}

	#[rstest]
	#[case::no_break_space('\u{a0}', true)]
	#[case::line_separator('\u{2028}', true)]
	#[case::ideographic_space('\u{3000}', true)]
	#[case::byte_order_mark('\u{feff}', true)]
	#[case::next_line('\u{85}', false)]
	#[case::zero_width_space('\u{200b}', false)]
	fn test_js_whitespace_set(#[case] c: char, #[case] collapses: bool) {
		let text = format!("a{}b", c);

		assert_eq!(normalize(&text) == "a b", collapses);
		assert_eq!(hash(&text) == hash("a b"), collapses);
	}

	#[rstest]
	fn test_base36_extremes() {
		assert_eq!(to_base36(0), "0");
		assert_eq!(to_base36(35), "z");
		assert_eq!(to_base36(36), "10");
		// |i32::MIN| as produced by Math.abs in the runtime module.
		assert_eq!(to_base36(i32::MIN.unsigned_abs()), "zik0zk");
	}

	#[rstest]
	fn test_class_name() {
		assert_eq!(class_name("css-", "a"), "css-2p");
	}
}

//! Scanner for tagged template literals.
//!
//! Modules are parsed with `oxc_parser`, and every tagged template whose tag
//! is the configured keyword, written directly before the opening backtick,
//! becomes a [`LiteralSpan`]. Comments, strings, regular expressions and JSX
//! text never produce a match because they are not tagged templates in the
//! syntax tree. Bodies are the raw source text between the backticks, with
//! `${...}` interpolations kept verbatim.
//!
//! A module that does not parse (an edit in progress, say) is scanned
//! lexically instead:
//!
//! 1. [`lex`] splits the text into code, comment, quoted-string, regular
//!    expression and template regions.
//! 2. The template regions whose opening backtick directly follows the tag
//!    keyword in code are kept.
//!
//! The lexical pass matches templates without depth tracking: a template ends
//! at the next backtick. It is also the only pass that reports
//! [`ScanState::Unterminated`].

use std::ops::Range;

use oxc_allocator::Allocator;
use oxc_ast::ast::{Expression, TaggedTemplateExpression};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Kind of a lexical region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
	/// Ordinary code.
	Code,
	/// `// ...` or `/* ... */`.
	Comment,
	/// `'...'` or `"..."`; ends at the closing quote or the end of the line.
	Quoted,
	/// `/.../flags` in a position where an expression may start.
	Regex,
	/// Backtick-delimited template.
	Template {
		/// Whether a closing backtick was found.
		terminated: bool,
	},
}

/// A contiguous byte range of the module text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
	/// Region kind.
	pub kind: RegionKind,
	/// Byte range in the source text.
	pub range: Range<usize>,
}

/// One tagged literal occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralSpan {
	/// Whole occurrence: tag, backticks and body.
	pub range: Range<usize>,
	/// Text between the backticks.
	pub body: Range<usize>,
}

impl LiteralSpan {
	/// Returns the raw body text of this literal.
	pub fn body<'a>(&self, source: &'a str) -> &'a str {
		&source[self.body.clone()]
	}
}

/// How scanning ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
	/// The whole text was scanned.
	Complete,
	/// A literal opened at `offset` is never closed; nothing after it was scanned.
	Unterminated {
		/// Byte offset of the tag that opened the literal.
		offset: usize,
	},
}

/// Result of scanning one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
	/// Closed literals, left to right.
	pub literals: Vec<LiteralSpan>,
	/// Terminal state of the scan.
	pub state: ScanState,
}

/// Finds `tag` literals in module text.
#[derive(Debug, Clone)]
pub struct Scanner<'t> {
	tag: &'t str,
	source_type: SourceType,
}

impl<'t> Scanner<'t> {
	/// Creates a scanner for the given tag keyword.
	///
	/// Text is parsed as TSX, the most permissive dialect.
	pub fn new(tag: &'t str) -> Self {
		Self {
			tag,
			source_type: SourceType::tsx(),
		}
	}

	/// Creates a scanner whose dialect follows the extension of `module_id`.
	///
	/// Ids without a known script extension are parsed as TSX.
	pub fn for_module(tag: &'t str, module_id: &str) -> Self {
		let source_type = SourceType::from_path(module_id).unwrap_or_else(|_| SourceType::tsx());
		Self { tag, source_type }
	}

	/// Scans `source` for tagged literals outside comments and strings.
	///
	/// # Examples
	///
	/// ```rust
	/// use css_extract_core::scanner::{ScanState, Scanner};
	///
	/// let source = "// css`ignored`\nconst a = css`color: red;`;";
	/// let report = Scanner::new("css").scan(source);
	///
	/// assert_eq!(report.literals.len(), 1);
	/// assert_eq!(report.literals[0].body(source), "color: red;");
	/// assert_eq!(report.state, ScanState::Complete);
	/// ```
	pub fn scan(&self, source: &str) -> ScanReport {
		let allocator = Allocator::default();
		let parsed = Parser::new(&allocator, source, self.source_type).parse();
		if parsed.panicked || !parsed.errors.is_empty() {
			tracing::debug!(
				errors = parsed.errors.len(),
				"Module did not parse, scanning lexically"
			);
			return self.scan_lexical(source);
		}

		let mut finder = LiteralFinder {
			tag: self.tag,
			bytes: source.as_bytes(),
			literals: Vec::new(),
		};
		finder.visit_program(&parsed.program);
		finder.literals.sort_by_key(|span| span.range.start);

		ScanReport {
			literals: finder.literals,
			state: ScanState::Complete,
		}
	}

	/// Returns `source` with every comment removed.
	pub fn strip_comments(source: &str) -> String {
		lex(source)
			.into_iter()
			.filter(|region| region.kind != RegionKind::Comment)
			.map(|region| &source[region.range])
			.collect()
	}

	fn scan_lexical(&self, source: &str) -> ScanReport {
		let bytes = source.as_bytes();
		let regions = lex(source);
		let mut literals = Vec::new();

		for (index, region) in regions.iter().enumerate() {
			let RegionKind::Template { terminated } = region.kind else {
				continue;
			};
			let Some(tag_start) = self.tag_before(&regions[..index], bytes, region.range.start)
			else {
				continue;
			};
			if !terminated {
				return ScanReport {
					literals,
					state: ScanState::Unterminated { offset: tag_start },
				};
			}
			literals.push(LiteralSpan {
				range: tag_start..region.range.end,
				body: region.range.start + 1..region.range.end - 1,
			});
		}

		ScanReport {
			literals,
			state: ScanState::Complete,
		}
	}

	fn tag_before(&self, preceding: &[Region], bytes: &[u8], open: usize) -> Option<usize> {
		let code = preceding.last()?;
		if code.kind != RegionKind::Code || code.range.end != open {
			return None;
		}
		let tag_start = open.checked_sub(self.tag.len())?;
		if tag_start < code.range.start || &bytes[tag_start..open] != self.tag.as_bytes() {
			return None;
		}
		if tag_start > 0 && is_identifier_byte(bytes[tag_start - 1]) {
			return None;
		}
		Some(tag_start)
	}
}

/// Collects tag literals from a parsed module.
struct LiteralFinder<'s> {
	tag: &'s str,
	bytes: &'s [u8],
	literals: Vec<LiteralSpan>,
}

impl LiteralFinder<'_> {
	/// Span of the tag keyword, for `css` and `anything.css` tags.
	fn tag_span(&self, tag: &Expression<'_>) -> Option<Range<usize>> {
		let (name, span) = match tag {
			Expression::Identifier(ident) => (ident.name.as_str(), ident.span),
			Expression::StaticMemberExpression(member) => {
				(member.property.name.as_str(), member.property.span)
			}
			_ => return None,
		};
		(name == self.tag).then(|| span.start as usize..span.end as usize)
	}
}

impl<'a> Visit<'a> for LiteralFinder<'_> {
	fn visit_tagged_template_expression(&mut self, it: &TaggedTemplateExpression<'a>) {
		let open = it.quasi.span.start as usize;
		let end = it.quasi.span.end as usize;
		let matched = self.tag_span(&it.tag).filter(|tag| {
			tag.end == open && self.bytes.get(open) == Some(&b'`') && end > open + 1
		});

		match matched {
			Some(tag) => self.literals.push(LiteralSpan {
				range: tag.start..end,
				body: open + 1..end - 1,
			}),
			None => walk::walk_tagged_template_expression(self, it),
		}
	}
}

/// Splits `source` into lexical regions covering the whole text.
pub fn lex(source: &str) -> Vec<Region> {
	let bytes = source.as_bytes();
	let len = bytes.len();
	let mut regions = Vec::new();
	let mut code_start = 0;
	let mut last_code = None;
	let mut i = 0;

	while i < len {
		let region = match bytes[i] {
			b'/' if bytes.get(i + 1) == Some(&b'/') => {
				let end = find_byte(bytes, i + 2, b'\n').unwrap_or(len);
				Some((RegionKind::Comment, end))
			}
			b'/' if bytes.get(i + 1) == Some(&b'*') => {
				let end = find_seq(bytes, i + 2, b"*/").map_or(len, |at| at + 2);
				Some((RegionKind::Comment, end))
			}
			b'/' if regex_allowed(bytes, last_code) => {
				regex_end(bytes, i + 1).map(|end| (RegionKind::Regex, end))
			}
			quote @ (b'\'' | b'"') if !follows_word(bytes, i) => {
				Some((RegionKind::Quoted, quoted_end(bytes, i + 1, quote)))
			}
			b'`' => Some(match find_byte(bytes, i + 1, b'`') {
				Some(close) => (RegionKind::Template { terminated: true }, close + 1),
				None => (RegionKind::Template { terminated: false }, len),
			}),
			_ => None,
		};

		let Some((kind, end)) = region else {
			if !bytes[i].is_ascii_whitespace() {
				last_code = Some(i);
			}
			i += 1;
			continue;
		};

		if code_start < i {
			regions.push(Region {
				kind: RegionKind::Code,
				range: code_start..i,
			});
		}
		regions.push(Region { kind, range: i..end });
		if kind != RegionKind::Comment {
			last_code = Some(end - 1);
		}
		i = end;
		code_start = end;
	}

	if code_start < len {
		regions.push(Region {
			kind: RegionKind::Code,
			range: code_start..len,
		});
	}
	regions
}

/// Keywords after which an expression, and so a regex or string, may start.
const EXPRESSION_KEYWORDS: &[&[u8]] = &[
	b"await",
	b"case",
	b"delete",
	b"do",
	b"else",
	b"from",
	b"import",
	b"in",
	b"instanceof",
	b"new",
	b"of",
	b"return",
	b"throw",
	b"typeof",
	b"void",
	b"yield",
];

// `<` and `}` are left out: in JSX they precede `/` of closing tags.
fn regex_allowed(bytes: &[u8], last_code: Option<usize>) -> bool {
	let Some(at) = last_code else {
		return true;
	};
	match bytes[at] {
		b'(' | b',' | b'=' | b':' | b'[' | b'!' | b'&' | b'|' | b'?' | b'{' | b';' | b'+'
		| b'-' | b'*' | b'%' | b'~' | b'^' | b'>' => true,
		b if is_identifier_byte(b) => ends_with_keyword(bytes, at),
		_ => false,
	}
}

fn regex_end(bytes: &[u8], mut j: usize) -> Option<usize> {
	let mut in_class = false;
	while j < bytes.len() {
		match bytes[j] {
			b'\\' => j += 2,
			b'\n' => return None,
			b'[' => {
				in_class = true;
				j += 1;
			}
			b']' => {
				in_class = false;
				j += 1;
			}
			b'/' if !in_class => {
				j += 1;
				while j < bytes.len() && bytes[j].is_ascii_alphabetic() {
					j += 1;
				}
				return Some(j);
			}
			_ => j += 1,
		}
	}
	None
}

// A quote glued to a word is prose, as in JSX text like `Don't`.
fn follows_word(bytes: &[u8], at: usize) -> bool {
	at > 0 && is_identifier_byte(bytes[at - 1]) && !ends_with_keyword(bytes, at - 1)
}

fn ends_with_keyword(bytes: &[u8], last: usize) -> bool {
	let end = last + 1;
	let start = bytes[..end]
		.iter()
		.rposition(|&b| !is_identifier_byte(b))
		.map_or(0, |at| at + 1);
	EXPRESSION_KEYWORDS.contains(&&bytes[start..end])
}

fn quoted_end(bytes: &[u8], mut j: usize, quote: u8) -> usize {
	while j < bytes.len() {
		match bytes[j] {
			b'\\' => j += 2,
			b'\n' => return j,
			b if b == quote => return j + 1,
			_ => j += 1,
		}
	}
	bytes.len()
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
	bytes
		.get(from..)?
		.iter()
		.position(|&b| b == needle)
		.map(|at| from + at)
}

fn find_seq(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
	bytes
		.get(from..)?
		.windows(needle.len())
		.position(|window| window == needle)
		.map(|at| from + at)
}

// Non-ASCII bytes count as identifier bytes: JS identifiers may contain them.
fn is_identifier_byte(b: u8) -> bool {
	b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

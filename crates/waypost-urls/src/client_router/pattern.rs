//! Route template compilation.
//!
//! A template is a path made of literal text and capture tokens:
//!
//! - `:name` captures exactly one path segment (one or more characters, no `/`)
//! - `*name` captures one or more characters of any kind, including `/`,
//!   matching as few characters as possible
//!
//! Names follow `[A-Za-z][A-Za-z0-9_-]*`. A `:` or `*` that is not followed by
//! a letter is literal text. The empty template is the root, `/`.
//!
//! # Wildcard Behavior
//!
//! Wildcards are lazy, so in `/user/*id/:name` the wildcard stops before the
//! last segment: `/user/a/b/c/42` captures `id = "a/b/c"` and `name = "42"`.
//!
//! **Security warning:** a wildcard value may contain `..` segments. Callers
//! that use it for file system access must validate it first.

use super::error::PatternError;
use regex::Regex;

/// Maximum allowed size for a compiled template regex (in bytes).
const MAX_TEMPLATE_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// Regex fragment for a single-segment capture.
const SEGMENT_CAPTURE: &str = "([^/]+)";

/// Regex fragment for a multi-segment capture.
const WILDCARD_CAPTURE: &str = "(.+?)";

/// How a template token captures path text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureKind {
	/// `:name`, one path segment.
	Segment,
	/// `*name`, one or more characters across segments.
	Wildcard,
}

impl CaptureKind {
	fn sigil(self) -> char {
		match self {
			Self::Segment => ':',
			Self::Wildcard => '*',
		}
	}

	fn from_sigil(c: char) -> Option<Self> {
		match c {
			':' => Some(Self::Segment),
			'*' => Some(Self::Wildcard),
			_ => None,
		}
	}
}

/// One entry of a template's parameter table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSlot {
	name: String,
	kind: CaptureKind,
	index: usize,
}

impl ParamSlot {
	/// The parameter name, without its sigil.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// How the parameter captures path text.
	pub fn kind(&self) -> CaptureKind {
		self.kind
	}

	/// Zero-based position among the template's capture groups.
	pub fn index(&self) -> usize {
		self.index
	}
}

/// A piece of a parsed template, used when building URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TemplatePart {
	Literal(String),
	/// Index into the parameter table.
	Capture(usize),
}

/// A compiled, anchored route template.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
	template: String,
	regex: Regex,
	params: Vec<ParamSlot>,
	parts: Vec<TemplatePart>,
}

impl CompiledPattern {
	/// Compiles a template into an anchored matcher.
	///
	/// # Errors
	///
	/// Returns [`PatternError::DuplicateParam`] when two tokens share a name.
	/// Returns [`PatternError::InvalidRegex`] if the regex engine rejects the
	/// generated expression (e.g. it exceeds the size limit).
	///
	/// # Examples
	///
	/// ```
	/// use waypost_urls::client_router::CompiledPattern;
	///
	/// let pattern = CompiledPattern::compile("/home/:id").unwrap();
	/// assert!(pattern.is_match("/home/42"));
	/// assert!(!pattern.is_match("/home/42/x"));
	/// ```
	pub fn compile(template: &str) -> Result<Self, PatternError> {
		// An empty URL path resolves as `/`, so the empty template means the root
		let template = if template.is_empty() { "/" } else { template };
		let (parts, params) = parse_template(template)?;
		let regex_str = build_regex(template, &parts, &params);

		let regex = regex::RegexBuilder::new(&regex_str)
			.size_limit(MAX_TEMPLATE_REGEX_SIZE)
			.build()
			.map_err(|e| PatternError::InvalidRegex {
				template: template.to_string(),
				message: e.to_string(),
			})?;

		tracing::trace!(template, regex = %regex_str, params = params.len(), "compiled route template");

		Ok(Self {
			template: template.to_string(),
			regex,
			params,
			parts,
		})
	}

	/// Returns the original template string.
	pub fn template(&self) -> &str {
		&self.template
	}

	/// Returns the parameter table in capture-group order.
	pub fn param_order(&self) -> &[ParamSlot] {
		&self.params
	}

	/// Returns the generated regular expression.
	pub fn as_regex_str(&self) -> &str {
		self.regex.as_str()
	}

	/// Returns whether the template has no capture tokens.
	pub fn is_exact(&self) -> bool {
		self.params.is_empty()
	}

	/// Checks whether the whole path matches this template.
	pub fn is_match(&self, path: &str) -> bool {
		self.regex.is_match(path)
	}

	/// Matches the whole path and returns each parameter with its raw
	/// captured text, in capture-group order.
	pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<(&ParamSlot, &'p str)>> {
		let caps = self.regex.captures(path)?;
		Some(
			self.params
				.iter()
				.filter_map(|slot| caps.get(slot.index + 1).map(|m| (slot, m.as_str())))
				.collect(),
		)
	}

	pub(crate) fn parts(&self) -> &[TemplatePart] {
		&self.parts
	}
}

impl PartialEq for CompiledPattern {
	fn eq(&self, other: &Self) -> bool {
		self.template == other.template
	}
}

impl Eq for CompiledPattern {}

impl std::fmt::Display for CompiledPattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.template)
	}
}

fn is_ident_start(c: char) -> bool {
	c.is_ascii_alphabetic()
}

fn is_ident_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Splits a template into literal text and capture tokens.
fn parse_template(template: &str) -> Result<(Vec<TemplatePart>, Vec<ParamSlot>), PatternError> {
	let mut parts = Vec::new();
	let mut params: Vec<ParamSlot> = Vec::new();
	let mut literal = String::new();
	let mut chars = template.chars().peekable();

	while let Some(c) = chars.next() {
		let kind = match CaptureKind::from_sigil(c) {
			Some(kind) if chars.peek().copied().is_some_and(is_ident_start) => kind,
			_ => {
				literal.push(c);
				continue;
			}
		};

		let mut name = String::new();
		while let Some(&next) = chars.peek() {
			if !is_ident_char(next) {
				break;
			}
			name.push(next);
			chars.next();
		}

		if params.iter().any(|p| p.name == name) {
			return Err(PatternError::DuplicateParam {
				template: template.to_string(),
				name,
			});
		}

		if !literal.is_empty() {
			parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
		}
		parts.push(TemplatePart::Capture(params.len()));
		params.push(ParamSlot {
			name,
			kind,
			index: params.len(),
		});
	}

	if !literal.is_empty() {
		parts.push(TemplatePart::Literal(literal));
	}

	Ok((parts, params))
}

fn build_regex(template: &str, parts: &[TemplatePart], params: &[ParamSlot]) -> String {
	let mut regex_str = String::with_capacity(template.len() * 2 + 2);
	regex_str.push('^');

	for part in parts {
		match part {
			TemplatePart::Literal(text) => {
				// Path separators are escaped explicitly, the rest via regex::escape
				let mut segments = text.split('/');
				if let Some(first) = segments.next() {
					regex_str.push_str(&regex::escape(first));
				}
				for segment in segments {
					regex_str.push_str("\\/");
					regex_str.push_str(&regex::escape(segment));
				}
			}
			TemplatePart::Capture(index) => match params[*index].kind {
				CaptureKind::Segment => regex_str.push_str(SEGMENT_CAPTURE),
				CaptureKind::Wildcard => regex_str.push_str(WILDCARD_CAPTURE),
			},
		}
	}

	regex_str.push('$');
	regex_str
}

/// Renders a token back to template syntax, e.g. `:id`.
pub(crate) fn token_text(slot: &ParamSlot) -> String {
	format!("{}{}", slot.kind.sigil(), slot.name)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_exact_pattern() {
		let pattern = CompiledPattern::compile("/users/").unwrap();
		assert!(pattern.is_exact());
		assert!(pattern.is_match("/users/"));
		assert!(!pattern.is_match("/users/123/"));
		assert!(!pattern.is_match("/users"));
	}

	#[rstest]
	fn test_generated_regex() {
		let home = CompiledPattern::compile("/home/:id").unwrap();
		let test = CompiledPattern::compile("/test/:id/:name").unwrap();

		assert_eq!(home.as_regex_str(), r"^\/home\/([^/]+)$");
		assert_eq!(test.as_regex_str(), r"^\/test\/([^/]+)\/([^/]+)$");
	}

	#[rstest]
	fn test_single_param() {
		let pattern = CompiledPattern::compile("/home/:id").unwrap();

		let caps = pattern.captures("/home/42").unwrap();
		assert_eq!(caps.len(), 1);
		assert_eq!(caps[0].0.name(), "id");
		assert_eq!(caps[0].1, "42");
		assert!(pattern.captures("/home/42/x").is_none());
	}

	#[rstest]
	fn test_wildcard_is_lazy() {
		let pattern = CompiledPattern::compile("/user/*id/:name").unwrap();

		let caps = pattern.captures("/user/a/b/c/42").unwrap();
		assert_eq!(caps[0].0.name(), "id");
		assert_eq!(caps[0].0.kind(), CaptureKind::Wildcard);
		assert_eq!(caps[0].1, "a/b/c");
		assert_eq!(caps[1].0.name(), "name");
		assert_eq!(caps[1].1, "42");
	}

	#[rstest]
	fn test_trailing_wildcard_takes_rest() {
		let pattern = CompiledPattern::compile("/static/*path").unwrap();

		let caps = pattern.captures("/static/css/styles/main.css").unwrap();
		assert_eq!(caps[0].1, "css/styles/main.css");
		assert!(!pattern.is_match("/static/"));
	}

	#[rstest]
	fn test_param_order() {
		let pattern = CompiledPattern::compile("/a/:x/b/*y/c/:z").unwrap();
		let order: Vec<(&str, CaptureKind, usize)> = pattern
			.param_order()
			.iter()
			.map(|p| (p.name(), p.kind(), p.index()))
			.collect();

		assert_eq!(
			order,
			vec![
				("x", CaptureKind::Segment, 0),
				("y", CaptureKind::Wildcard, 1),
				("z", CaptureKind::Segment, 2),
			]
		);
	}

	#[rstest]
	#[case("/api/v1.0/", "/api/v1.0/", true)]
	#[case("/api/v1.0/", "/api/v1X0/", false)]
	#[case("/a+b/(c)", "/a+b/(c)", true)]
	#[case("/price/$:amount", "/price/$10", true)]
	fn test_special_chars_escaped(#[case] template: &str, #[case] path: &str, #[case] expected: bool) {
		let pattern = CompiledPattern::compile(template).unwrap();
		assert_eq!(pattern.is_match(path), expected);
	}

	#[rstest]
	fn test_token_inside_segment() {
		let pattern = CompiledPattern::compile("/files/:name.txt").unwrap();

		let caps = pattern.captures("/files/report.txt").unwrap();
		assert_eq!(caps[0].1, "report");
	}

	#[rstest]
	#[case("/a/:1")]
	#[case("/a/:")]
	#[case("/a/*")]
	#[case("/a/:_x")]
	fn test_sigil_without_identifier_is_literal(#[case] template: &str) {
		let pattern = CompiledPattern::compile(template).unwrap();
		assert!(pattern.is_exact());
		assert!(pattern.is_match(template));
	}

	#[rstest]
	fn test_identifier_grammar() {
		let pattern = CompiledPattern::compile("/a/:user-id_2/rest").unwrap();
		assert_eq!(pattern.param_order()[0].name(), "user-id_2");
		assert!(pattern.is_match("/a/7/rest"));
	}

	#[rstest]
	fn test_duplicate_param_rejected() {
		// Act
		let result = CompiledPattern::compile("/a/:id/b/*id");

		// Assert
		assert_eq!(
			result.unwrap_err(),
			PatternError::DuplicateParam {
				template: "/a/:id/b/*id".to_string(),
				name: "id".to_string(),
			}
		);
	}

	#[rstest]
	fn test_empty_template_is_root() {
		let pattern = CompiledPattern::compile("").unwrap();

		assert_eq!(pattern.template(), "/");
		assert_eq!(pattern.as_regex_str(), r"^\/$");
		assert!(pattern.is_match("/"));
		assert!(!pattern.is_match("/x"));
	}

	#[rstest]
	fn test_token_text() {
		let pattern = CompiledPattern::compile("/x/:a/*b").unwrap();
		let tokens: Vec<String> = pattern.param_order().iter().map(token_text).collect();
		assert_eq!(tokens, vec![":a", "*b"]);
	}

	#[rstest]
	fn test_pattern_display_and_equality() {
		let p1 = CompiledPattern::compile("/users/:id").unwrap();
		let p2 = CompiledPattern::compile("/users/:id").unwrap();
		let p3 = CompiledPattern::compile("/users/:user_id").unwrap();

		assert_eq!(format!("{}", p1), "/users/:id");
		assert_eq!(p1, p2);
		assert_ne!(p1, p3);
	}
}

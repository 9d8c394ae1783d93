//! Nested query-string codec.
//!
//! Nested parameters are flattened into dotted keys:
//! `{a: {b: {r: 2}, c: 1}}` encodes as `a.b.r=2&a.c=1`, and array elements use
//! their decimal index, so `a.0.c=1&a.1.c=3` decodes to
//! `{a: [{c: "1"}, {c: "3"}]}`.
//!
//! A literal `.` inside a key is written as `\.` (and a literal `\` as `\\`),
//! so such keys survive a round trip. Values escape `\` the same way, and
//! decoding removes any backslash escape from a value. Decoded scalars are
//! always strings.

use super::error::QueryError;
use super::params::{ParamMap, ParamTree, Scalar};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use std::borrow::Cow;

/// Characters left unescaped in keys and values, as in `encodeURIComponent`.
pub(crate) const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'_')
	.remove(b'.')
	.remove(b'!')
	.remove(b'~')
	.remove(b'*')
	.remove(b'\'')
	.remove(b'(')
	.remove(b')');

/// Largest key segment treated as an array index when decoding.
///
/// Larger numeric segments create object keys instead, so a hostile query
/// cannot force a huge allocation.
pub const MAX_ARRAY_INDEX: usize = 1024;

/// A flattened `(dotted key, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatParam {
	/// Dotted key, with literal dots escaped as `\.`.
	pub key: String,
	/// Scalar value rendered as text, with literal backslashes escaped as `\\`.
	pub value: String,
}

impl FlatParam {
	/// Creates a new pair.
	pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			value: value.into(),
		}
	}
}

/// Flattens a parameter mapping into dotted pairs, in traversal order.
///
/// Null scalars and empty containers produce no pairs.
///
/// # Errors
///
/// Returns [`QueryError::NonFiniteNumber`] for NaN or infinite floats.
pub fn flatten(params: &ParamMap) -> Result<Vec<FlatParam>, QueryError> {
	let mut out = Vec::new();
	for (key, value) in params {
		flatten_into(&escape_key_segment(key), value, &mut out)?;
	}
	Ok(out)
}

fn flatten_into(key: &str, tree: &ParamTree, out: &mut Vec<FlatParam>) -> Result<(), QueryError> {
	match tree {
		ParamTree::Scalar(Scalar::Float(n)) if !n.is_finite() => {
			return Err(QueryError::NonFiniteNumber {
				key: key.to_string(),
			});
		}
		ParamTree::Scalar(scalar) => {
			if let Some(value) = scalar.to_url_string() {
				out.push(FlatParam::new(key, escape_value(&value)));
			}
		}
		ParamTree::Array(items) => {
			for (index, item) in items.iter().enumerate() {
				flatten_into(&format!("{}.{}", key, index), item, out)?;
			}
		}
		ParamTree::Object(map) => {
			for (child_key, child) in map {
				flatten_into(&format!("{}.{}", key, escape_key_segment(child_key)), child, out)?;
			}
		}
	}
	Ok(())
}

/// Encodes a parameter mapping as a query string, without the leading `?`.
///
/// Keys and values are percent-encoded independently. A pair whose value is
/// the empty string is emitted as the bare key.
///
/// # Errors
///
/// Returns [`QueryError::NonFiniteNumber`] for NaN or infinite floats.
///
/// # Examples
///
/// ```
/// use waypost_urls::client_router::{ParamTree, encode};
/// use serde_json::json;
///
/// let params = match ParamTree::from(json!({"a": {"b": {"r": 2}, "c": 1}})) {
///     ParamTree::Object(map) => map,
///     _ => unreachable!(),
/// };
/// assert_eq!(encode(&params).unwrap(), "a.b.r=2&a.c=1");
/// ```
pub fn encode(params: &ParamMap) -> Result<String, QueryError> {
	let pairs = flatten(params)?;
	Ok(encode_pairs(&pairs))
}

/// Joins already flattened pairs into a query string.
pub fn encode_pairs(pairs: &[FlatParam]) -> String {
	let mut query = String::new();
	for pair in pairs {
		if !query.is_empty() {
			query.push('&');
		}
		query.extend(utf8_percent_encode(&pair.key, COMPONENT));
		if !pair.value.is_empty() {
			query.push('=');
			query.extend(utf8_percent_encode(&pair.value, COMPONENT));
		}
	}
	query
}

/// Decodes a query string into a parameter mapping.
///
/// A leading `?` is ignored. Pairs split on the first `=`; a missing value is
/// the empty string. Segments that do not percent-decode to UTF-8 are kept
/// as written. Decoding never fails.
///
/// # Examples
///
/// ```
/// use waypost_urls::client_router::decode;
///
/// let params = decode("a.0.c=1&a.1.c=3");
/// let first = params["a"].get("0").and_then(|o| o.get("c"));
/// assert_eq!(first.and_then(|v| v.as_str()), Some("1"));
/// ```
pub fn decode(query: &str) -> ParamMap {
	let query = query.strip_prefix('?').unwrap_or(query);
	let pairs = query.split('&').filter(|pair| !pair.is_empty()).map(|pair| {
		let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
		FlatParam::new(decode_component(key), decode_component(value))
	});
	unflatten(pairs)
}

/// Rebuilds a parameter mapping from dotted pairs.
///
/// Later pairs overwrite earlier ones at the same key.
pub fn unflatten<I>(pairs: I) -> ParamMap
where
	I: IntoIterator<Item = FlatParam>,
{
	let mut root = ParamTree::Object(ParamMap::new());

	for FlatParam { key, value } in pairs {
		let mut segments = split_key(&key);
		let last = segments.pop().unwrap_or_default();
		// Empty intermediate segments (`a..b`) are skipped
		segments.retain(|segment| !segment.is_empty());
		segments.push(last);

		tracing::trace!(key = %key, depth = segments.len(), "decoded query pair");
		insert_path(&mut root, &segments, unescape_value(value));
	}

	match root {
		ParamTree::Object(map) => map,
		_ => ParamMap::new(),
	}
}

/// Percent-decodes a URL component, keeping it as written if the bytes are
/// not UTF-8.
pub(crate) fn decode_component(raw: &str) -> String {
	match percent_decode_str(raw).decode_utf8() {
		Ok(decoded) => decoded.into_owned(),
		Err(e) => {
			tracing::warn!(segment = raw, error = %e, "url segment is not valid UTF-8, keeping it literally");
			raw.to_string()
		}
	}
}

fn escape_value(value: &str) -> Cow<'_, str> {
	if value.contains('\\') {
		Cow::Owned(value.replace('\\', "\\\\"))
	} else {
		Cow::Borrowed(value)
	}
}

/// Removes backslash escapes: `\x` becomes `x`, a trailing `\` is kept.
fn unescape_value(value: String) -> String {
	if !value.contains('\\') {
		return value;
	}

	let mut unescaped = String::with_capacity(value.len());
	let mut chars = value.chars();
	while let Some(c) = chars.next() {
		match c {
			'\\' => unescaped.push(chars.next().unwrap_or('\\')),
			_ => unescaped.push(c),
		}
	}
	unescaped
}

/// Escapes `\` and `.` in a single key segment.
pub(crate) fn escape_key_segment(segment: &str) -> Cow<'_, str> {
	if !segment.contains(['.', '\\']) {
		return Cow::Borrowed(segment);
	}

	let mut escaped = String::with_capacity(segment.len() + 2);
	for c in segment.chars() {
		if c == '.' || c == '\\' {
			escaped.push('\\');
		}
		escaped.push(c);
	}
	Cow::Owned(escaped)
}

/// Splits a dotted key on unescaped dots, removing the escapes.
pub(crate) fn split_key(key: &str) -> Vec<String> {
	let mut segments = Vec::new();
	let mut current = String::new();
	let mut chars = key.chars();

	while let Some(c) = chars.next() {
		match c {
			'\\' => current.push(chars.next().unwrap_or('\\')),
			'.' => segments.push(std::mem::take(&mut current)),
			_ => current.push(c),
		}
	}
	segments.push(current);
	segments
}

/// Parses a canonical decimal array index (`0`, `7`, `12`; never `07`).
fn array_index(segment: &str) -> Option<usize> {
	let canonical = !segment.is_empty()
		&& segment.bytes().all(|b| b.is_ascii_digit())
		&& (segment == "0" || !segment.starts_with('0'));
	if !canonical {
		return None;
	}
	segment.parse::<usize>().ok().filter(|&i| i <= MAX_ARRAY_INDEX)
}

fn insert_path(node: &mut ParamTree, path: &[String], value: String) {
	match path {
		[] => {}
		[last] => *slot(node, last) = ParamTree::string(value),
		[head, rest @ ..] => {
			let child = slot(node, head);
			if child.as_scalar().is_some() {
				*child = if array_index(&rest[0]).is_some() {
					ParamTree::Array(Vec::new())
				} else {
					ParamTree::Object(ParamMap::new())
				};
			}
			insert_path(child, rest, value);
		}
	}
}

/// Returns the child of `node` at `key`, creating a null placeholder.
///
/// Scalars are replaced by an object, and an array addressed by a
/// non-index key becomes an object keyed by its indices.
fn slot<'a>(node: &'a mut ParamTree, key: &str) -> &'a mut ParamTree {
	let index = array_index(key);
	let reshape = match node {
		ParamTree::Array(_) => index.is_none(),
		ParamTree::Object(_) => false,
		ParamTree::Scalar(_) => true,
	};
	if reshape {
		let map = match std::mem::take(node) {
			ParamTree::Array(items) => items
				.into_iter()
				.enumerate()
				.map(|(i, item)| (i.to_string(), item))
				.collect(),
			_ => ParamMap::new(),
		};
		*node = ParamTree::Object(map);
	}

	match (node, index) {
		(ParamTree::Array(items), Some(i)) => {
			if items.len() <= i {
				items.resize(i + 1, ParamTree::NULL);
			}
			&mut items[i]
		}
		(ParamTree::Object(map), _) => map.entry(key.to_string()).or_insert(ParamTree::NULL),
		(other, _) => other,
	}
}

//! Structured route parameters.
//!
//! Path captures and query-string values share one representation,
//! [`ParamTree`]: a scalar, an array, or an object. Route parameters as a
//! whole are a [`ParamMap`], the root object.

use super::error::ParamError;
use indexmap::IndexMap;
use std::str::FromStr;

/// Root parameter mapping, keyed by parameter name.
///
/// Equality ignores key order.
pub type ParamMap = IndexMap<String, ParamTree>;

/// A scalar parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
	/// Absent value. Omitted when encoding.
	Null,
	/// Boolean, rendered as `true`/`false`.
	Bool(bool),
	/// Signed integer.
	Int(i64),
	/// Unsigned integer too large for [`Scalar::Int`].
	UInt(u64),
	/// Floating point number. Must be finite to be encoded.
	Float(f64),
	/// Text.
	String(String),
}

impl Scalar {
	/// Renders the scalar as it appears in a URL.
	///
	/// Returns `None` for [`Scalar::Null`].
	pub fn to_url_string(&self) -> Option<String> {
		match self {
			Self::Null => None,
			Self::Bool(b) => Some(b.to_string()),
			Self::Int(n) => Some(n.to_string()),
			Self::UInt(n) => Some(n.to_string()),
			Self::Float(n) => Some(n.to_string()),
			Self::String(s) => Some(s.clone()),
		}
	}

	/// Returns whether the scalar is [`Scalar::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}
}

/// A recursive parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamTree {
	/// A single value.
	Scalar(Scalar),
	/// An ordered sequence, addressed by decimal index in dotted keys.
	Array(Vec<ParamTree>),
	/// A mapping from key to value.
	Object(ParamMap),
}

impl ParamTree {
	/// The null scalar.
	pub const NULL: ParamTree = ParamTree::Scalar(Scalar::Null);

	/// Creates a string scalar.
	pub fn string(value: impl Into<String>) -> Self {
		Self::Scalar(Scalar::String(value.into()))
	}

	/// Returns the string slice if this is a string scalar.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Scalar(Scalar::String(s)) => Some(s),
			_ => None,
		}
	}

	/// Returns the scalar if this is not a container.
	pub fn as_scalar(&self) -> Option<&Scalar> {
		match self {
			Self::Scalar(s) => Some(s),
			_ => None,
		}
	}

	/// Returns the elements if this is an array.
	pub fn as_array(&self) -> Option<&[ParamTree]> {
		match self {
			Self::Array(items) => Some(items),
			_ => None,
		}
	}

	/// Returns the mapping if this is an object.
	pub fn as_object(&self) -> Option<&ParamMap> {
		match self {
			Self::Object(map) => Some(map),
			_ => None,
		}
	}

	/// Returns whether this is the null scalar.
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Scalar(Scalar::Null))
	}

	/// Looks up a child by object key or decimal array index.
	pub fn get(&self, key: &str) -> Option<&ParamTree> {
		match self {
			Self::Object(map) => map.get(key),
			Self::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
			Self::Scalar(_) => None,
		}
	}

	/// Parses a scalar value into `T`.
	///
	/// `name` is only used for error reporting.
	///
	/// # Errors
	///
	/// Returns [`ParamError::Missing`] for null, [`ParamError::NotScalar`] for
	/// containers and [`ParamError::Parse`] when `T::from_str` fails.
	///
	/// # Examples
	///
	/// ```
	/// use waypost_urls::client_router::ParamTree;
	///
	/// let id = ParamTree::string("42");
	/// assert_eq!(id.parse::<i64>("id").unwrap(), 42);
	/// ```
	pub fn parse<T>(&self, name: &str) -> Result<T, ParamError>
	where
		T: FromStr,
		T::Err: std::fmt::Display,
	{
		let raw = match self {
			Self::Scalar(scalar) => scalar
				.to_url_string()
				.ok_or_else(|| ParamError::Missing(name.to_string()))?,
			_ => return Err(ParamError::NotScalar(name.to_string())),
		};

		raw.parse::<T>().map_err(|e| ParamError::Parse {
			name: name.to_string(),
			type_name: std::any::type_name::<T>(),
			raw: raw.clone(),
			message: e.to_string(),
		})
	}

	/// Returns the tree as a query round-trip would reproduce it.
	///
	/// Scalars become strings, nulls and empty containers disappear, array
	/// holes become null and trailing holes are trimmed. Returns `None` when
	/// nothing would be encoded.
	pub fn normalized(&self) -> Option<ParamTree> {
		match self {
			Self::Scalar(scalar) => scalar.to_url_string().map(ParamTree::string),
			Self::Object(map) => {
				let map = normalize_params(map);
				(!map.is_empty()).then_some(Self::Object(map))
			}
			Self::Array(items) => {
				let mut items: Vec<ParamTree> = items
					.iter()
					.map(|item| item.normalized().unwrap_or(Self::NULL))
					.collect();
				while items.last().is_some_and(ParamTree::is_null) {
					items.pop();
				}
				(!items.is_empty()).then_some(Self::Array(items))
			}
		}
	}
}

/// Normalizes every value of a root mapping, see [`ParamTree::normalized`].
pub fn normalize_params(params: &ParamMap) -> ParamMap {
	params
		.iter()
		.filter_map(|(key, value)| value.normalized().map(|v| (key.clone(), v)))
		.collect()
}

impl Default for ParamTree {
	fn default() -> Self {
		Self::Object(ParamMap::new())
	}
}

impl From<Scalar> for ParamTree {
	fn from(value: Scalar) -> Self {
		Self::Scalar(value)
	}
}

impl From<&str> for ParamTree {
	fn from(value: &str) -> Self {
		Self::string(value)
	}
}

impl From<String> for ParamTree {
	fn from(value: String) -> Self {
		Self::string(value)
	}
}

impl From<bool> for ParamTree {
	fn from(value: bool) -> Self {
		Self::Scalar(Scalar::Bool(value))
	}
}

impl From<f64> for ParamTree {
	fn from(value: f64) -> Self {
		Self::Scalar(Scalar::Float(value))
	}
}

impl From<u64> for ParamTree {
	fn from(value: u64) -> Self {
		match i64::try_from(value) {
			Ok(n) => Self::Scalar(Scalar::Int(n)),
			Err(_) => Self::Scalar(Scalar::UInt(value)),
		}
	}
}

// Integer types that always fit in i64
macro_rules! impl_from_int {
	($($ty:ty),* $(,)?) => {
		$(
			impl From<$ty> for ParamTree {
				fn from(value: $ty) -> Self {
					Self::Scalar(Scalar::Int(i64::from(value)))
				}
			}
		)*
	};
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl<T: Into<ParamTree>> From<Vec<T>> for ParamTree {
	fn from(value: Vec<T>) -> Self {
		Self::Array(value.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<ParamTree>> From<Option<T>> for ParamTree {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::NULL, Into::into)
	}
}

impl From<ParamMap> for ParamTree {
	fn from(value: ParamMap) -> Self {
		Self::Object(value)
	}
}

impl From<serde_json::Value> for ParamTree {
	fn from(value: serde_json::Value) -> Self {
		use serde_json::Value;

		match value {
			Value::Null => Self::NULL,
			Value::Bool(b) => b.into(),
			Value::Number(n) => {
				if let Some(i) = n.as_i64() {
					Self::Scalar(Scalar::Int(i))
				} else if let Some(u) = n.as_u64() {
					Self::Scalar(Scalar::UInt(u))
				} else {
					Self::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN)))
				}
			}
			Value::String(s) => Self::string(s),
			Value::Array(items) => Self::Array(items.into_iter().map(Into::into).collect()),
			Value::Object(map) => Self::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
		}
	}
}

impl From<ParamTree> for serde_json::Value {
	fn from(value: ParamTree) -> Self {
		use serde_json::Value;

		match value {
			ParamTree::Scalar(Scalar::Null) => Value::Null,
			ParamTree::Scalar(Scalar::Bool(b)) => Value::Bool(b),
			ParamTree::Scalar(Scalar::Int(n)) => Value::from(n),
			ParamTree::Scalar(Scalar::UInt(n)) => Value::from(n),
			// Non-finite floats have no JSON form
			ParamTree::Scalar(Scalar::Float(n)) => {
				serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
			}
			ParamTree::Scalar(Scalar::String(s)) => Value::String(s),
			ParamTree::Array(items) => Value::Array(items.into_iter().map(Into::into).collect()),
			ParamTree::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
		}
	}
}

/// Converts a JSON object into a root parameter mapping.
///
/// Returns `None` if the value is not an object.
pub fn params_from_json(value: serde_json::Value) -> Option<ParamMap> {
	match ParamTree::from(value) {
		ParamTree::Object(map) => Some(map),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(Scalar::Null, None)]
	#[case(Scalar::Bool(true), Some("true"))]
	#[case(Scalar::Int(-7), Some("-7"))]
	#[case(Scalar::UInt(u64::MAX), Some("18446744073709551615"))]
	#[case(Scalar::Float(1.5), Some("1.5"))]
	#[case(Scalar::Float(2.0), Some("2"))]
	#[case(Scalar::String("".to_string()), Some(""))]
	fn test_scalar_to_url_string(#[case] scalar: Scalar, #[case] expected: Option<&str>) {
		assert_eq!(scalar.to_url_string().as_deref(), expected);
	}

	#[rstest]
	fn test_parse_i64() {
		let value = ParamTree::string("9223372036854775807");
		assert_eq!(value.parse::<i64>("id").unwrap(), 9223372036854775807);
	}

	#[rstest]
	fn test_parse_from_number_scalar() {
		let value = ParamTree::from(42u32);
		assert_eq!(value.parse::<u8>("id").unwrap(), 42);
		assert_eq!(value.parse::<String>("id").unwrap(), "42");
	}

	#[rstest]
	fn test_parse_bool() {
		assert!(ParamTree::string("true").parse::<bool>("flag").unwrap());
		assert!(!ParamTree::from(false).parse::<bool>("flag").unwrap());
	}

	#[rstest]
	fn test_parse_error() {
		let result = ParamTree::string("not_a_number").parse::<i32>("id");

		match result {
			Err(ParamError::Parse {
				name,
				type_name,
				raw,
				..
			}) => {
				assert_eq!(name, "id");
				assert_eq!(type_name, "i32");
				assert_eq!(raw, "not_a_number");
			}
			other => panic!("Expected Parse error, got {:?}", other),
		}
	}

	#[rstest]
	fn test_parse_null_and_container() {
		assert_eq!(
			ParamTree::NULL.parse::<i32>("id"),
			Err(ParamError::Missing("id".to_string()))
		);
		assert_eq!(
			ParamTree::from(vec![1, 2]).parse::<i32>("ids"),
			Err(ParamError::NotScalar("ids".to_string()))
		);
	}

	#[rstest]
	fn test_get_by_key_and_index() {
		let tree = ParamTree::from(json!({"a": [{"c": "1"}, {"c": "3"}]}));

		let second = tree.get("a").and_then(|a| a.get("1")).and_then(|o| o.get("c"));
		assert_eq!(second.and_then(ParamTree::as_str), Some("3"));
		assert!(tree.get("a").and_then(|a| a.get("x")).is_none());
	}

	#[rstest]
	fn test_from_u64_overflow() {
		assert_eq!(ParamTree::from(5u64), ParamTree::Scalar(Scalar::Int(5)));
		assert_eq!(
			ParamTree::from(u64::MAX),
			ParamTree::Scalar(Scalar::UInt(u64::MAX))
		);
	}

	#[rstest]
	fn test_json_conversion() {
		let value = json!({"id": 1, "tags": ["a", "b"], "ok": true, "score": 0.5, "none": null});

		let tree = ParamTree::from(value.clone());
		assert_eq!(tree.get("id"), Some(&ParamTree::Scalar(Scalar::Int(1))));
		assert_eq!(tree.get("none"), Some(&ParamTree::NULL));
		assert_eq!(serde_json::Value::from(tree), value);
	}

	#[rstest]
	fn test_params_from_json_requires_object() {
		assert!(params_from_json(json!({"a": 1})).is_some());
		assert!(params_from_json(json!([1])).is_none());
	}

	#[rstest]
	fn test_object_equality_ignores_order() {
		let a = ParamTree::from(json!({"x": "1", "y": "2"}));
		let mut map = ParamMap::new();
		map.insert("y".to_string(), "2".into());
		map.insert("x".to_string(), "1".into());

		assert_eq!(a, ParamTree::Object(map));
	}

	#[rstest]
	fn test_normalized() {
		let tree = ParamTree::from(json!({
			"n": 1,
			"gone": null,
			"empty": {},
			"list": [null, 2, {}, null],
		}));

		let expected = ParamTree::from(json!({
			"n": "1",
			"list": [null, "2"],
		}));
		assert_eq!(tree.normalized(), Some(expected));
		assert_eq!(ParamTree::from(json!({"a": []})).normalized(), None);
	}
}

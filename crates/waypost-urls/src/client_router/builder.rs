//! URL generation from a route name and parameters.

use super::error::RouterError;
use super::params::{ParamMap, ParamTree, Scalar};
use super::pattern::{CaptureKind, TemplatePart, token_text};
use super::query::{self, COMPONENT};
use super::registry::RouteRegistry;
use percent_encoding::{AsciiSet, utf8_percent_encode};

/// Characters escaped in a wildcard value; `/` is kept.
const WILDCARD: &AsciiSet = &COMPONENT.remove(b'/');

impl<H> RouteRegistry<H> {
	/// Builds a URL for the named route.
	///
	/// Parameters named by the route's template are substituted into the
	/// path and consumed; the rest are encoded as the query string. A
	/// parameter set to null or to the empty string counts as absent. With
	/// [`UrlSettings::encode_path_params`](super::settings::UrlSettings) on,
	/// substituted values are percent-encoded (`/` is kept for wildcards).
	/// A missing path parameter leaves its token in the URL unless
	/// [`UrlSettings::require_path_params`](super::settings::UrlSettings) is set.
	///
	/// # Errors
	///
	/// - [`RouterError::UnknownRoute`] if no route has this name
	/// - [`RouterError::InvalidPathParameter`] if a path parameter is an array,
	///   an object, a non-finite number, or a `.`/`..` path segment
	/// - [`RouterError::MissingParameter`] if a path parameter is absent and
	///   `require_path_params` is set
	/// - [`RouterError::Query`] if the remaining parameters cannot be encoded
	///
	/// # Examples
	///
	/// ```
	/// use waypost_urls::client_router::{ParamMap, RouteDefinition, RouteRegistry};
	///
	/// let registry = RouteRegistry::new([RouteDefinition::new("home", "/home/:id", ())]).unwrap();
	///
	/// let mut params = ParamMap::new();
	/// params.insert("id".to_string(), 1.into());
	/// params.insert("b".to_string(), 4.into());
	/// assert_eq!(registry.build_url("home", &params).unwrap(), "/home/1?b=4");
	/// ```
	pub fn build_url(&self, name: &str, params: &ParamMap) -> Result<String, RouterError> {
		let route = self
			.lookup(name)
			.ok_or_else(|| RouterError::UnknownRoute(name.to_string()))?;

		let mut remaining = params.clone();
		let mut values = Vec::with_capacity(route.param_order().len());

		for slot in route.param_order() {
			let value = match remaining.shift_remove(slot.name()) {
				Some(ParamTree::Scalar(Scalar::Float(n))) if !n.is_finite() => {
					return Err(RouterError::InvalidPathParameter {
						route: name.to_string(),
						param: slot.name().to_string(),
					});
				}
				Some(ParamTree::Scalar(scalar)) => scalar.to_url_string().filter(|text| !text.is_empty()),
				Some(_) => {
					return Err(RouterError::InvalidPathParameter {
						route: name.to_string(),
						param: slot.name().to_string(),
					});
				}
				None => None,
			};

			if value.as_deref().is_some_and(|text| has_dot_segment(text, slot.kind())) {
				return Err(RouterError::InvalidPathParameter {
					route: name.to_string(),
					param: slot.name().to_string(),
				});
			}

			let rendered = match value {
				Some(text) if self.settings().encode_path_params => {
					let set = match slot.kind() {
						CaptureKind::Segment => COMPONENT,
						CaptureKind::Wildcard => WILDCARD,
					};
					utf8_percent_encode(&text, set).to_string()
				}
				Some(text) => text,
				None if self.settings().require_path_params => {
					return Err(RouterError::MissingParameter {
						route: name.to_string(),
						param: slot.name().to_string(),
					});
				}
				None => token_text(slot),
			};
			values.push(rendered);
		}

		let mut url = String::new();
		for part in route.pattern().parts() {
			match part {
				TemplatePart::Literal(text) => url.push_str(text),
				TemplatePart::Capture(index) => url.push_str(&values[*index]),
			}
		}

		let query_string = query::encode(&remaining)?;
		if !query_string.is_empty() {
			url.push('?');
			url.push_str(&query_string);
		}

		tracing::trace!(route = name, url = %url, "built url");
		Ok(url)
	}
}

/// `.` and `..` segments are removed by URL normalization, so they cannot
/// survive a trip through the browser.
fn has_dot_segment(text: &str, kind: CaptureKind) -> bool {
	let is_dot = |segment: &str| segment == "." || segment == "..";
	match kind {
		CaptureKind::Segment => is_dot(text),
		CaptureKind::Wildcard => text.split('/').any(is_dot),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::client_router::error::QueryError;
	use crate::client_router::params::{normalize_params, params_from_json};
	use crate::client_router::registry::RouteDefinition;
	use crate::client_router::settings::UrlSettings;
	use rstest::{fixture, rstest};
	use serde_json::json;

	fn params(value: serde_json::Value) -> ParamMap {
		params_from_json(value).unwrap()
	}

	fn definitions() -> Vec<RouteDefinition<()>> {
		vec![
			RouteDefinition::new("home", "/home/:id", ()),
			RouteDefinition::new("test", "/test/:id/:name", ()),
			RouteDefinition::new("user", "/user/*id/:name", ()),
			RouteDefinition::new("index", "/", ()),
		]
	}

	#[fixture]
	fn registry() -> RouteRegistry<()> {
		RouteRegistry::new(definitions()).unwrap()
	}

	#[rstest]
	#[case("home", json!({"id": 1}), "/home/1")]
	#[case("home", json!({"id": 1, "b": 4}), "/home/1?b=4")]
	#[case("test", json!({"id": 1, "name": "tom"}), "/test/1/tom")]
	#[case("user", json!({"id": "a/b/c", "name": 42}), "/user/a/b/c/42")]
	#[case("index", json!({}), "/")]
	#[case("index", json!({"f": {"a": [1, 2]}}), "/?f.a.0=1&f.a.1=2")]
	#[case("home", json!({"id": true, "empty": ""}), "/home/true?empty")]
	fn test_build_url(
		registry: RouteRegistry<()>,
		#[case] name: &str,
		#[case] value: serde_json::Value,
		#[case] expected: &str,
	) {
		assert_eq!(registry.build_url(name, &params(value)).unwrap(), expected);
	}

	#[rstest]
	fn test_unknown_route(registry: RouteRegistry<()>) {
		assert_eq!(
			registry.build_url("unknown", &ParamMap::new()),
			Err(RouterError::UnknownRoute("unknown".to_string()))
		);
	}

	#[rstest]
	fn test_path_values_percent_encoded(registry: RouteRegistry<()>) {
		let url = registry
			.build_url("test", &params(json!({"id": "a/b", "name": "tom & jerry"})))
			.unwrap();
		assert_eq!(url, "/test/a%2Fb/tom%20%26%20jerry");

		let url = registry
			.build_url("user", &params(json!({"id": "dir one/file", "name": "x"})))
			.unwrap();
		assert_eq!(url, "/user/dir%20one/file/x");
	}

	#[rstest]
	fn test_path_values_verbatim_without_encoding() {
		let registry = RouteRegistry::with_settings(
			definitions(),
			UrlSettings {
				encode_path_params: false,
				..UrlSettings::default()
			},
		)
		.unwrap();

		let url = registry
			.build_url("test", &params(json!({"id": "a b", "name": "c"})))
			.unwrap();
		assert_eq!(url, "/test/a b/c");
	}

	#[rstest]
	fn test_missing_path_param_keeps_token(registry: RouteRegistry<()>) {
		let url = registry
			.build_url("test", &params(json!({"id": 1, "name": null})))
			.unwrap();
		assert_eq!(url, "/test/1/:name");
	}

	#[rstest]
	fn test_missing_path_param_required() {
		let registry = RouteRegistry::with_settings(
			definitions(),
			UrlSettings {
				require_path_params: true,
				..UrlSettings::default()
			},
		)
		.unwrap();

		assert_eq!(
			registry.build_url("home", &ParamMap::new()),
			Err(RouterError::MissingParameter {
				route: "home".to_string(),
				param: "id".to_string(),
			})
		);
	}

	#[rstest]
	#[case("home", json!({"id": ""}), "/home/:id")]
	#[case("user", json!({"id": "", "name": "x"}), "/user/*id/x")]
	fn test_empty_path_param_is_missing(
		registry: RouteRegistry<()>,
		#[case] name: &str,
		#[case] value: serde_json::Value,
		#[case] expected: &str,
	) {
		assert_eq!(registry.build_url(name, &params(value)).unwrap(), expected);
	}

	#[rstest]
	fn test_empty_path_param_required() {
		let registry = RouteRegistry::with_settings(
			definitions(),
			UrlSettings {
				require_path_params: true,
				..UrlSettings::default()
			},
		)
		.unwrap();

		assert_eq!(
			registry.build_url("home", &params(json!({"id": ""}))),
			Err(RouterError::MissingParameter {
				route: "home".to_string(),
				param: "id".to_string(),
			})
		);
	}

	#[rstest]
	#[case("home", json!({"id": "."}), "id")]
	#[case("home", json!({"id": ".."}), "id")]
	#[case("user", json!({"id": "a/../b", "name": "x"}), "id")]
	#[case("user", json!({"id": "./a", "name": "x"}), "id")]
	#[case("user", json!({"id": "a", "name": ".."}), "name")]
	fn test_dot_segment_path_param_rejected(
		registry: RouteRegistry<()>,
		#[case] name: &str,
		#[case] value: serde_json::Value,
		#[case] param: &str,
	) {
		assert_eq!(
			registry.build_url(name, &params(value)),
			Err(RouterError::InvalidPathParameter {
				route: name.to_string(),
				param: param.to_string(),
			})
		);
	}

	#[rstest]
	#[case("home", json!({"id": "..."}), "/home/...")]
	#[case("home", json!({"id": "v1.0"}), "/home/v1.0")]
	#[case("user", json!({"id": "a/.hidden", "name": "x"}), "/user/a/.hidden/x")]
	fn test_dotted_values_round_trip(
		registry: RouteRegistry<()>,
		#[case] name: &str,
		#[case] value: serde_json::Value,
		#[case] expected: &str,
	) {
		let values = params(value);

		let url = registry.build_url(name, &values).unwrap();
		let route_match = registry.resolve(&url).unwrap();

		assert_eq!(url, expected);
		assert_eq!(route_match.params(), &normalize_params(&values));
	}

	#[rstest]
	fn test_container_path_param_rejected(registry: RouteRegistry<()>) {
		let result = registry.build_url("home", &params(json!({"id": [1, 2]})));

		assert_eq!(
			result,
			Err(RouterError::InvalidPathParameter {
				route: "home".to_string(),
				param: "id".to_string(),
			})
		);
	}

	#[rstest]
	fn test_non_finite_query_value_rejected(registry: RouteRegistry<()>) {
		let mut values = params(json!({"id": 1}));
		values.insert("x".to_string(), f64::INFINITY.into());

		assert_eq!(
			registry.build_url("home", &values),
			Err(RouterError::Query(QueryError::NonFiniteNumber {
				key: "x".to_string()
			}))
		);
	}

	#[rstest]
	fn test_build_then_resolve(registry: RouteRegistry<()>) {
		// Arrange
		let values = params(json!({
			"id": "some dir/file.txt",
			"name": "q?#",
			"filter": {"tags": ["a", "b"]},
		}));

		// Act
		let url = registry.build_url("user", &values).unwrap();
		let route_match = registry.resolve(&url).unwrap();

		// Assert
		assert_eq!(route_match.name(), "user");
		assert_eq!(route_match.params()["id"].as_str(), Some("some dir/file.txt"));
		assert_eq!(route_match.params()["name"].as_str(), Some("q?#"));
		assert_eq!(
			route_match.params()["filter"],
			ParamTree::from(json!({"tags": ["a", "b"]}))
		);
	}
}

//! URL to route resolution.

use super::error::ParamError;
use super::params::{ParamMap, ParamTree};
use super::query::{self, decode_component};
use super::registry::{CompiledRoute, RouteRegistry};
use std::str::FromStr;

/// A matched route with its merged path and query parameters.
pub struct RouteMatch<'r, H> {
	route: &'r CompiledRoute<H>,
	params: ParamMap,
}

impl<H> std::fmt::Debug for RouteMatch<'_, H> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouteMatch")
			.field("route", &self.route.name())
			.field("params", &self.params)
			.finish()
	}
}

impl<'r, H> RouteMatch<'r, H> {
	/// Returns the matched route.
	pub fn route(&self) -> &'r CompiledRoute<H> {
		self.route
	}

	/// Returns the matched route name.
	pub fn name(&self) -> &'r str {
		self.route.name()
	}

	/// Returns the matched route's handler.
	pub fn handler(&self) -> &'r H {
		self.route.handler()
	}

	/// Returns the merged parameters.
	pub fn params(&self) -> &ParamMap {
		&self.params
	}

	/// Consumes the match and returns the merged parameters.
	pub fn into_params(self) -> ParamMap {
		self.params
	}

	/// Parses a top-level parameter into `T`.
	///
	/// # Errors
	///
	/// Returns [`ParamError::Missing`] if the parameter is absent, otherwise
	/// the error of [`ParamTree::parse`].
	pub fn param<T>(&self, name: &str) -> Result<T, ParamError>
	where
		T: FromStr,
		T::Err: std::fmt::Display,
	{
		self.params
			.get(name)
			.ok_or_else(|| ParamError::Missing(name.to_string()))?
			.parse(name)
	}
}

/// Splits a URL into its path and query string.
///
/// A `#fragment` is dropped first, then the URL splits on the first `?`.
/// An empty path is read as `/`.
pub fn split_url(url: &str) -> (&str, &str) {
	let url = url.split_once('#').map_or(url, |(before, _)| before);
	let (path, query) = url.split_once('?').unwrap_or((url, ""));
	(if path.is_empty() { "/" } else { path }, query)
}

impl<H> RouteRegistry<H> {
	/// Resolves a URL to the first matching route.
	///
	/// Path captures are stored under their parameter names, then the
	/// decoded query string is merged in; query keys win on collision.
	/// Returns `None` when no route matches.
	///
	/// # Examples
	///
	/// ```
	/// use waypost_urls::client_router::{RouteDefinition, RouteRegistry};
	///
	/// let registry = RouteRegistry::new([
	///     RouteDefinition::new("user", "/user/*id/:name", ()),
	/// ])
	/// .unwrap();
	///
	/// let route_match = registry.resolve("/user/a/b/c/42?tab=posts").unwrap();
	/// assert_eq!(route_match.name(), "user");
	/// assert_eq!(route_match.params()["id"].as_str(), Some("a/b/c"));
	/// assert_eq!(route_match.param::<u32>("name").unwrap(), 42);
	/// assert_eq!(route_match.params()["tab"].as_str(), Some("posts"));
	/// ```
	pub fn resolve(&self, url: &str) -> Option<RouteMatch<'_, H>> {
		let (path, query_string) = split_url(url);

		for route in self.all() {
			let Some(captures) = route.pattern().captures(path) else {
				continue;
			};

			let mut params = ParamMap::new();
			for (slot, raw) in captures {
				let value = if self.settings().encode_path_params {
					decode_component(raw)
				} else {
					raw.to_string()
				};
				params.insert(slot.name().to_string(), ParamTree::string(value));
			}

			if !query_string.is_empty() {
				params.extend(query::decode(query_string));
			}

			tracing::debug!(url, route = route.name(), "resolved route");
			return Some(RouteMatch { route, params });
		}

		tracing::debug!(url, "no route matches");
		None
	}
}

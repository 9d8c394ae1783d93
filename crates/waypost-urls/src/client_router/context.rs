//! Explicit router context for one mounted application.
//!
//! The registry and codec are pure; the only mutable routing state is the
//! current URL. [`RouterContext`] owns that state together with a
//! [`Navigator`], the seam to whatever history the host provides (the browser
//! history API, a native navigation stack, or [`MemoryHistory`]).

use super::error::RouterError;
use super::params::ParamMap;
use super::registry::RouteRegistry;
use super::resolver::RouteMatch;
use std::sync::Arc;

/// Navigation type for history operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationType {
	/// Add a new history entry.
	Push,
	/// Replace the current history entry.
	Replace,
}

/// Receives URLs produced by the router.
pub trait Navigator {
	/// Adds a new history entry.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Navigation`] if the host refuses the URL.
	fn push(&mut self, url: &str) -> Result<(), RouterError>;

	/// Replaces the current history entry.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Navigation`] if the host refuses the URL.
	fn replace(&mut self, url: &str) -> Result<(), RouterError>;
}

/// In-process history stack with back/forward support.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryHistory {
	entries: Vec<String>,
	index: usize,
}

impl MemoryHistory {
	/// Creates a history holding a single entry.
	pub fn new(initial_url: impl Into<String>) -> Self {
		Self {
			entries: vec![initial_url.into()],
			index: 0,
		}
	}

	/// Returns the current entry.
	pub fn current(&self) -> &str {
		&self.entries[self.index]
	}

	/// Moves one entry back and returns it, or `None` at the start.
	pub fn back(&mut self) -> Option<&str> {
		self.index = self.index.checked_sub(1)?;
		Some(self.current())
	}

	/// Moves one entry forward and returns it, or `None` at the end.
	pub fn forward(&mut self) -> Option<&str> {
		if self.index + 1 >= self.entries.len() {
			return None;
		}
		self.index += 1;
		Some(self.current())
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Always `false`: a history holds at least one entry.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new("/")
	}
}

impl Navigator for MemoryHistory {
	fn push(&mut self, url: &str) -> Result<(), RouterError> {
		self.entries.truncate(self.index + 1);
		self.entries.push(url.to_string());
		self.index = self.entries.len() - 1;
		Ok(())
	}

	fn replace(&mut self, url: &str) -> Result<(), RouterError> {
		self.entries[self.index] = url.to_string();
		Ok(())
	}
}

/// Routing state for one mounted application.
///
/// Created when the application mounts and dropped when it unmounts. The
/// registry is shared and never mutated.
pub struct RouterContext<H, N> {
	registry: Arc<RouteRegistry<H>>,
	navigator: N,
	url: String,
}

impl<H, N: std::fmt::Debug> std::fmt::Debug for RouterContext<H, N> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouterContext")
			.field("url", &self.url)
			.field("routes_count", &self.registry.len())
			.field("navigator", &self.navigator)
			.finish()
	}
}

impl<H, N: Navigator> RouterContext<H, N> {
	/// Creates a context positioned at `initial_url`.
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use waypost_urls::client_router::{
	///     MemoryHistory, ParamMap, RouteDefinition, RouteRegistry, RouterContext,
	/// };
	///
	/// let registry = Arc::new(
	///     RouteRegistry::new([
	///         RouteDefinition::new("index", "/", "index_page"),
	///         RouteDefinition::new("home", "/home/:id", "home_page"),
	///     ])
	///     .unwrap(),
	/// );
	/// let mut router = RouterContext::new(registry, MemoryHistory::default(), "/");
	///
	/// let mut params = ParamMap::new();
	/// params.insert("id".to_string(), 7.into());
	/// router.push_route("home", &params).unwrap();
	///
	/// assert_eq!(router.url(), "/home/7");
	/// assert_eq!(router.route_name(), Some("home"));
	/// ```
	pub fn new(registry: Arc<RouteRegistry<H>>, navigator: N, initial_url: impl Into<String>) -> Self {
		Self {
			registry,
			navigator,
			url: initial_url.into(),
		}
	}

	/// Returns the shared registry.
	pub fn registry(&self) -> &Arc<RouteRegistry<H>> {
		&self.registry
	}

	/// Returns the navigator.
	pub fn navigator(&self) -> &N {
		&self.navigator
	}

	/// Returns the navigator mutably, e.g. to drive back/forward.
	pub fn navigator_mut(&mut self) -> &mut N {
		&mut self.navigator
	}

	/// Returns the current URL.
	pub fn url(&self) -> &str {
		&self.url
	}

	/// Resolves the current URL.
	pub fn current(&self) -> Option<RouteMatch<'_, H>> {
		self.registry.resolve(&self.url)
	}

	/// Returns the name of the route matching the current URL.
	pub fn route_name(&self) -> Option<&str> {
		self.current().map(|route_match| route_match.name())
	}

	/// Returns the parameters of the current URL, empty when nothing matches.
	pub fn params(&self) -> ParamMap {
		self.current().map(RouteMatch::into_params).unwrap_or_default()
	}

	/// Builds a URL for the route and pushes it as a new history entry.
	///
	/// Returns the URL navigated to.
	///
	/// # Errors
	///
	/// Returns the errors of [`RouteRegistry::build_url`] and of the navigator.
	/// The current URL is unchanged on error.
	pub fn push_route(&mut self, name: &str, params: &ParamMap) -> Result<String, RouterError> {
		self.navigate(name, params, NavigationType::Push)
	}

	/// Builds a URL for the route and replaces the current history entry.
	///
	/// # Errors
	///
	/// Same as [`RouterContext::push_route`].
	pub fn replace_route(&mut self, name: &str, params: &ParamMap) -> Result<String, RouterError> {
		self.navigate(name, params, NavigationType::Replace)
	}

	/// Records a URL change that happened outside the router, such as a
	/// back/forward navigation.
	pub fn sync(&mut self, url: impl Into<String>) {
		self.url = url.into();
		tracing::debug!(url = %self.url, "router synced to external navigation");
	}

	fn navigate(&mut self, name: &str, params: &ParamMap, nav_type: NavigationType) -> Result<String, RouterError> {
		let url = self.registry.build_url(name, params)?;

		match nav_type {
			NavigationType::Push => self.navigator.push(&url)?,
			NavigationType::Replace => self.navigator.replace(&url)?,
		}

		tracing::debug!(route = name, url = %url, ?nav_type, "navigated");
		self.url = url.clone();
		Ok(url)
	}
}

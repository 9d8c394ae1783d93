//! Route registry.
//!
//! Routes are compiled once and kept in definition order, which is also the
//! match priority: the first route whose template matches a path wins.
//! A registry is read-only after construction and can be shared across
//! threads (e.g. behind an `Arc`) when `H` is `Send + Sync`.

use super::error::RouterError;
use super::pattern::{CompiledPattern, ParamSlot};
use super::settings::UrlSettings;
use std::collections::HashMap;

/// A route as declared by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition<H> {
	/// Unique route name, used for URL building.
	pub name: String,
	/// Path template, e.g. `/users/:id`.
	pub template: String,
	/// Opaque handler, handed back on a match.
	pub handler: H,
}

impl<H> RouteDefinition<H> {
	/// Creates a new route definition.
	pub fn new(name: impl Into<String>, template: impl Into<String>, handler: H) -> Self {
		Self {
			name: name.into(),
			template: template.into(),
			handler,
		}
	}
}

/// A route with its compiled template.
#[derive(Clone)]
pub struct CompiledRoute<H> {
	name: String,
	pattern: CompiledPattern,
	handler: H,
}

impl<H> std::fmt::Debug for CompiledRoute<H> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CompiledRoute")
			.field("name", &self.name)
			.field("template", &self.pattern.template())
			.field("params", &self.pattern.param_order().len())
			.finish()
	}
}

impl<H> CompiledRoute<H> {
	/// Compiles a route definition.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Pattern`] if the template cannot be compiled.
	pub fn compile(definition: RouteDefinition<H>) -> Result<Self, RouterError> {
		Ok(Self {
			pattern: CompiledPattern::compile(&definition.template)?,
			name: definition.name,
			handler: definition.handler,
		})
	}

	/// Returns the route name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the original template.
	pub fn template(&self) -> &str {
		self.pattern.template()
	}

	/// Returns the compiled matcher.
	pub fn pattern(&self) -> &CompiledPattern {
		&self.pattern
	}

	/// Returns the parameter table in capture-group order.
	pub fn param_order(&self) -> &[ParamSlot] {
		self.pattern.param_order()
	}

	/// Returns the opaque handler.
	pub fn handler(&self) -> &H {
		&self.handler
	}
}

/// Compiled routes in match-priority order, indexed by name.
#[derive(Clone)]
pub struct RouteRegistry<H> {
	routes: Vec<CompiledRoute<H>>,
	by_name: HashMap<String, usize>,
	settings: UrlSettings,
}

impl<H> std::fmt::Debug for RouteRegistry<H> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouteRegistry")
			.field("routes", &self.routes.iter().map(|r| r.name()).collect::<Vec<_>>())
			.field("settings", &self.settings)
			.finish()
	}
}

impl<H> RouteRegistry<H> {
	/// Builds a registry with default [`UrlSettings`].
	///
	/// # Errors
	///
	/// Returns [`RouterError::DuplicateRouteName`] if two definitions share a
	/// name, or [`RouterError::Pattern`] if a template cannot be compiled.
	///
	/// # Examples
	///
	/// ```
	/// use waypost_urls::client_router::{RouteDefinition, RouteRegistry};
	///
	/// let registry = RouteRegistry::new([
	///     RouteDefinition::new("home", "/home/:id", "home_page"),
	///     RouteDefinition::new("test", "/test/:id/:name", "test_page"),
	/// ])
	/// .unwrap();
	///
	/// assert_eq!(registry.len(), 2);
	/// assert!(registry.contains("home"));
	/// ```
	pub fn new<I>(definitions: I) -> Result<Self, RouterError>
	where
		I: IntoIterator<Item = RouteDefinition<H>>,
	{
		Self::with_settings(definitions, UrlSettings::default())
	}

	/// Builds a registry with explicit URL settings.
	///
	/// # Errors
	///
	/// Same as [`RouteRegistry::new`].
	pub fn with_settings<I>(definitions: I, settings: UrlSettings) -> Result<Self, RouterError>
	where
		I: IntoIterator<Item = RouteDefinition<H>>,
	{
		let mut routes = Vec::new();
		let mut by_name = HashMap::new();

		for definition in definitions {
			if by_name.contains_key(&definition.name) {
				return Err(RouterError::DuplicateRouteName(definition.name));
			}
			let route = CompiledRoute::compile(definition)?;
			by_name.insert(route.name.clone(), routes.len());
			routes.push(route);
		}

		tracing::debug!(routes = routes.len(), "built route registry");

		Ok(Self {
			routes,
			by_name,
			settings,
		})
	}

	/// Starts a chained registry definition.
	pub fn builder() -> RegistryBuilder<H> {
		RegistryBuilder::new()
	}

	/// Looks up a route by name.
	pub fn lookup(&self, name: &str) -> Option<&CompiledRoute<H>> {
		self.by_name.get(name).map(|&index| &self.routes[index])
	}

	/// Returns all routes in match-priority order.
	pub fn all(&self) -> &[CompiledRoute<H>] {
		&self.routes
	}

	/// Iterates over routes in match-priority order.
	pub fn iter(&self) -> std::slice::Iter<'_, CompiledRoute<H>> {
		self.routes.iter()
	}

	/// Returns the number of registered routes.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Returns whether no routes are registered.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// Checks if a route name exists.
	pub fn contains(&self, name: &str) -> bool {
		self.by_name.contains_key(name)
	}

	/// Returns the URL settings used by resolution and building.
	pub fn settings(&self) -> &UrlSettings {
		&self.settings
	}
}

impl<'a, H> IntoIterator for &'a RouteRegistry<H> {
	type Item = &'a CompiledRoute<H>;
	type IntoIter = std::slice::Iter<'a, CompiledRoute<H>>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

/// Chained construction of a [`RouteRegistry`].
///
/// ```
/// use waypost_urls::client_router::RouteRegistry;
///
/// let registry = RouteRegistry::builder()
///     .route("home", "/", ())
///     .route("user_detail", "/users/:id", ())
///     .build()
///     .unwrap();
///
/// assert_eq!(registry.build_url("home", &Default::default()).unwrap(), "/");
/// ```
#[derive(Debug, Clone)]
pub struct RegistryBuilder<H> {
	definitions: Vec<RouteDefinition<H>>,
	settings: UrlSettings,
}

impl<H> Default for RegistryBuilder<H> {
	fn default() -> Self {
		Self::new()
	}
}

impl<H> RegistryBuilder<H> {
	/// Creates an empty builder with default settings.
	pub fn new() -> Self {
		Self {
			definitions: Vec::new(),
			settings: UrlSettings::default(),
		}
	}

	/// Adds a named route.
	pub fn route(mut self, name: &str, template: &str, handler: H) -> Self {
		self.definitions
			.push(RouteDefinition::new(name, template, handler));
		self
	}

	/// Replaces the URL settings.
	pub fn settings(mut self, settings: UrlSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Compiles every route.
	///
	/// # Errors
	///
	/// Same as [`RouteRegistry::new`].
	pub fn build(self) -> Result<RouteRegistry<H>, RouterError> {
		RouteRegistry::with_settings(self.definitions, self.settings)
	}
}

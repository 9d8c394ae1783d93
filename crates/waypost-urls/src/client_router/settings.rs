//! Router configuration.
//!
//! Settings can be built in code or loaded from TOML:
//!
//! ```toml
//! [url]
//! encode_path_params = true
//! require_path_params = false
//!
//! [[routes]]
//! name = "home"
//! path = "/home/:id"
//! handler = "home_page"
//! ```

use super::error::SettingsError;
use super::registry::{RouteDefinition, RouteRegistry};
use serde::{Deserialize, Serialize};

/// Options shared by URL resolution and URL building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlSettings {
	/// Percent-encode path parameters when building URLs and decode them
	/// when resolving. When off, values pass through verbatim.
	pub encode_path_params: bool,
	/// Fail URL building when a path parameter is missing instead of
	/// leaving its token in the URL.
	pub require_path_params: bool,
}

impl Default for UrlSettings {
	fn default() -> Self {
		Self {
			encode_path_params: true,
			require_path_params: false,
		}
	}
}

/// A route declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
	/// Unique route name.
	pub name: String,
	/// Path template.
	pub path: String,
	/// Handler key; defaults to the route name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub handler: Option<String>,
}

/// Complete router configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
	/// URL codec options.
	pub url: UrlSettings,
	/// Routes in match-priority order.
	pub routes: Vec<RouteEntry>,
}

impl RouterSettings {
	/// Parses settings from a TOML document.
	///
	/// # Errors
	///
	/// Returns [`SettingsError::Toml`] if the document is not valid.
	///
	/// # Examples
	///
	/// ```
	/// use waypost_urls::client_router::RouterSettings;
	///
	/// let settings = RouterSettings::from_toml_str(r#"
	///     [[routes]]
	///     name = "home"
	///     path = "/home/:id"
	/// "#).unwrap();
	///
	/// let registry = settings.into_registry().unwrap();
	/// assert_eq!(registry.lookup("home").unwrap().handler(), "home");
	/// ```
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(source)?)
	}

	/// Returns route definitions whose handler is the handler key.
	pub fn definitions(&self) -> Vec<RouteDefinition<String>> {
		self.routes
			.iter()
			.map(|entry| {
				let handler = entry.handler.clone().unwrap_or_else(|| entry.name.clone());
				RouteDefinition::new(entry.name.as_str(), entry.path.as_str(), handler)
			})
			.collect()
	}

	/// Compiles the configured routes.
	///
	/// # Errors
	///
	/// Returns [`SettingsError::Router`] if a route is invalid or a name is
	/// repeated.
	pub fn into_registry(self) -> Result<RouteRegistry<String>, SettingsError> {
		Ok(RouteRegistry::with_settings(self.definitions(), self.url)?)
	}
}

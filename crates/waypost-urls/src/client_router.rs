//! Client-side router for single-page applications.
//!
//! Maps browser URLs to named routes and back:
//!
//! - [`CompiledPattern`]: path templates with `:name` segment captures and
//!   `*name` wildcard captures
//! - [`RouteRegistry::resolve`]: URL to route and merged parameters
//! - [`RouteRegistry::build_url`]: route name and parameters to URL
//! - [`query`]: dotted-key codec for nested query parameters
//! - [`RouterContext`]: current URL and history for one mounted application
//!
//! # Example
//!
//! ```
//! use waypost_urls::client_router::{ParamMap, RouteRegistry};
//!
//! let registry = RouteRegistry::builder()
//!     .route("home", "/home/:id", "home_page")
//!     .route("test", "/test/:id/:name", "test_page")
//!     .build()
//!     .unwrap();
//!
//! let route_match = registry.resolve("/test/1/tom?f.a.0=x").unwrap();
//! assert_eq!(*route_match.handler(), "test_page");
//! assert_eq!(route_match.params()["name"].as_str(), Some("tom"));
//!
//! let mut params = ParamMap::new();
//! params.insert("id".to_string(), 1.into());
//! params.insert("b".to_string(), 4.into());
//! assert_eq!(registry.build_url("home", &params).unwrap(), "/home/1?b=4");
//! ```

mod builder;
mod context;
mod error;
mod params;
mod pattern;
pub mod query;
mod registry;
mod resolver;
mod settings;

pub use context::{MemoryHistory, NavigationType, Navigator, RouterContext};
pub use error::{ParamError, PatternError, QueryError, RouterError, SettingsError};
pub use params::{ParamMap, ParamTree, Scalar, normalize_params, params_from_json};
pub use pattern::{CaptureKind, CompiledPattern, ParamSlot};
pub use query::{FlatParam, MAX_ARRAY_INDEX, decode, encode, encode_pairs, flatten, unflatten};
pub use registry::{CompiledRoute, RegistryBuilder, RouteDefinition, RouteRegistry};
pub use resolver::{RouteMatch, split_url};
pub use settings::{RouteEntry, RouterSettings, UrlSettings};

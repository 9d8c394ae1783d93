//! URL routing for Waypost single-page applications.
//!
//! This crate compiles route templates, resolves browser URLs to named routes,
//! builds URLs from a route name and parameters, and encodes nested
//! parameters into flat query strings. See [`client_router`].

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod client_router;

/// Re-export commonly used types.
pub mod prelude {
	pub use crate::client_router::{
		MemoryHistory, Navigator, ParamMap, ParamTree, RouteMatch, RouteRegistry, RouterContext,
		RouterError, RouterSettings,
	};
}

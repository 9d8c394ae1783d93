//! # Waypost
//!
//! Client-side routing core for single-page applications.
//!
//! Waypost maps browser URLs to named routes and builds URLs back from a
//! route name and a parameter map. Nested parameters travel in the query
//! string as dotted keys (`filter.tags.0=a`).
//!
//! ## Feature Flags
//!
//! - `urls` (default) - Route registry, URL resolution and URL building
//!
//! ## Quick Example
//!
//! ```
//! use waypost::prelude::*;
//!
//! let registry = RouteRegistry::builder()
//!     .route("home", "/home/:id", "home_page")
//!     .build()
//!     .unwrap();
//!
//! let route_match = registry.resolve("/home/42?tab=posts").unwrap();
//! assert_eq!(route_match.name(), "home");
//! assert_eq!(route_match.param::<u32>("id").unwrap(), 42);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "urls")]
#[cfg_attr(docsrs, doc(cfg(feature = "urls")))]
pub use waypost_urls as urls;

/// Re-export commonly used types.
#[cfg(feature = "urls")]
#[cfg_attr(docsrs, doc(cfg(feature = "urls")))]
pub mod prelude {
	pub use waypost_urls::prelude::*;
}

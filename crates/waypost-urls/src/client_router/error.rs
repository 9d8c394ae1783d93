//! Error types for client-side routing.

/// Error raised while compiling a route template.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
	/// The same capture name appears twice in one template.
	#[error("Template '{template}' declares parameter '{name}' more than once")]
	DuplicateParam {
		/// The offending template.
		template: String,
		/// The repeated parameter name.
		name: String,
	},
	/// The generated regular expression was rejected by the regex engine.
	#[error("Failed to compile template '{template}': {message}")]
	InvalidRegex {
		/// The offending template.
		template: String,
		/// Message reported by the regex engine.
		message: String,
	},
}

/// Error raised while flattening parameters into a query string.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
	/// A float scalar was NaN or infinite.
	#[error("Query parameter '{key}' is not a finite number")]
	NonFiniteNumber {
		/// Dotted key of the rejected value.
		key: String,
	},
}

/// Error type for typed parameter extraction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
	/// The parameter is absent.
	#[error("Missing parameter: {0}")]
	Missing(String),
	/// The parameter holds an array or object.
	#[error("Parameter '{0}' is not a scalar value")]
	NotScalar(String),
	/// Failed to parse a parameter value.
	#[error("Failed to parse parameter '{name}' value '{raw}' as {type_name}: {message}")]
	Parse {
		/// Name of the parameter.
		name: String,
		/// Expected type name.
		type_name: &'static str,
		/// Raw string value that failed to parse.
		raw: String,
		/// Error message from parsing.
		message: String,
	},
}

/// Error type for router operations.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
	/// No route is registered under the given name.
	#[error("Unknown route: '{0}'")]
	UnknownRoute(String),
	/// Two definitions share a route name.
	#[error("Duplicate route name: '{0}'")]
	DuplicateRouteName(String),
	/// A path parameter required by the template was not supplied.
	#[error("Missing parameter '{param}' for route '{route}'")]
	MissingParameter {
		/// Route being built.
		route: String,
		/// Name of the missing parameter.
		param: String,
	},
	/// A path parameter value cannot be placed in the path (an array, an
	/// object, a non-finite number or a dot segment).
	#[error("Parameter '{param}' for route '{route}' is not a valid path value")]
	InvalidPathParameter {
		/// Route being built.
		route: String,
		/// Name of the offending parameter.
		param: String,
	},
	/// Template compilation failed.
	#[error(transparent)]
	Pattern(#[from] PatternError),
	/// Query encoding failed.
	#[error(transparent)]
	Query(#[from] QueryError),
	/// The navigation collaborator refused the URL.
	#[error("Navigation failed: {0}")]
	Navigation(String),
}

/// Error type for loading router settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	/// The TOML document could not be parsed.
	#[error("Invalid router settings: {0}")]
	Toml(#[from] toml::de::Error),
	/// The configured routes could not be compiled.
	#[error(transparent)]
	Router(#[from] RouterError),
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_param_error_display() {
		let err = ParamError::Parse {
			name: "id".to_string(),
			type_name: "i32",
			raw: "abc".to_string(),
			message: "invalid digit found in string".to_string(),
		};
		assert!(err.to_string().contains("'id'"));
		assert!(err.to_string().contains("abc"));
		assert!(err.to_string().contains("i32"));
	}

	#[rstest]
	fn test_router_error_display() {
		assert_eq!(
			RouterError::UnknownRoute("unknown".to_string()).to_string(),
			"Unknown route: 'unknown'"
		);
		assert_eq!(
			RouterError::MissingParameter {
				route: "home".to_string(),
				param: "id".to_string(),
			}
			.to_string(),
			"Missing parameter 'id' for route 'home'"
		);
	}

	#[rstest]
	fn test_pattern_error_is_transparent() {
		let err: RouterError = PatternError::DuplicateParam {
			template: "/a/:id/:id".to_string(),
			name: "id".to_string(),
		}
		.into();
		assert_eq!(
			err.to_string(),
			"Template '/a/:id/:id' declares parameter 'id' more than once"
		);
	}
}

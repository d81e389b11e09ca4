//! Error types for schemafixture
//!
//! This module defines all error types used throughout the library.
//! Generation and compilation failures are fatal and surface as [`Error`];
//! a failed runtime check is a recoverable [`ValidationError`].

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Result type alias using schemafixture Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for schemafixture operations
#[derive(Error, Debug)]
pub enum Error {
    /// A value failed a compiled validator
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A schema document could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The schema's `type` has no generation or validation strategy
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// A named type could not be resolved through the registry
    #[error("cannot resolve type '{0}'")]
    TypeResolution(String),

    /// The schema is malformed (e.g. `divisibleBy` of zero)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A string `format` has no generator
    #[error("unsupported string format '{0}'")]
    UnsupportedFormat(String),

    /// A `pattern` is not a valid or supported regular expression
    #[error("pattern error: {0}")]
    Pattern(String),

    /// Unique item generation ran out of attempts
    #[error("retry budget exceeded: {0}")]
    RetryBudgetExceeded(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a single constraint test, with enough context to report it
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Rendered message of the failing test
    pub message: String,
    /// Property the validator is bound to
    pub property: String,
    /// Offending value
    pub value: Value,
    /// Keyword of the failing test (e.g. `minimum`, `__isInt`)
    pub keyword: Option<String>,
    /// Bound declared by the schema for that keyword
    pub expected: Option<Value>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            property: String::new(),
            value: Value::Null,
            keyword: None,
            expected: None,
        }
    }

    /// Set the property name
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = property.into();
        self
    }

    /// Set the offending value
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    /// Set the failing keyword
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Set the expected bound
    pub fn with_expected(mut self, expected: Value) -> Self {
        self.expected = Some(expected);
        self
    }
}

/// Display a JSON value the way messages quote it: strings unquoted
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is an invalid {} value: {}",
            display_value(&self.value),
            self.property,
            self.message
        )
    }
}

impl std::error::Error for ValidationError {}

/// Schema document parsing error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Keyword path inside the document (e.g. `properties.age.minimum`)
    pub location: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, " (at {})", loc)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

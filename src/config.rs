//! Generator configuration
//!
//! Default ranges used when a schema leaves a bound undeclared, plus the
//! [`Limits`] that cap every retry loop. Deserializable from JSON so the CLI
//! can override any subset of fields.

use crate::error::Result;
use crate::limits::Limits;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for [`ValueGenerator`](crate::generators::ValueGenerator)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GeneratorConfig {
    /// Default `[minimum, maximum]` for numbers and integers
    pub number_range: (i64, i64),
    /// Default `[minLength, maxLength]` for free-form strings
    pub string_range: (usize, usize),
    /// Default `[minItems, maxItems]` for arrays
    pub array_range: (usize, usize),
    /// Probability that a non-required property is generated
    pub optional_probability: f64,
    /// Retry budgets and depth caps
    pub limits: Limits,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            number_range: (-50, 50),
            string_range: (7, 15),
            array_range: (5, 10),
            optional_probability: 0.3,
            limits: Limits::default(),
        }
    }
}

impl GeneratorConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the probability of emitting optional properties
    pub fn with_optional_probability(mut self, probability: f64) -> Self {
        self.optional_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Load a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

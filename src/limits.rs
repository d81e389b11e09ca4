//! Limits and retry budgets for fixture generation
//!
//! Every search that could fail to converge is bounded by one of these
//! limits. Exhausting `unique_item_attempts` is fatal; exhausting
//! `invalid_pattern_trials` only shortens the result.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Global limits configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Limits {
    /// Retries allowed per slot when generating a `uniqueItems` array
    pub unique_item_attempts: usize,

    /// Candidates drawn when searching for strings that miss a pattern
    pub invalid_pattern_trials: usize,

    /// Non-matching strings to collect for a pattern
    pub invalid_pattern_samples: usize,

    /// Extra repetitions allowed for `*`, `+` and `{n,}` in patterns
    pub pattern_repeat_limit: u32,

    /// Maximum nesting of generated objects and arrays
    pub max_depth: usize,

    /// Maximum schema file size in bytes
    pub max_schema_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            unique_item_attempts: 100,
            invalid_pattern_trials: 100,
            invalid_pattern_samples: 10,
            pattern_repeat_limit: 10,
            max_depth: 32,
            max_schema_size: 10 * 1024 * 1024, // 10 MB
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            unique_item_attempts: 20,
            invalid_pattern_trials: 20,
            invalid_pattern_samples: 3,
            pattern_repeat_limit: 3,
            max_depth: 8,
            max_schema_size: 1024 * 1024, // 1 MB
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            unique_item_attempts: 10_000,
            invalid_pattern_trials: 10_000,
            invalid_pattern_samples: 100,
            pattern_repeat_limit: 100,
            max_depth: 256,
            max_schema_size: 100 * 1024 * 1024, // 100 MB
        }
    }

    /// Check if the retries spent on one unique item are within budget
    pub fn check_unique_attempts(&self, attempts: usize) -> Result<()> {
        if attempts > self.unique_item_attempts {
            Err(Error::RetryBudgetExceeded(format!(
                "failed to generate a unique item after {} attempts",
                self.unique_item_attempts
            )))
        } else {
            Ok(())
        }
    }

    /// Check if generation depth is within limits
    pub fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            Err(Error::LimitExceeded(format!(
                "schema nesting depth {} exceeds maximum {}",
                depth, self.max_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if a schema file size is within limits
    pub fn check_schema_size(&self, size: usize) -> Result<()> {
        if size > self.max_schema_size {
            Err(Error::LimitExceeded(format!(
                "schema size {} bytes exceeds maximum {} bytes",
                size, self.max_schema_size
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.unique_item_attempts, 100);
        assert_eq!(limits.invalid_pattern_trials, 100);
        assert_eq!(limits.invalid_pattern_samples, 10);
        assert!(limits.check_unique_attempts(100).is_ok());
        assert!(matches!(
            limits.check_unique_attempts(101),
            Err(Error::RetryBudgetExceeded(_))
        ));
    }

    #[test]
    fn test_strict_limits() {
        let limits = Limits::strict();
        assert!(limits.max_depth < Limits::default().max_depth);
        assert!(limits.check_depth(9).is_err());
    }

    #[test]
    fn test_permissive_limits() {
        let limits = Limits::permissive();
        assert!(limits.max_depth > Limits::default().max_depth);
        assert!(limits.check_depth(200).is_ok());
    }

    #[test]
    fn test_check_schema_size() {
        let limits = Limits::default();
        assert!(limits.check_schema_size(1024).is_ok());
        assert!(matches!(
            limits.check_schema_size(200 * 1024 * 1024),
            Err(Error::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let limits: Limits = serde_json::from_str(r#"{"unique_item_attempts": 5}"#).unwrap();
        assert_eq!(limits.unique_item_attempts, 5);
        assert_eq!(limits.invalid_pattern_trials, 100);
    }
}

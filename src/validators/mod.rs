//! Runtime validators
//!
//! This module contains the constraint test tables and the compiler that
//! combines them into per-property validators.

pub mod compiler;
pub mod facets;

// Re-exports
pub use compiler::{CompiledValidator, PropertyValidators, ValidatorCompiler};
pub use facets::{ConstraintTest, NumericBound, NumericBounds, TestTable};

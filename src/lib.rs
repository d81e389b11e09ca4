//! # schemafixture
//!
//! Schema-constrained fixture generation and validation for JSON-Schema-like
//! API definitions.
//!
//! Three components share one reading of every constraint keyword:
//!
//! - [`ValueGenerator`] synthesizes a value that satisfies a schema
//! - [`InvalidValueGenerator`] synthesizes values that violate it
//! - [`ValidatorCompiler`] turns a schema fragment into a runtime validator
//!
//! Named types are resolved through a [`SchemaRegistry`].
//!
//! ## Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use schemafixture::{Schema, ValidatorCompiler, ValueGenerator};
//! use serde_json::json;
//!
//! let schema = Schema::from_value(&json!({
//!     "type": "integer", "minimum": 0, "maximum": 6, "divisibleBy": 2
//! }))?;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let value = ValueGenerator::new().generate(&schema, &mut rng)?;
//!
//! let validator = ValidatorCompiler::new().compile("count", &schema)?;
//! assert!(validator.map_or(true, |v| v.is_valid(&value)));
//! # Ok::<(), schemafixture::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod config;
pub mod error;
pub mod limits;

// Schema model and storage
pub mod loaders;
pub mod registry;
pub mod schema;

// Validation and generation
pub mod generators;
pub mod validators;

// Re-exports for convenience
pub use config::GeneratorConfig;
pub use error::{Error, ParseError, Result, ValidationError};
pub use generators::{random_schema, InvalidValueGenerator, ValueGenerator};
pub use limits::Limits;
pub use registry::{SchemaForm, SchemaRegistry};
pub use schema::{Schema, SchemaKind, SchemaRef};
pub use validators::{CompiledValidator, ValidatorCompiler};

/// Version of the schemafixture library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

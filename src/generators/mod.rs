//! Fixture generators
//!
//! [`ValueGenerator`] produces values a schema accepts and
//! [`InvalidValueGenerator`] produces values it rejects. Strings come from a
//! `format` generator, a regex synthesizer, or a plain character draw.

pub mod formats;
pub mod invalid;
pub mod pattern;
pub mod random_schema;
pub mod values;

// Re-exports
pub use formats::StringFormat;
pub use invalid::InvalidValueGenerator;
pub use pattern::PatternGenerator;
pub use random_schema::random_schema;
pub use values::ValueGenerator;

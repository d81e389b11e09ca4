//! Random object schemas, used to fuzz the generators against the validators

use crate::error::Result;
use crate::generators::pattern::PatternGenerator;
use crate::schema::{ObjectSchema, Schema, SchemaKind, SchemaRef, BASIC_TYPES};
use rand::Rng;

const SCHEMA_NAME_PATTERN: &str = "^[a-zA-Z]{15}$";
const PROPERTY_NAME_PATTERN: &str = "^[a-zA-Z][a-zA-Z]{1,7}$";
const MAX_PROPERTIES: usize = 5;
const NAME_ATTEMPTS: usize = 100;

/// An object schema with a random name and 1 to 5 properties of basic types,
/// each required with probability one half
pub fn random_schema<R: Rng + ?Sized>(rng: &mut R) -> Result<Schema> {
    let schema_name = PatternGenerator::new(SCHEMA_NAME_PATTERN, 0)?.generate(rng);
    let property_names = PatternGenerator::new(PROPERTY_NAME_PATTERN, 0)?;

    let mut object = ObjectSchema::default();
    let count = rng.gen_range(1..=MAX_PROPERTIES);
    for _ in 0..count {
        let name = (0..NAME_ATTEMPTS)
            .map(|_| property_names.generate(rng))
            .find(|name| !object.properties.contains_key(name));
        let Some(name) = name else {
            continue;
        };

        let type_name = BASIC_TYPES[rng.gen_range(0..BASIC_TYPES.len())];
        if rng.gen_bool(0.5) {
            object.required.insert(name.clone());
        }
        object
            .properties
            .insert(name, SchemaRef::Named(type_name.to_string()));
    }

    Ok(Schema::new(SchemaKind::Object(object)).with_name(schema_name))
}

//! Invalid value generation
//!
//! [`InvalidValueGenerator`] returns a list of values that a validator
//! compiled from the same schema must reject. Each list mixes fixed pools of
//! near-miss literals (values a lenient parser might coerce) with values
//! derived from the declared constraints.

use crate::error::{Error, Result};
use crate::generators::values::{random_chars, ValueGenerator};
use crate::registry::SchemaRegistry;
use crate::schema::{
    ArraySchema, IntegerSchema, NumberSchema, ObjectSchema, Schema, SchemaKind, StringSchema,
};
use crate::validators::facets::start_anchored;
use rand::Rng;
use serde_json::{json, Value};
use tracing::debug;

const BOUND_OFFSET: i64 = 7;
const MAX_SAMPLE_LENGTH: usize = 100;

/// Digits, letters, punctuation and whitespace
const PRINTABLE: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ\
!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~ \t\n\r\x0b\x0c";

/// Boolean-looking strings, plus `0` and `1` unless the target is numeric
fn boolean_pool(numeric: bool) -> Vec<Value> {
    let mut pool = vec![json!("TRUE"), json!("FALSE"), json!("true "), json!("false ")];
    if !numeric {
        pool.extend([json!(0), json!(1)]);
    }
    pool
}

fn integer_pool() -> Vec<Value> {
    [
        "1.0",
        "0.0",
        "-0.9999999999999",
        "0.9999999999999",
        "1 ",
        " 34",
        "45 67",
        " 65 9 ",
        "45 str",
        "45str",
        "str 5",
        "str5",
    ]
    .iter()
    .map(|s| json!(s))
    .collect()
}

fn number_pool() -> Vec<Value> {
    ["1.23 ", " 123.45", " 123.45 ", "123str.45"]
        .iter()
        .map(|s| json!(s))
        .collect()
}

fn non_string_pool() -> Vec<Value> {
    [" ", "'", "&&", "||", "\u{2603}", ">", "</", "<!--", "*", ".", ""]
        .iter()
        .map(|s| json!(s))
        .collect()
}

/// Generates values that violate a schema
#[derive(Debug, Clone, Default)]
pub struct InvalidValueGenerator<'r> {
    values: ValueGenerator<'r>,
}

impl<'r> InvalidValueGenerator<'r> {
    /// Build on a valid-value generator, sharing its registry and configuration
    pub fn new(values: ValueGenerator<'r>) -> Self {
        Self { values }
    }

    /// Resolve named types through `registry`
    pub fn with_registry(mut self, registry: &'r SchemaRegistry) -> Self {
        self.values = self.values.with_registry(registry);
        self
    }

    /// Values the schema must reject.
    ///
    /// The list may contain duplicates and may be empty when the schema
    /// declares nothing to violate.
    pub fn generate<R: Rng + ?Sized>(&self, schema: &Schema, rng: &mut R) -> Result<Vec<Value>> {
        match &schema.kind {
            SchemaKind::Boolean => {
                let mut invalid = boolean_pool(false);
                invalid.extend(integer_pool());
                invalid.extend(number_pool());
                invalid.extend(non_string_pool());
                Ok(invalid)
            }
            SchemaKind::Number(n) => Ok(self.number(n)),
            SchemaKind::Integer(i) => self.integer(i),
            SchemaKind::String(s) => self.string(s, rng),
            SchemaKind::Array(a) => self.array(a, rng),
            SchemaKind::Object(o) => self.object(schema, o, rng),
        }
    }

    /// Invalid values for a basic type name or a registered schema
    pub fn generate_named<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> Result<Vec<Value>> {
        let schema = crate::registry::resolve_name(self.values.registry(), name)?;
        self.generate(&schema, rng)
    }

    fn number(&self, schema: &NumberSchema) -> Vec<Value> {
        let mut invalid = non_string_pool();
        invalid.extend(number_pool());
        invalid.extend(boolean_pool(true));

        let offset = BOUND_OFFSET as f64;
        if let Some(min) = schema.minimum {
            invalid.push(Value::from(min - offset));
            if schema.exclusive_minimum {
                invalid.push(Value::from(min));
            }
        }
        if let Some(max) = schema.maximum {
            invalid.push(Value::from(max + offset));
            if schema.exclusive_maximum {
                invalid.push(Value::from(max));
            }
        }
        invalid
    }

    fn integer(&self, schema: &IntegerSchema) -> Result<Vec<Value>> {
        let mut invalid = non_string_pool();
        invalid.extend(number_pool());
        invalid.extend(boolean_pool(true));

        if let Some(min) = schema.minimum {
            if let Some(below) = min.checked_sub(BOUND_OFFSET) {
                invalid.push(Value::from(below));
            }
            if schema.exclusive_minimum {
                invalid.push(Value::from(min));
            }
        }
        if let Some(max) = schema.maximum {
            if let Some(above) = max.checked_add(BOUND_OFFSET) {
                invalid.push(Value::from(above));
            }
            if schema.exclusive_maximum {
                invalid.push(Value::from(max));
            }
        }

        invalid.extend(integer_pool());

        if let Some(divisor) = schema.divisible_by {
            if divisor == 0 {
                return Err(Error::Configuration(
                    "can't generate a number divisible by 0".into(),
                ));
            }
            // every integer is a multiple of 1
            if divisor.abs() > 1 {
                let d = i128::from(divisor);
                let mut candidate = d * 7 + 4;
                if candidate % d == 0 {
                    candidate = d * 7 + 1;
                }
                if let Ok(candidate) = i64::try_from(candidate) {
                    invalid.push(Value::from(candidate));
                }
            }
        }

        Ok(invalid)
    }

    fn string<R: Rng + ?Sized>(&self, schema: &StringSchema, rng: &mut R) -> Result<Vec<Value>> {
        let mut invalid = Vec::new();

        if let Some(max) = schema.max_length {
            invalid.push(Value::from(random_chars(max + 1, rng)));
        }
        if let Some(min) = schema.min_length {
            if min > 0 {
                invalid.push(Value::from(random_chars(min - 1, rng)));
            }
        }

        if let Some(ref pattern) = schema.pattern {
            let regex = start_anchored(pattern)?;
            let empty = Value::from("");
            if !regex.is_match("") && !invalid.contains(&empty) {
                invalid.push(empty);
            }

            let limits = &self.values.config().limits;
            let mut found = 0;
            for _ in 0..limits.invalid_pattern_trials {
                if found == limits.invalid_pattern_samples {
                    break;
                }
                let len = rng.gen_range(0..=MAX_SAMPLE_LENGTH);
                let candidate: String = (0..len)
                    .map(|_| char::from(PRINTABLE[rng.gen_range(0..PRINTABLE.len())]))
                    .collect();
                if regex.is_match(&candidate) {
                    continue;
                }
                let candidate = Value::from(candidate);
                if !invalid.contains(&candidate) {
                    invalid.push(candidate);
                    found += 1;
                }
            }
            if found < limits.invalid_pattern_samples {
                debug!(pattern = %pattern, found, "few strings found outside pattern");
            }
        }

        Ok(invalid)
    }

    fn array<R: Rng + ?Sized>(&self, schema: &ArraySchema, rng: &mut R) -> Result<Vec<Value>> {
        let mut invalid = Vec::new();

        if let Some(min) = schema.min_items {
            if min > 0 {
                if let Some(items) = self.items_or_skip(schema, min - 1, rng)? {
                    invalid.push(Value::Array(items));
                }
            }
        }
        if let Some(max) = schema.max_items {
            if let Some(items) = self.items_or_skip(schema, max + 1, rng)? {
                invalid.push(Value::Array(items));
            }
        }

        if schema.unique_items {
            let count = schema.min_items.unwrap_or(0).max(2);
            if schema.max_items.map_or(true, |max| count <= max) {
                let mut items = self
                    .values
                    .items(&schema.items, count - 1, false, rng, 0)?;
                if let Some(first) = items.first().cloned() {
                    items.push(first);
                    invalid.push(Value::Array(items));
                }
            }
        }

        Ok(invalid)
    }

    /// Items that honour `uniqueItems` so that only the length is wrong;
    /// `None` when the item domain is too small for that many
    fn items_or_skip<R: Rng + ?Sized>(
        &self,
        schema: &ArraySchema,
        count: usize,
        rng: &mut R,
    ) -> Result<Option<Vec<Value>>> {
        match self.values.items(&schema.items, count, schema.unique_items, rng, 0) {
            Ok(items) => Ok(Some(items)),
            Err(Error::RetryBudgetExceeded(reason)) => {
                debug!(count, %reason, "skipping array length violation");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn object<R: Rng + ?Sized>(
        &self,
        schema: &Schema,
        object: &ObjectSchema,
        rng: &mut R,
    ) -> Result<Vec<Value>> {
        let mut invalid = Vec::with_capacity(object.required.len());
        for name in &object.required {
            let mut value = self.values.generate(schema, rng)?;
            if let Some(map) = value.as_object_mut() {
                map.remove(name);
            }
            invalid.push(value);
        }
        Ok(invalid)
    }
}

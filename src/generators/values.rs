//! Valid value generation
//!
//! [`ValueGenerator`] produces a JSON value that satisfies every constraint a
//! schema declares. Dispatch is an exhaustive match over [`SchemaKind`]; named
//! types are resolved through the registry.
//!
//! The generator holds no random state: every call takes the caller's
//! [`Rng`], so a seeded `StdRng` replays the same fixtures.

use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::generators::formats::StringFormat;
use crate::generators::pattern::PatternGenerator;
use crate::registry::{resolve_name, resolve_ref, SchemaRegistry};
use crate::schema::{
    ArraySchema, IntegerSchema, NumberSchema, ObjectSchema, Schema, SchemaKind, SchemaRef,
    StringSchema,
};
use rand::Rng;
use serde_json::{Map, Value};
use std::ops::{Add, Sub};
use tracing::warn;

/// Characters of free-form strings
pub const STRING_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 ";

const EXCLUSIVE_REDRAWS: usize = 8;

/// Generates values that satisfy a schema
#[derive(Debug, Clone, Default)]
pub struct ValueGenerator<'r> {
    registry: Option<&'r SchemaRegistry>,
    config: GeneratorConfig,
}

impl<'r> ValueGenerator<'r> {
    /// Create a generator with default configuration and no registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve named types through `registry`
    pub fn with_registry(mut self, registry: &'r SchemaRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Registry used for named types
    pub fn registry(&self) -> Option<&'r SchemaRegistry> {
        self.registry
    }

    /// Generate a value satisfying `schema`
    pub fn generate<R: Rng + ?Sized>(&self, schema: &Schema, rng: &mut R) -> Result<Value> {
        self.generate_at(schema, rng, 0)
    }

    /// Generate a value for a nested reference
    pub fn generate_ref<R: Rng + ?Sized>(
        &self,
        reference: &SchemaRef,
        rng: &mut R,
    ) -> Result<Value> {
        let schema = resolve_ref(self.registry, reference)?;
        self.generate_at(&schema, rng, 0)
    }

    /// Generate a value for a basic type name or a registered schema
    pub fn generate_named<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> Result<Value> {
        let schema = resolve_name(self.registry, name)?;
        self.generate_at(&schema, rng, 0)
    }

    fn generate_at<R: Rng + ?Sized>(
        &self,
        schema: &Schema,
        rng: &mut R,
        depth: usize,
    ) -> Result<Value> {
        self.config.limits.check_depth(depth)?;

        // enum overrides every other keyword
        if let Some(ref values) = schema.enumeration {
            if values.is_empty() {
                return Err(Error::Configuration("enum must list at least one value".into()));
            }
            return Ok(values[rng.gen_range(0..values.len())].clone());
        }

        match &schema.kind {
            SchemaKind::String(s) => self.string(s, rng).map(Value::from),
            SchemaKind::Boolean => Ok(Value::Bool(rng.gen())),
            SchemaKind::Number(n) => self.number(n, rng),
            SchemaKind::Integer(i) => self.integer(i, rng).map(Value::from),
            SchemaKind::Array(a) => self.array(a, rng, depth),
            SchemaKind::Object(o) => self.object(o, rng, depth),
        }
    }

    /// Uniform draw from `[minimum, maximum]`
    pub fn number<R: Rng + ?Sized>(&self, schema: &NumberSchema, rng: &mut R) -> Result<Value> {
        let (default_min, default_max) = self.config.number_range;
        let (min, max) = numeric_range(
            schema.minimum,
            schema.maximum,
            (default_min as f64, default_max as f64),
        );
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::Configuration("number bounds must be finite".into()));
        }

        let excluded = |v: f64| {
            (schema.exclusive_minimum && schema.minimum == Some(v))
                || (schema.exclusive_maximum && schema.maximum == Some(v))
        };

        let mut value = uniform_f64(min, max, rng);
        for _ in 0..EXCLUSIVE_REDRAWS {
            if !excluded(value) {
                break;
            }
            value = uniform_f64(min, max, rng);
        }
        if excluded(value) && min < max {
            value = min / 2.0 + max / 2.0;
        }

        Ok(Value::from(value))
    }

    /// Uniform multiple of `divisibleBy` within the (narrowed) bounds
    pub fn integer<R: Rng + ?Sized>(&self, schema: &IntegerSchema, rng: &mut R) -> Result<i64> {
        let (default_min, default_max) = self.config.number_range;
        let (min, max) = numeric_range(
            schema.minimum.map(i128::from),
            schema.maximum.map(i128::from),
            (i128::from(default_min), i128::from(default_max)),
        );
        let mut min = min.max(i128::from(i64::MIN));
        let mut max = max.min(i128::from(i64::MAX));
        if schema.exclusive_minimum {
            min += 1;
        }
        if schema.exclusive_maximum {
            max -= 1;
        }

        let divisor = schema.divisible_by.unwrap_or(1);
        if divisor == 0 {
            return Err(Error::Configuration(
                "can't generate a number divisible by 0".into(),
            ));
        }
        let step = i128::from(divisor).abs();

        // smallest and largest multipliers that keep k * step inside the bounds
        let mut low = -(-min).div_euclid(step);
        let mut high = max.div_euclid(step);
        if low > high {
            // keep the declared side; only a defaulted bound may be crossed
            if schema.minimum.is_none() && schema.maximum.is_some() {
                low = high;
            } else {
                high = low;
            }
        }

        let value = rng.gen_range(low..=high) * step;
        i64::try_from(value)
            .map_err(|_| Error::Configuration(format!("{} does not fit in an integer", value)))
    }

    /// String by priority: `format`, then `pattern`, then free-form length
    pub fn string<R: Rng + ?Sized>(&self, schema: &StringSchema, rng: &mut R) -> Result<String> {
        if let Some(ref format) = schema.format {
            return format.parse::<StringFormat>()?.generate(rng);
        }

        if let Some(ref pattern) = schema.pattern {
            let generator =
                PatternGenerator::new(pattern, self.config.limits.pattern_repeat_limit)?;
            return Ok(generator.generate(rng));
        }

        let (min, max) =
            effective_range(schema.min_length, schema.max_length, self.config.string_range);
        let len = rng.gen_range(min..=max);
        Ok(random_chars(len, rng))
    }

    fn array<R: Rng + ?Sized>(
        &self,
        schema: &ArraySchema,
        rng: &mut R,
        depth: usize,
    ) -> Result<Value> {
        let (min, max) =
            effective_range(schema.min_items, schema.max_items, self.config.array_range);
        let count = rng.gen_range(min..=max);
        let items = self.items(&schema.items, count, schema.unique_items, rng, depth)?;
        Ok(Value::Array(items))
    }

    /// `count` values of the item schema; with `unique`, each slot is
    /// rejection-sampled against the previous ones within the retry budget
    pub(crate) fn items<R: Rng + ?Sized>(
        &self,
        reference: &SchemaRef,
        count: usize,
        unique: bool,
        rng: &mut R,
        depth: usize,
    ) -> Result<Vec<Value>> {
        let item_schema = resolve_ref(self.registry, reference)?;
        let mut items = Vec::with_capacity(count);

        for _ in 0..count {
            let mut item = self.generate_at(&item_schema, rng, depth + 1)?;
            if unique {
                let mut retries = 0;
                while items.contains(&item) {
                    retries += 1;
                    if let Err(e) = self.config.limits.check_unique_attempts(retries) {
                        warn!(generated = items.len(), requested = count, "unique items exhausted");
                        return Err(e);
                    }
                    item = self.generate_at(&item_schema, rng, depth + 1)?;
                }
            }
            items.push(item);
        }

        Ok(items)
    }

    fn object<R: Rng + ?Sized>(
        &self,
        schema: &ObjectSchema,
        rng: &mut R,
        depth: usize,
    ) -> Result<Value> {
        let mut object = Map::new();

        for (name, reference) in &schema.properties {
            let include =
                schema.is_required(name) || rng.gen::<f64>() < self.config.optional_probability;
            if include {
                let property = resolve_ref(self.registry, reference)?;
                object.insert(name.clone(), self.generate_at(&property, rng, depth + 1)?);
            }
        }

        Ok(Value::Object(object))
    }
}

/// Declared length bounds with defaults filled in.
///
/// An inverted range collapses onto the declared bound: onto `max` when only
/// the maximum was declared, onto `min` otherwise.
fn effective_range<T: PartialOrd + Copy>(
    min: Option<T>,
    max: Option<T>,
    defaults: (T, T),
) -> (T, T) {
    let low = min.unwrap_or(defaults.0);
    let high = max.unwrap_or(defaults.1);
    if low <= high {
        (low, high)
    } else if min.is_none() {
        (high, high)
    } else {
        (low, low)
    }
}

/// Declared numeric bounds with defaults filled in.
///
/// A lone bound on or beyond the edge of the default interval shifts the
/// interval so it ends (or starts) at that bound, keeping the default width.
/// Exclusive and divisor narrowing then still has room to land inside the
/// declared bound.
/// Two declared bounds that are inverted collapse onto the minimum.
fn numeric_range<T>(min: Option<T>, max: Option<T>, defaults: (T, T)) -> (T, T)
where
    T: PartialOrd + Copy + Add<Output = T> + Sub<Output = T>,
{
    let (default_min, default_max) = defaults;
    let width = if default_max > default_min {
        default_max - default_min
    } else {
        default_min - default_min
    };

    let (low, high) = match (min, max) {
        (Some(low), None) if low >= default_max => (low, low + width),
        (None, Some(high)) if high <= default_min => (high - width, high),
        _ => (min.unwrap_or(default_min), max.unwrap_or(default_max)),
    };
    if low <= high {
        (low, high)
    } else {
        (low, low)
    }
}

/// Uniform draw from `[min, max]`, including spans wider than `f64::MAX`
fn uniform_f64<R: Rng + ?Sized>(min: f64, max: f64, rng: &mut R) -> f64 {
    if (max - min).is_finite() {
        return rng.gen_range(min..=max);
    }
    let t: f64 = rng.gen();
    (min * (1.0 - t) + max * t).clamp(min, max)
}

/// `len` characters drawn from [`STRING_CHARSET`]
pub fn random_chars<R: Rng + ?Sized>(len: usize, rng: &mut R) -> String {
    (0..len)
        .map(|_| char::from(STRING_CHARSET[rng.gen_range(0..STRING_CHARSET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::ValidatorCompiler;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn schema(document: Value) -> Schema {
        Schema::from_value(&document).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_number_within_bounds() {
        let generator = ValueGenerator::new();
        let s = schema(json!({"type": "number", "minimum": 1.5, "maximum": 2.5}));
        let mut rng = rng();
        for _ in 0..100 {
            let v = generator.generate(&s, &mut rng).unwrap().as_f64().unwrap();
            assert!((1.5..=2.5).contains(&v));
        }
    }

    #[test]
    fn test_number_lone_minimum_above_default_maximum() {
        let generator = ValueGenerator::new();
        // maximum defaults to 50
        let s = schema(json!({"type": "number", "minimum": 60, "exclusiveMinimum": true}));
        let mut rng = rng();
        for _ in 0..100 {
            let v = generator.generate(&s, &mut rng).unwrap().as_f64().unwrap();
            assert!(v > 60.0 && v <= 160.0, "{}", v);
        }
    }

    #[test]
    fn test_lone_maximum_below_default_minimum_keeps_room() {
        let generator = ValueGenerator::new();
        let compiler = ValidatorCompiler::new();
        let schemas = [
            json!({"type": "integer", "maximum": -60, "exclusiveMaximum": true}),
            json!({"type": "integer", "maximum": -55, "divisibleBy": 10}),
            json!({"type": "number", "maximum": -60, "exclusiveMaximum": true}),
        ];
        let mut rng = StdRng::seed_from_u64(1);

        for document in schemas {
            let s = schema(document.clone());
            let validator = compiler.compile("value", &s).unwrap().unwrap();
            for _ in 0..50 {
                let v = generator.generate(&s, &mut rng).unwrap();
                assert!(validator.is_valid(&v), "{} generated {}", document, v);
            }
        }

        let s = schema(json!({"type": "integer", "maximum": -55, "divisibleBy": 10}));
        let v = generator.generate(&s, &mut rng).unwrap().as_i64().unwrap();
        assert!((-150..=-60).contains(&v));
    }

    #[test]
    fn test_integer_lone_bound_inside_default_range() {
        let generator = ValueGenerator::new();
        let mut rng = rng();

        let s = schema(json!({
            "type": "integer", "maximum": -45, "exclusiveMaximum": true, "divisibleBy": 11
        }));
        assert_eq!(generator.generate(&s, &mut rng).unwrap(), json!(-55));

        let s = schema(json!({
            "type": "integer", "minimum": 45, "exclusiveMinimum": true, "divisibleBy": 11
        }));
        assert_eq!(generator.generate(&s, &mut rng).unwrap(), json!(55));

        let s = schema(json!({"type": "number", "maximum": -50, "exclusiveMaximum": true}));
        let v = generator.generate(&s, &mut rng).unwrap().as_f64().unwrap();
        assert!(v < -50.0);
    }

    #[test]
    fn test_integer_lone_bound_near_type_limit() {
        let generator = ValueGenerator::new();
        let s = schema(json!({"type": "integer", "maximum": i64::MIN + 3}));
        let mut rng = rng();
        for _ in 0..50 {
            let v = generator.generate(&s, &mut rng).unwrap().as_i64().unwrap();
            assert!(v <= i64::MIN + 3);
        }
    }

    #[test]
    fn test_number_span_wider_than_f64() {
        let generator = ValueGenerator::new();
        let s = schema(json!({"type": "number", "minimum": -1e308, "maximum": 1e308}));
        let mut rng = rng();
        for _ in 0..100 {
            let v = generator.generate(&s, &mut rng).unwrap().as_f64().unwrap();
            assert!(v.is_finite() && (-1e308..=1e308).contains(&v));
        }

        let s = schema(json!({
            "type": "number", "minimum": -1e308, "maximum": 1e308,
            "exclusiveMinimum": true, "exclusiveMaximum": true
        }));
        let v = generator.generate(&s, &mut rng).unwrap().as_f64().unwrap();
        assert!(v > -1e308 && v < 1e308);
    }

    #[test]
    fn test_declared_maximum_below_default_minimum() {
        let generator = ValueGenerator::new();
        let s = schema(json!({"type": "array", "maxItems": 2, "items": {"type": "boolean"}}));
        let v = generator.generate(&s, &mut rng()).unwrap();
        assert_eq!(v.as_array().unwrap().len(), 2);

        let s = schema(json!({"type": "string", "maxLength": 3}));
        assert_eq!(generator.generate(&s, &mut rng()).unwrap().as_str().unwrap().len(), 3);
    }

    #[test]
    fn test_both_bounds_inverted_collapse_to_minimum() {
        let generator = ValueGenerator::new();
        let s = schema(json!({"type": "integer", "minimum": 8, "maximum": 3}));
        assert_eq!(generator.generate(&s, &mut rng()).unwrap(), json!(8));
    }

    #[test]
    fn test_integer_divisible_with_exclusive_minimum() {
        let generator = ValueGenerator::new();
        let s = schema(json!({
            "type": "integer", "minimum": 0, "maximum": 6,
            "exclusiveMinimum": true, "divisibleBy": 2
        }));
        let mut rng = rng();
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            seen.insert(generator.generate(&s, &mut rng).unwrap().as_i64().unwrap());
        }
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec![2, 4, 6]);
    }

    #[test]
    fn test_integer_negative_divisor() {
        let generator = ValueGenerator::new();
        let s = schema(json!({"type": "integer", "divisibleBy": -23, "minimum": -69}));
        let mut rng = rng();
        for _ in 0..100 {
            let v = generator.generate(&s, &mut rng).unwrap().as_i64().unwrap();
            assert_eq!(v % 23, 0);
            assert!((-69..=50).contains(&v));
        }
    }

    #[test]
    fn test_integer_divisible_by_zero() {
        let generator = ValueGenerator::new();
        let s = schema(json!({"type": "integer", "divisibleBy": 0}));
        assert!(matches!(
            generator.generate(&s, &mut rng()),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_string_lengths() {
        let generator = ValueGenerator::new();
        let s = schema(json!({"type": "string", "minLength": 3, "maxLength": 7}));
        let mut rng = rng();
        for _ in 0..100 {
            let v = generator.generate(&s, &mut rng).unwrap();
            let len = v.as_str().unwrap().chars().count();
            assert!((3..=7).contains(&len));
        }
    }

    #[test]
    fn test_string_priority() {
        let generator = ValueGenerator::new();
        let mut rng = rng();

        let with_enum = schema(json!({
            "type": "string", "enum": ["a", "b"], "format": "date", "pattern": "^x$"
        }));
        let v = generator.generate(&with_enum, &mut rng).unwrap();
        assert!(v == json!("a") || v == json!("b"));

        let with_format = schema(json!({"type": "string", "format": "date", "pattern": "^x$"}));
        let v = generator.generate(&with_format, &mut rng).unwrap();
        assert_eq!(v.as_str().unwrap().len(), 10);

        let with_pattern = schema(json!({"type": "string", "pattern": "^x{3}$", "maxLength": 1}));
        assert_eq!(generator.generate(&with_pattern, &mut rng).unwrap(), json!("xxx"));
    }

    #[test]
    fn test_unknown_format_fails_loudly() {
        let generator = ValueGenerator::new();
        let s = schema(json!({"type": "string", "format": "credit-card"}));
        assert!(matches!(
            generator.generate(&s, &mut rng()),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_empty_enum() {
        let generator = ValueGenerator::new();
        let s = schema(json!({"type": "integer", "enum": []}));
        assert!(matches!(
            generator.generate(&s, &mut rng()),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_array_default_count() {
        let generator = ValueGenerator::new();
        let s = schema(json!({"type": "array", "items": {"type": "boolean"}}));
        let v = generator.generate(&s, &mut rng()).unwrap();
        let len = v.as_array().unwrap().len();
        assert!((5..=10).contains(&len));
    }

    #[test]
    fn test_unique_items_from_registry() {
        let mut registry = SchemaRegistry::new();
        registry.add(json!({
            "type": "integer", "name": "small_integer", "minimum": 0, "maximum": 9
        }));
        let generator = ValueGenerator::new().with_registry(&registry);
        let s = schema(json!({
            "type": "array", "uniqueItems": true, "minItems": 10,
            "items": {"type": "small_integer"}
        }));

        let v = generator.generate(&s, &mut rng()).unwrap();
        let mut items: Vec<i64> =
            v.as_array().unwrap().iter().map(|i| i.as_i64().unwrap()).collect();
        items.sort_unstable();
        assert_eq!(items, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_unique_items_budget_exceeded() {
        let generator = ValueGenerator::new();
        let s = schema(json!({
            "type": "array", "uniqueItems": true, "minItems": 3,
            "items": {"type": "boolean"}
        }));
        assert!(matches!(
            generator.generate(&s, &mut rng()),
            Err(Error::RetryBudgetExceeded(_))
        ));
    }

    #[test]
    fn test_unresolved_item_type() {
        let generator = ValueGenerator::new();
        let s = schema(json!({"type": "array", "items": {"type": "search_result"}}));
        assert!(matches!(
            generator.generate(&s, &mut rng()),
            Err(Error::TypeResolution(name)) if name == "search_result"
        ));
    }

    #[test]
    fn test_object_required_properties() {
        let generator = ValueGenerator::new()
            .with_config(GeneratorConfig::default().with_optional_probability(0.0));
        let s = schema(json!({
            "type": "object",
            "required": ["id"],
            "properties": {
                "id": {"type": "integer"},
                "title": {"type": "string", "required": true},
                "summary": {"type": "string"}
            }
        }));

        let v = generator.generate(&s, &mut rng()).unwrap();
        let object = v.as_object().unwrap();
        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["id", "title"]);
    }

    #[test]
    fn test_object_optional_properties_always() {
        let generator = ValueGenerator::new()
            .with_config(GeneratorConfig::default().with_optional_probability(1.0));
        let s = schema(json!({
            "type": "object",
            "properties": {"a": {"type": "boolean"}, "b": {"type": "number"}}
        }));
        let v = generator.generate(&s, &mut rng()).unwrap();
        assert_eq!(v.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_recursive_schema_hits_depth_limit() {
        let mut registry = SchemaRegistry::new();
        registry.add(json!({
            "name": "node",
            "type": "object",
            "properties": {"next": {"type": "node", "required": true}}
        }));
        let generator = ValueGenerator::new().with_registry(&registry);
        assert!(matches!(
            generator.generate_named("node", &mut rng()),
            Err(Error::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_generate_named_basic_type() {
        let generator = ValueGenerator::new();
        assert!(generator.generate_named("boolean", &mut rng()).unwrap().is_boolean());
        assert!(matches!(
            generator.generate_named("book", &mut rng()),
            Err(Error::TypeResolution(_))
        ));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let generator = ValueGenerator::new();
        let s = schema(json!({
            "type": "object",
            "properties": {"a": {"type": "string"}, "b": {"type": "integer", "required": true}}
        }));
        let first = generator.generate(&s, &mut StdRng::seed_from_u64(9)).unwrap();
        let second = generator.generate(&s, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(first, second);
    }
}

//! Constraint test tables
//!
//! Each schema type has a table mapping a keyword to a [`ConstraintTest`]: a
//! predicate over the candidate value plus a message template. Tables always
//! contain every keyword of their type; a test whose keyword the schema does
//! not declare carries no bound and is dropped by the compiler. Keywords
//! starting with `__` are internal shape checks that always apply.
//!
//! Message templates understand three placeholders: `{test_type}` (the
//! keyword), `{test_value}` (the declared bound) and `{value}`.

use crate::error::{display_value, Error, Result};
use crate::schema::{
    ArraySchema, IntegerSchema, NumberSchema, ObjectSchema, Schema, SchemaKind, StringSchema,
};
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Prefix of keywords that are checked whether or not the schema declares them
pub const INTERNAL_PREFIX: &str = "__";

/// Predicate of a constraint test
pub type Predicate = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// Tests of one schema, ordered by keyword
pub type TestTable = BTreeMap<&'static str, ConstraintTest>;

// =============================================================================
// Constraint Test
// =============================================================================

/// A keyword's predicate and the message reported when it fails
pub struct ConstraintTest {
    keyword: &'static str,
    bound: Option<Value>,
    predicate: Predicate,
    message: &'static str,
}

impl ConstraintTest {
    /// Internal shape check, always active
    pub fn internal(
        keyword: &'static str,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
        message: &'static str,
    ) -> Self {
        debug_assert!(keyword.starts_with(INTERNAL_PREFIX));
        Self {
            keyword,
            bound: None,
            predicate: Box::new(predicate),
            message,
        }
    }

    /// Keyword test, active when `bound` is declared
    pub fn keyword(
        keyword: &'static str,
        bound: Option<Value>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
        message: &'static str,
    ) -> Self {
        Self {
            keyword,
            bound,
            predicate: Box::new(predicate),
            message,
        }
    }

    /// Keyword of this test
    pub fn name(&self) -> &'static str {
        self.keyword
    }

    /// Bound declared by the schema, if any
    pub fn bound(&self) -> Option<&Value> {
        self.bound.as_ref()
    }

    /// Whether this is an internal shape check
    pub fn is_internal(&self) -> bool {
        self.keyword.starts_with(INTERNAL_PREFIX)
    }

    /// Whether the compiled validator keeps this test
    pub fn applies(&self) -> bool {
        self.is_internal() || self.bound.is_some()
    }

    /// Run the predicate
    pub fn check(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }

    /// Render the message template for a failing value
    pub fn message(&self, value: &Value) -> String {
        let bound = self
            .bound
            .as_ref()
            .map(display_value)
            .unwrap_or_else(|| "None".to_string());
        self.message
            .replace("{test_type}", self.keyword)
            .replace("{test_value}", &bound)
            .replace("{value}", &display_value(value))
    }
}

impl fmt::Debug for ConstraintTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintTest")
            .field("keyword", &self.keyword)
            .field("bound", &self.bound)
            .field("message", &self.message)
            .finish()
    }
}

// =============================================================================
// Numeric Bounds
// =============================================================================

/// Numeric bounds for validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericBound {
    /// Integer bound
    Integer(i64),
    /// Float bound
    Float(f64),
}

impl NumericBound {
    /// Order of `value` relative to this bound; `None` for non-numbers
    pub fn compare(&self, value: &Value) -> Option<Ordering> {
        match *self {
            NumericBound::Integer(bound) => {
                if let Some(v) = value.as_i64() {
                    Some(v.cmp(&bound))
                } else if value.is_u64() {
                    // only u64 values above i64::MAX land here
                    Some(Ordering::Greater)
                } else {
                    value.as_f64()?.partial_cmp(&(bound as f64))
                }
            }
            NumericBound::Float(bound) => value.as_f64()?.partial_cmp(&bound),
        }
    }

    /// JSON form of the bound
    pub fn to_value(&self) -> Value {
        match *self {
            NumericBound::Integer(v) => Value::from(v),
            NumericBound::Float(v) => Value::from(v),
        }
    }
}

impl fmt::Display for NumericBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericBound::Integer(v) => write!(f, "{}", v),
            NumericBound::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Bounds shared by `number` and `integer` schemas
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumericBounds {
    /// `minimum`
    pub minimum: Option<NumericBound>,
    /// `maximum`
    pub maximum: Option<NumericBound>,
    /// `exclusiveMinimum`
    pub exclusive_minimum: bool,
    /// `exclusiveMaximum`
    pub exclusive_maximum: bool,
}

impl From<&NumberSchema> for NumericBounds {
    fn from(schema: &NumberSchema) -> Self {
        Self {
            minimum: schema.minimum.map(NumericBound::Float),
            maximum: schema.maximum.map(NumericBound::Float),
            exclusive_minimum: schema.exclusive_minimum,
            exclusive_maximum: schema.exclusive_maximum,
        }
    }
}

impl From<&IntegerSchema> for NumericBounds {
    fn from(schema: &IntegerSchema) -> Self {
        Self {
            minimum: schema.minimum.map(NumericBound::Integer),
            maximum: schema.maximum.map(NumericBound::Integer),
            exclusive_minimum: schema.exclusive_minimum,
            exclusive_maximum: schema.exclusive_maximum,
        }
    }
}

// =============================================================================
// Tables
// =============================================================================

const BOUND_MESSAGE: &str = "{test_type} is {test_value}";

/// `minimum`, `maximum` and the two exclusive modifiers.
///
/// An exclusive flag adds a separate `value != bound` test; the inclusive
/// test for the same bound still runs.
pub fn numeric_tests(bounds: &NumericBounds) -> TestTable {
    let mut tests = TestTable::new();
    let (min, max) = (bounds.minimum, bounds.maximum);

    tests.insert(
        "minimum",
        ConstraintTest::keyword(
            "minimum",
            min.map(|b| b.to_value()),
            move |v| {
                min.map_or(true, |b| {
                    matches!(b.compare(v), Some(Ordering::Greater | Ordering::Equal))
                })
            },
            BOUND_MESSAGE,
        ),
    );
    tests.insert(
        "maximum",
        ConstraintTest::keyword(
            "maximum",
            max.map(|b| b.to_value()),
            move |v| {
                max.map_or(true, |b| {
                    matches!(b.compare(v), Some(Ordering::Less | Ordering::Equal))
                })
            },
            BOUND_MESSAGE,
        ),
    );
    tests.insert(
        "exclusiveMinimum",
        ConstraintTest::keyword(
            "exclusiveMinimum",
            (bounds.exclusive_minimum && min.is_some()).then_some(Value::Bool(true)),
            move |v| min.map_or(true, |b| b.compare(v) != Some(Ordering::Equal)),
            BOUND_MESSAGE,
        ),
    );
    tests.insert(
        "exclusiveMaximum",
        ConstraintTest::keyword(
            "exclusiveMaximum",
            (bounds.exclusive_maximum && max.is_some()).then_some(Value::Bool(true)),
            move |v| max.map_or(true, |b| b.compare(v) != Some(Ordering::Equal)),
            BOUND_MESSAGE,
        ),
    );

    tests
}

/// Numeric tests plus the `__isNumber` shape check
pub fn number_tests(schema: &NumberSchema) -> TestTable {
    let mut tests = numeric_tests(&schema.into());
    tests.insert(
        "__isNumber",
        ConstraintTest::internal("__isNumber", Value::is_number, "'{value}' is not a number"),
    );
    tests
}

/// Numeric tests plus `__isInt` and `divisibleBy`
pub fn integer_tests(schema: &IntegerSchema) -> Result<TestTable> {
    let divisor = schema.divisible_by;
    if divisor == Some(0) {
        return Err(Error::Configuration("divisibleBy must not be 0".into()));
    }

    let mut tests = numeric_tests(&schema.into());
    tests.insert(
        "__isInt",
        ConstraintTest::internal(
            "__isInt",
            |v| v.is_i64() || v.is_u64(),
            "'{value}' is not an integer",
        ),
    );
    tests.insert(
        "divisibleBy",
        ConstraintTest::keyword(
            "divisibleBy",
            divisor.map(Value::from),
            move |v| divisor.map_or(true, |d| is_multiple(v, d)),
            "not divisible by {test_value}",
        ),
    );
    Ok(tests)
}

fn is_multiple(value: &Value, divisor: i64) -> bool {
    if let Some(v) = value.as_i64() {
        // i64::MIN % -1 overflows, but is divisible
        v.checked_rem(divisor).map_or(true, |r| r == 0)
    } else if let Some(v) = value.as_u64() {
        v % divisor.unsigned_abs() == 0
    } else {
        false
    }
}

/// `__isString`, `minLength`, `maxLength` and `pattern`
pub fn string_tests(schema: &StringSchema) -> Result<TestTable> {
    let mut tests = TestTable::new();
    let (min_len, max_len) = (schema.min_length, schema.max_length);

    tests.insert(
        "__isString",
        ConstraintTest::internal("__isString", Value::is_string, "'{value}' is not a string"),
    );
    tests.insert(
        "minLength",
        ConstraintTest::keyword(
            "minLength",
            min_len.map(Value::from),
            move |v| min_len.map_or(true, |n| char_len(v).is_some_and(|len| len >= n)),
            "length must be >= {test_value}",
        ),
    );
    tests.insert(
        "maxLength",
        ConstraintTest::keyword(
            "maxLength",
            max_len.map(Value::from),
            move |v| max_len.map_or(true, |n| char_len(v).is_some_and(|len| len <= n)),
            "length must be <= {test_value}",
        ),
    );

    let regex = schema.pattern.as_deref().map(start_anchored).transpose()?;
    tests.insert(
        "pattern",
        ConstraintTest::keyword(
            "pattern",
            schema.pattern.clone().map(Value::from),
            move |v| match (&regex, v.as_str()) {
                (None, _) => true,
                (Some(re), Some(s)) => re.is_match(s),
                (Some(_), None) => false,
            },
            "must match '{test_value}'",
        ),
    );

    Ok(tests)
}

fn char_len(value: &Value) -> Option<usize> {
    value.as_str().map(|s| s.chars().count())
}

/// Compile `pattern` so that it only matches at the start of the input
pub fn start_anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!(r"\A(?:{})", pattern))
        .map_err(|e| Error::Pattern(format!("invalid pattern '{}': {}", pattern, e)))
}

/// `minItems`, `maxItems` and `uniqueItems`
pub fn array_tests(schema: &ArraySchema) -> TestTable {
    let mut tests = TestTable::new();
    let (min_items, max_items) = (schema.min_items, schema.max_items);

    tests.insert(
        "minItems",
        ConstraintTest::keyword(
            "minItems",
            min_items.map(Value::from),
            move |v| min_items.map_or(true, |n| v.as_array().is_some_and(|a| a.len() >= n)),
            "must have at least {test_value} items",
        ),
    );
    tests.insert(
        "maxItems",
        ConstraintTest::keyword(
            "maxItems",
            max_items.map(Value::from),
            move |v| max_items.map_or(true, |n| v.as_array().is_some_and(|a| a.len() <= n)),
            "must have at most {test_value} items",
        ),
    );
    tests.insert(
        "uniqueItems",
        ConstraintTest::keyword(
            "uniqueItems",
            schema.unique_items.then_some(Value::Bool(true)),
            |v| v.as_array().is_some_and(|items| all_distinct(items)),
            "items must be unique",
        ),
    );

    tests
}

fn all_distinct(items: &[Value]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(i, item)| !items[..i].contains(item))
}

/// `required`: every required property is present
pub fn object_tests(schema: &ObjectSchema) -> TestTable {
    let mut tests = TestTable::new();
    let required: Vec<String> = schema.required.iter().cloned().collect();
    let bound = (!required.is_empty())
        .then(|| Value::Array(required.iter().cloned().map(Value::from).collect()));

    tests.insert(
        "required",
        ConstraintTest::keyword(
            "required",
            bound,
            move |v| {
                v.as_object()
                    .is_some_and(|map| required.iter().all(|name| map.contains_key(name)))
            },
            "missing one of the required properties {test_value}",
        ),
    );

    tests
}

/// Membership in the `enum` list
pub fn enum_test(values: &[Value]) -> ConstraintTest {
    let allowed = values.to_vec();
    ConstraintTest::keyword(
        "enum",
        Some(Value::Array(values.to_vec())),
        move |v| allowed.contains(v),
        "{value} is not in the enum list",
    )
}

/// Full table for a schema: its type's tests plus `enum`
pub fn tests_for(schema: &Schema) -> Result<TestTable> {
    let mut tests = match &schema.kind {
        SchemaKind::String(s) => string_tests(s)?,
        SchemaKind::Boolean => TestTable::new(),
        SchemaKind::Number(n) => number_tests(n),
        SchemaKind::Integer(i) => integer_tests(i)?,
        SchemaKind::Array(a) => array_tests(a),
        SchemaKind::Object(o) => object_tests(o),
    };

    if let Some(ref values) = schema.enumeration {
        tests.insert("enum", enum_test(values));
    }

    Ok(tests)
}

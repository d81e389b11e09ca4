//! Schema data model
//!
//! A [`Schema`] is an immutable, typed view of a JSON-Schema-like document.
//! The `type` keyword selects one variant of the closed [`SchemaKind`] enum,
//! so every schema that parses has a generation and validation strategy.
//!
//! Both legacy "required" conventions are accepted when parsing:
//!
//! ```json
//! {"type": "object",
//!  "required": ["id"],
//!  "properties": {"id": {"type": "integer"},
//!                 "title": {"type": "string", "required": true}}}
//! ```
//!
//! and are merged into the single [`ObjectSchema::required`] set.

use crate::error::{Error, ParseError, Result};
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};

/// Type names that resolve without a registry lookup
pub const BASIC_TYPES: [&str; 4] = ["string", "boolean", "number", "integer"];

/// Every type name with a built-in strategy
pub const SCHEMA_TYPES: [&str; 6] = ["string", "boolean", "number", "integer", "array", "object"];

// =============================================================================
// Schema
// =============================================================================

/// A parsed schema
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Registry name (`name` keyword)
    pub name: Option<String>,
    /// Allowed values (`enum` keyword), valid on every type
    pub enumeration: Option<Vec<Value>>,
    /// Type-specific constraints
    pub kind: SchemaKind,
}

/// Type-specific constraints of a schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// `"type": "string"`
    String(StringSchema),
    /// `"type": "boolean"`
    Boolean,
    /// `"type": "number"`
    Number(NumberSchema),
    /// `"type": "integer"`
    Integer(IntegerSchema),
    /// `"type": "array"`
    Array(ArraySchema),
    /// `"type": "object"`
    Object(ObjectSchema),
}

/// Constraints of a `string` schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    /// `minLength`, in characters
    pub min_length: Option<usize>,
    /// `maxLength`, in characters
    pub max_length: Option<usize>,
    /// `pattern`, matched against the start of the value
    pub pattern: Option<String>,
    /// `format` (e.g. `date-time`)
    pub format: Option<String>,
}

/// Constraints of a `number` schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSchema {
    /// `minimum`
    pub minimum: Option<f64>,
    /// `maximum`
    pub maximum: Option<f64>,
    /// `exclusiveMinimum` modifier
    pub exclusive_minimum: bool,
    /// `exclusiveMaximum` modifier
    pub exclusive_maximum: bool,
}

/// Constraints of an `integer` schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegerSchema {
    /// `minimum`
    pub minimum: Option<i64>,
    /// `maximum`
    pub maximum: Option<i64>,
    /// `exclusiveMinimum` modifier
    pub exclusive_minimum: bool,
    /// `exclusiveMaximum` modifier
    pub exclusive_maximum: bool,
    /// `divisibleBy`
    pub divisible_by: Option<i64>,
}

/// Constraints of an `array` schema
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    /// Item schema, inline or by name
    pub items: SchemaRef,
    /// `minItems`
    pub min_items: Option<usize>,
    /// `maxItems`
    pub max_items: Option<usize>,
    /// `uniqueItems`
    pub unique_items: bool,
}

/// Constraints of an `object` schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    /// Declared properties, in document order
    pub properties: IndexMap<String, SchemaRef>,
    /// Required property names from both legacy conventions
    pub required: IndexSet<String>,
}

impl ObjectSchema {
    /// Whether a property must be present
    pub fn is_required(&self, property: &str) -> bool {
        self.required.contains(property)
    }
}

/// Reference to a nested schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaRef {
    /// Schema defined in place
    Inline(Box<Schema>),
    /// Schema resolved through the registry by name
    Named(String),
}

impl From<Schema> for SchemaRef {
    fn from(schema: Schema) -> Self {
        SchemaRef::Inline(Box::new(schema))
    }
}

impl Schema {
    /// Create an unnamed schema without `enum`
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            name: None,
            enumeration: None,
            kind,
        }
    }

    /// Bare schema for a basic type name, if it is one
    pub fn basic(type_name: &str) -> Option<Self> {
        let kind = match type_name {
            "string" => SchemaKind::String(StringSchema::default()),
            "boolean" => SchemaKind::Boolean,
            "number" => SchemaKind::Number(NumberSchema::default()),
            "integer" => SchemaKind::Integer(IntegerSchema::default()),
            _ => return None,
        };
        Some(Self::new(kind))
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the allowed values
    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.enumeration = Some(values);
        self
    }

    /// The `type` keyword of this schema
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            SchemaKind::String(_) => "string",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Number(_) => "number",
            SchemaKind::Integer(_) => "integer",
            SchemaKind::Array(_) => "array",
            SchemaKind::Object(_) => "object",
        }
    }

    /// Parse a schema from its JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(text)?;
        Self::from_value(&document)
    }

    /// Parse a schema from a JSON document
    pub fn from_value(document: &Value) -> Result<Self> {
        parse_schema(document, "$")
    }

    /// Serialize back into a JSON document
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(ref name) = self.name {
            map.insert("name".into(), Value::from(name.clone()));
        }
        map.insert("type".into(), Value::from(self.type_name()));
        if let Some(ref values) = self.enumeration {
            map.insert("enum".into(), Value::Array(values.clone()));
        }

        match &self.kind {
            SchemaKind::Boolean => {}
            SchemaKind::String(s) => {
                insert_opt(&mut map, "minLength", s.min_length);
                insert_opt(&mut map, "maxLength", s.max_length);
                insert_opt(&mut map, "pattern", s.pattern.clone());
                insert_opt(&mut map, "format", s.format.clone());
            }
            SchemaKind::Number(n) => {
                insert_opt(&mut map, "minimum", n.minimum);
                insert_opt(&mut map, "maximum", n.maximum);
                insert_flag(&mut map, "exclusiveMinimum", n.exclusive_minimum);
                insert_flag(&mut map, "exclusiveMaximum", n.exclusive_maximum);
            }
            SchemaKind::Integer(n) => {
                insert_opt(&mut map, "minimum", n.minimum);
                insert_opt(&mut map, "maximum", n.maximum);
                insert_flag(&mut map, "exclusiveMinimum", n.exclusive_minimum);
                insert_flag(&mut map, "exclusiveMaximum", n.exclusive_maximum);
                insert_opt(&mut map, "divisibleBy", n.divisible_by);
            }
            SchemaKind::Array(a) => {
                map.insert("items".into(), a.items.to_value());
                insert_opt(&mut map, "minItems", a.min_items);
                insert_opt(&mut map, "maxItems", a.max_items);
                insert_flag(&mut map, "uniqueItems", a.unique_items);
            }
            SchemaKind::Object(o) => {
                let properties: Map<String, Value> = o
                    .properties
                    .iter()
                    .map(|(name, prop)| (name.clone(), prop.to_value()))
                    .collect();
                map.insert("properties".into(), Value::Object(properties));
                if !o.required.is_empty() {
                    let required = o.required.iter().cloned().map(Value::from).collect();
                    map.insert("required".into(), Value::Array(required));
                }
            }
        }

        Value::Object(map)
    }
}

impl SchemaRef {
    /// Serialize back into a JSON document
    pub fn to_value(&self) -> Value {
        match self {
            SchemaRef::Inline(schema) => schema.to_value(),
            SchemaRef::Named(name) => serde_json::json!({ "type": name }),
        }
    }
}

impl TryFrom<&Value> for Schema {
    type Error = Error;

    fn try_from(document: &Value) -> Result<Self> {
        Schema::from_value(document)
    }
}

fn insert_opt<T: Into<Value>>(map: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(v) = value {
        map.insert(key.into(), v.into());
    }
}

fn insert_flag(map: &mut Map<String, Value>, key: &str, flag: bool) {
    if flag {
        map.insert(key.into(), Value::Bool(true));
    }
}

// =============================================================================
// Parsing
// =============================================================================

fn parse_error(path: &str, message: impl Into<String>) -> Error {
    Error::Parse(ParseError::new(message).with_location(path))
}

fn as_object<'a>(document: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    document
        .as_object()
        .ok_or_else(|| parse_error(path, "schema must be a JSON object"))
}

fn type_of<'a>(map: &'a Map<String, Value>, path: &str) -> Result<&'a str> {
    match map.get("type") {
        Some(Value::String(t)) => Ok(t),
        Some(_) => Err(parse_error(path, "'type' must be a string")),
        None => Err(Error::UnsupportedType(format!("schema at {} has no 'type'", path))),
    }
}

fn parse_schema(document: &Value, path: &str) -> Result<Schema> {
    let map = as_object(document, path)?;
    let type_name = type_of(map, path)?;

    let kind = match type_name {
        "string" => SchemaKind::String(StringSchema {
            min_length: get_usize(map, "minLength", path)?,
            max_length: get_usize(map, "maxLength", path)?,
            pattern: get_string(map, "pattern", path)?,
            format: get_string(map, "format", path)?,
        }),
        "boolean" => SchemaKind::Boolean,
        "number" => SchemaKind::Number(NumberSchema {
            minimum: get_f64(map, "minimum", path)?,
            maximum: get_f64(map, "maximum", path)?,
            exclusive_minimum: get_bool(map, "exclusiveMinimum", path)?,
            exclusive_maximum: get_bool(map, "exclusiveMaximum", path)?,
        }),
        "integer" => SchemaKind::Integer(IntegerSchema {
            minimum: get_i64(map, "minimum", path)?,
            maximum: get_i64(map, "maximum", path)?,
            exclusive_minimum: get_bool(map, "exclusiveMinimum", path)?,
            exclusive_maximum: get_bool(map, "exclusiveMaximum", path)?,
            divisible_by: get_i64(map, "divisibleBy", path)?,
        }),
        "array" => {
            let items_path = format!("{}.items", path);
            let items = match map.get("items") {
                Some(items) => parse_item_ref(items, &items_path)?,
                None => return Err(parse_error(path, "array schema requires 'items'")),
            };
            SchemaKind::Array(ArraySchema {
                items,
                min_items: get_usize(map, "minItems", path)?,
                max_items: get_usize(map, "maxItems", path)?,
                unique_items: get_bool(map, "uniqueItems", path)?,
            })
        }
        "object" => SchemaKind::Object(parse_object(map, path)?),
        other => return Err(Error::UnsupportedType(other.to_string())),
    };

    let enumeration = match map.get("enum") {
        Some(Value::Array(values)) => Some(values.clone()),
        Some(_) => return Err(parse_error(path, "'enum' must be an array")),
        None => None,
    };

    Ok(Schema {
        name: get_string(map, "name", path)?,
        enumeration,
        kind,
    })
}

fn parse_object(map: &Map<String, Value>, path: &str) -> Result<ObjectSchema> {
    let mut object = ObjectSchema::default();

    // Object-level list; a boolean here is this object's flag in its parent.
    match map.get("required") {
        Some(Value::Array(names)) => {
            for name in names {
                let name = name
                    .as_str()
                    .ok_or_else(|| parse_error(path, "'required' entries must be strings"))?;
                object.required.insert(name.to_string());
            }
        }
        Some(Value::Bool(_)) | None => {}
        Some(_) => return Err(parse_error(path, "'required' must be a boolean or an array")),
    }

    match map.get("properties") {
        Some(Value::Object(properties)) => {
            for (name, document) in properties {
                let prop_path = format!("{}.properties.{}", path, name);
                let prop_map = as_object(document, &prop_path)?;
                // An array here is the nested object's own list, handled below.
                if matches!(prop_map.get("required"), Some(Value::Bool(true))) {
                    object.required.insert(name.clone());
                }
                object
                    .properties
                    .insert(name.clone(), parse_ref(document, &prop_path)?);
            }
        }
        Some(_) => return Err(parse_error(path, "'properties' must be an object")),
        None => {}
    }

    Ok(object)
}

/// A nested schema: known type names stay inline, others name a registry entry
fn parse_ref(document: &Value, path: &str) -> Result<SchemaRef> {
    let map = as_object(document, path)?;
    let type_name = type_of(map, path)?;
    if SCHEMA_TYPES.contains(&type_name) {
        Ok(SchemaRef::Inline(Box::new(parse_schema(document, path)?)))
    } else {
        Ok(SchemaRef::Named(type_name.to_string()))
    }
}

/// Like [`parse_ref`], plus the `{"type": "object", "name": N}` item convention
fn parse_item_ref(document: &Value, path: &str) -> Result<SchemaRef> {
    let map = as_object(document, path)?;
    if type_of(map, path)? == "object" {
        if let Some(name) = get_string(map, "name", path)? {
            return Ok(SchemaRef::Named(name));
        }
    }
    parse_ref(document, path)
}

fn get_string(map: &Map<String, Value>, key: &str, path: &str) -> Result<Option<String>> {
    match map.get(key) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(parse_error(path, format!("'{}' must be a string", key))),
        None => Ok(None),
    }
}

fn get_bool(map: &Map<String, Value>, key: &str, path: &str) -> Result<bool> {
    match map.get(key) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(parse_error(path, format!("'{}' must be a boolean", key))),
        None => Ok(false),
    }
}

fn get_f64(map: &Map<String, Value>, key: &str, path: &str) -> Result<Option<f64>> {
    match map.get(key) {
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| parse_error(path, format!("'{}' must be a number", key))),
        None => Ok(None),
    }
}

fn get_i64(map: &Map<String, Value>, key: &str, path: &str) -> Result<Option<i64>> {
    let Some(v) = map.get(key) else {
        return Ok(None);
    };
    if let Some(i) = v.as_i64() {
        return Ok(Some(i));
    }
    // 5.0 is accepted as 5
    match v.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
        _ => Err(parse_error(path, format!("'{}' must be an integer", key))),
    }
}

fn get_usize(map: &Map<String, Value>, key: &str, path: &str) -> Result<Option<usize>> {
    match map.get(key) {
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| parse_error(path, format!("'{}' must be a non-negative integer", key))),
        None => Ok(None),
    }
}

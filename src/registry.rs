//! Named schema registry
//!
//! Maps a schema's embedded `name` to its stored forms. Generators consult
//! the registry whenever a schema references another type by name.
//!
//! The registry is filled once (bulk [`load_directory`](SchemaRegistry::load_directory)
//! or individual [`add`](SchemaRegistry::add) calls) and read afterwards.
//! `add` reports malformed input through its boolean result; use
//! [`try_add`](SchemaRegistry::try_add) to see why an input was rejected.

use crate::error::{Error, ParseError, Result};
use crate::loaders::Loader;
use crate::schema::{Schema, SchemaRef};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Input accepted by [`SchemaRegistry::add`]
#[derive(Debug, Clone)]
pub enum SchemaSource {
    /// A parsed JSON document
    Document(Value),
    /// Serialized JSON text
    Text(String),
}

impl From<Value> for SchemaSource {
    fn from(document: Value) -> Self {
        SchemaSource::Document(document)
    }
}

impl From<String> for SchemaSource {
    fn from(text: String) -> Self {
        SchemaSource::Text(text)
    }
}

impl From<&str> for SchemaSource {
    fn from(text: &str) -> Self {
        SchemaSource::Text(text.to_string())
    }
}

impl From<&Schema> for SchemaSource {
    fn from(schema: &Schema) -> Self {
        SchemaSource::Document(schema.to_value())
    }
}

/// Which stored form [`SchemaRegistry::lookup`] returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaForm {
    /// The parsed document
    Parsed,
    /// The serialized text
    Serialized,
}

/// A form returned by [`SchemaRegistry::lookup`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stored<'a> {
    /// The parsed document
    Parsed(&'a Value),
    /// The serialized text
    Serialized(&'a str),
}

#[derive(Debug, Clone)]
struct Entry {
    text: String,
    document: Value,
    schema: Schema,
}

/// Name to schema lookup table
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: HashMap<String, Entry>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from every file in a directory
    pub fn from_directory(path: impl AsRef<Path>) -> Result<Self> {
        let mut registry = Self::new();
        registry.load_directory(path)?;
        Ok(registry)
    }

    /// Store a schema under its embedded `name`.
    ///
    /// Returns `false` if the input cannot be parsed or has no `name`.
    pub fn add(&mut self, source: impl Into<SchemaSource>) -> bool {
        match self.try_add(source) {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "rejected schema");
                false
            }
        }
    }

    /// Store a schema under its embedded `name`, returning that name
    pub fn try_add(&mut self, source: impl Into<SchemaSource>) -> Result<String> {
        let (text, document) = match source.into() {
            SchemaSource::Document(document) => (serde_json::to_string(&document)?, document),
            SchemaSource::Text(text) => {
                let document = serde_json::from_str(&text)?;
                (text, document)
            }
        };

        let name = document
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Parse(ParseError::new("schema has no 'name'")))?
            .to_string();
        let schema = Schema::from_value(&document)?;

        if self.entries.contains_key(&name) {
            debug!(%name, "replacing schema");
        }
        self.entries.insert(
            name.clone(),
            Entry {
                text,
                document,
                schema,
            },
        );
        Ok(name)
    }

    /// Stored form of a schema, or `None` if the name is unknown
    pub fn lookup(&self, name: &str, form: SchemaForm) -> Option<Stored<'_>> {
        let entry = self.entries.get(name)?;
        Some(match form {
            SchemaForm::Parsed => Stored::Parsed(&entry.document),
            SchemaForm::Serialized => Stored::Serialized(&entry.text),
        })
    }

    /// Typed schema registered under `name`
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.entries.get(name).map(|e| &e.schema)
    }

    /// Parsed document registered under `name`
    pub fn document(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).map(|e| &e.document)
    }

    /// Serialized text registered under `name`
    pub fn serialized(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|e| e.text.as_str())
    }

    /// Check if a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered schemas
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add every regular file in `path`; returns how many were accepted.
    ///
    /// File names are ignored: the `name` inside each document is the key.
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        self.load_directory_with(&Loader::new(), path.as_ref())
    }

    /// [`load_directory`](Self::load_directory) with a configured loader
    pub fn load_directory_with(&mut self, loader: &Loader, path: &Path) -> Result<usize> {
        let mut accepted = 0;
        for file in loader.schema_files(path)? {
            let text = match loader.load(&file) {
                Ok(text) => text,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "skipping unreadable schema");
                    continue;
                }
            };
            match self.try_add(text) {
                Ok(name) => {
                    debug!(file = %file.display(), %name, "loaded schema");
                    accepted += 1;
                }
                Err(e) => warn!(file = %file.display(), error = %e, "rejected schema"),
            }
        }
        debug!(dir = %path.display(), accepted, "schema directory loaded");
        Ok(accepted)
    }

    /// Resolve a reference against this registry
    pub fn resolve<'a>(&'a self, reference: &'a SchemaRef) -> Result<Cow<'a, Schema>> {
        resolve_ref(Some(self), reference)
    }
}

/// Resolve a reference: inline schemas as-is, basic type names without a
/// lookup, anything else through the registry
pub fn resolve_ref<'a>(
    registry: Option<&'a SchemaRegistry>,
    reference: &'a SchemaRef,
) -> Result<Cow<'a, Schema>> {
    match reference {
        SchemaRef::Inline(schema) => Ok(Cow::Borrowed(schema.as_ref())),
        SchemaRef::Named(name) => resolve_name(registry, name),
    }
}

/// Resolve a type name: basic types without a lookup, others through the registry
pub fn resolve_name<'a>(
    registry: Option<&'a SchemaRegistry>,
    name: &str,
) -> Result<Cow<'a, Schema>> {
    if let Some(basic) = Schema::basic(name) {
        return Ok(Cow::Owned(basic));
    }
    registry
        .and_then(|r| r.schema(name))
        .map(Cow::Borrowed)
        .ok_or_else(|| Error::TypeResolution(name.to_string()))
}

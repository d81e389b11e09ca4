//! Validator compiler
//!
//! Turns the constraint tests relevant to one schema fragment into a single
//! [`CompiledValidator`] bound to a property name.

use crate::error::{Result, ValidationError};
use crate::registry::{resolve_ref, SchemaRegistry};
use crate::schema::{ObjectSchema, Schema, SchemaRef};
use crate::validators::facets::{tests_for, ConstraintTest};
use indexmap::IndexMap;
use serde_json::Value;

/// Ordered constraint tests bound to one property
#[derive(Debug)]
pub struct CompiledValidator {
    property: String,
    tests: Vec<ConstraintTest>,
}

impl CompiledValidator {
    /// Property this validator is bound to
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Keywords in execution order
    pub fn keywords(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tests.iter().map(ConstraintTest::name)
    }

    /// Run every test in keyword order, stopping at the first failure
    pub fn validate<'v>(
        &self,
        value: &'v Value,
    ) -> std::result::Result<&'v Value, ValidationError> {
        for test in &self.tests {
            if !test.check(value) {
                let mut error = ValidationError::new(test.message(value))
                    .with_property(self.property.clone())
                    .with_value(value.clone())
                    .with_keyword(test.name());
                if let Some(bound) = test.bound() {
                    error = error.with_expected(bound.clone());
                }
                return Err(error);
            }
        }
        Ok(value)
    }

    /// Check if a value passes every test
    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(value).is_ok()
    }
}

/// Validators for the properties of one object schema
#[derive(Debug, Default)]
pub struct PropertyValidators {
    validators: IndexMap<String, CompiledValidator>,
}

impl PropertyValidators {
    /// Validator of a property, if it needs one
    pub fn get(&self, property: &str) -> Option<&CompiledValidator> {
        self.validators.get(property)
    }

    /// Number of properties with a validator
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check if no property needs validation
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Validate every present property of an object value.
    ///
    /// Properties without a validator and undeclared properties are accepted.
    pub fn validate_object(&self, object: &Value) -> std::result::Result<(), ValidationError> {
        let Some(map) = object.as_object() else {
            return Ok(());
        };
        for (name, value) in map {
            if let Some(validator) = self.validators.get(name) {
                validator.validate(value)?;
            }
        }
        Ok(())
    }
}

/// Compiles schema fragments into validators
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatorCompiler<'r> {
    registry: Option<&'r SchemaRegistry>,
}

impl<'r> ValidatorCompiler<'r> {
    /// Create a compiler without a registry
    pub fn new() -> Self {
        Self { registry: None }
    }

    /// Resolve named references through `registry`
    pub fn with_registry(mut self, registry: &'r SchemaRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Compile the tests a schema declares.
    ///
    /// Returns `Ok(None)` when no test applies.
    pub fn compile(&self, property: &str, schema: &Schema) -> Result<Option<CompiledValidator>> {
        let tests: Vec<ConstraintTest> = tests_for(schema)?
            .into_values()
            .filter(ConstraintTest::applies)
            .collect();

        if tests.is_empty() {
            return Ok(None);
        }

        Ok(Some(CompiledValidator {
            property: property.to_string(),
            tests,
        }))
    }

    /// Compile a nested reference, resolving names through the registry
    pub fn compile_ref(
        &self,
        property: &str,
        reference: &SchemaRef,
    ) -> Result<Option<CompiledValidator>> {
        let schema = resolve_ref(self.registry, reference)?;
        self.compile(property, &schema)
    }

    /// Compile a validator for every property of an object schema
    pub fn compile_properties(&self, object: &ObjectSchema) -> Result<PropertyValidators> {
        let mut validators = IndexMap::new();
        for (name, reference) in &object.properties {
            if let Some(validator) = self.compile_ref(name, reference)? {
                validators.insert(name.clone(), validator);
            }
        }
        Ok(PropertyValidators { validators })
    }
}

//! Schema validation
//!
//! Checks an object against the registry's JSON Schema and reports every
//! violation found. Children of `metadata` and `variables` are never
//! constrained.

use std::sync::LazyLock;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema, ValidationError};
use serde_json::Value;

use crate::error::{DefaultsError, Result, ValidationStage, Violation};
use crate::schema::{split_format, Allowed, FormatKind, SchemaRegistry};

static GLOBAL: LazyLock<std::result::Result<Validator<'static>, String>> =
    LazyLock::new(|| Validator::new(SchemaRegistry::global()).map_err(|e| e.to_string()));

/// Compiled validator for a registry
pub struct Validator<'r> {
    registry: &'r SchemaRegistry,
    compiled: JSONSchema,
}

impl<'r> Validator<'r> {
    /// Compile the registry's JSON Schema
    pub fn new(registry: &'r SchemaRegistry) -> Result<Self> {
        let schema = registry.to_json_schema();
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .map_err(|e| DefaultsError::InvalidSchema(e.to_string()))?;
        Ok(Self { registry, compiled })
    }

    /// List every violation in `instance`
    pub fn check(&self, instance: &Value) -> Vec<Violation> {
        match self.compiled.validate(instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.map(|error| self.violation(&error)).collect(),
        }
    }

    /// Validate `instance`, failing with all violations at once
    pub fn validate(&self, instance: &Value, stage: ValidationStage) -> Result<()> {
        let violations = self.check(instance);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(DefaultsError::Validation { stage, violations })
        }
    }

    fn violation(&self, error: &ValidationError<'_>) -> Violation {
        let key = root_key(&error.instance_path.to_string());

        let format_kind = self
            .registry
            .property(&key)
            .and_then(|spec| match spec.allowed {
                Allowed::Format(kind) => Some(kind),
                _ => None,
            });
        let message = match (&error.kind, format_kind, error.instance.as_str()) {
            (ValidationErrorKind::Pattern { .. }, Some(kind), Some(id)) => {
                self.format_message(kind, id)
            }
            _ => error.to_string(),
        };

        Violation::new(key, message)
    }

    fn format_message(&self, kind: FormatKind, id: &str) -> String {
        let (base, _) = split_format(id);
        if !self.registry.is_known_format(kind, base) {
            return format!("\"{}\" is not a known {}", id, kind);
        }
        format!(
            "\"{}\" uses unknown {} extension(s): {}",
            id,
            kind,
            self.registry.unknown_extensions(id).join(", ")
        )
    }
}

/// The validator for the global registry
pub fn global() -> Result<&'static Validator<'static>> {
    GLOBAL
        .as_ref()
        .map_err(|message| DefaultsError::InvalidSchema(message.clone()))
}

/// Validate against the global registry
pub fn validate(instance: &Value, stage: ValidationStage) -> Result<()> {
    global()?.validate(instance, stage)
}

/// Every violation against the global registry
pub fn check(instance: &Value) -> Result<Vec<Violation>> {
    Ok(global()?.check(instance))
}

/// First segment of a JSON pointer, unescaped
fn root_key(pointer: &str) -> String {
    pointer
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default()
        .replace("~1", "/")
        .replace("~0", "~")
}

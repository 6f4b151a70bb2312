//! Defaults file assembly
//!
//! Builds a validated pandoc defaults object from frontmatter, optional custom
//! metadata and an optional base configuration.
//!
//! Precedence: frontmatter overrides custom metadata overrides the base
//! configuration. An explicit output file or writer overrides all three.

use std::path::{Component, Path, PathBuf};

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, ValidationStage};
use crate::merge::{merge_sources, Partitions, RawProperties};
use crate::schema::SchemaRegistry;
use crate::validate::{self, Validator};
use crate::writer::infer_writer_for_path;

pub const OUTPUT_FILE: &str = "output-file";
pub const WRITER: &str = "writer";

/// A validated pandoc defaults file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DefaultsFile {
    parts: Partitions,
}

impl DefaultsFile {
    /// Recognized options stored at the root
    pub fn root(&self) -> &Map<String, Value> {
        &self.parts.root
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.parts.metadata
    }

    pub fn variables(&self) -> &Map<String, Value> {
        &self.parts.variables
    }

    pub fn partitions(&self) -> &Partitions {
        &self.parts
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.parts.root.get(key)
    }

    pub fn writer(&self) -> Option<&str> {
        self.get(WRITER).and_then(Value::as_str)
    }

    pub fn output_file(&self) -> Option<&str> {
        self.get(OUTPUT_FILE).and_then(Value::as_str)
    }

    /// The defaults object as JSON, with empty buckets omitted
    pub fn to_value(&self) -> Value {
        let mut object = self.parts.root.clone();
        if !self.parts.metadata.is_empty() {
            object.insert("metadata".to_string(), Value::Object(self.parts.metadata.clone()));
        }
        if !self.parts.variables.is_empty() {
            object.insert("variables".to_string(), Value::Object(self.parts.variables.clone()));
        }
        Value::Object(object)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.to_value())?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }

    pub fn into_partitions(self) -> Partitions {
        self.parts
    }
}

impl Serialize for DefaultsFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Builder for a defaults file
pub struct DefaultsBuilder<'a> {
    frontmatter: &'a RawProperties,
    custom_metadata: Option<&'a RawProperties>,
    base: Option<&'a RawProperties>,
    output_file: Option<PathBuf>,
    writer: Option<String>,
    registry: &'a SchemaRegistry,
}

impl<'a> DefaultsBuilder<'a> {
    pub fn new(frontmatter: &'a RawProperties) -> Self {
        Self {
            frontmatter,
            custom_metadata: None,
            base: None,
            output_file: None,
            writer: None,
            registry: SchemaRegistry::global(),
        }
    }

    /// Custom metadata; in-document frontmatter is applied over it
    pub fn custom_metadata(mut self, custom_metadata: &'a RawProperties) -> Self {
        self.custom_metadata = Some(custom_metadata);
        self
    }

    /// Base configuration; lowest precedence
    pub fn base(mut self, base: &'a RawProperties) -> Self {
        self.base = Some(base);
        self
    }

    /// Output file overriding any merged `output-file`; also drives writer inference
    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.output_file = (!path.as_os_str().is_empty()).then_some(path);
        self
    }

    /// Writer overriding both merged and inferred values
    pub fn writer(mut self, writer: impl Into<String>) -> Self {
        let writer = writer.into();
        self.writer = (!writer.is_empty()).then_some(writer);
        self
    }

    pub fn registry(mut self, registry: &'a SchemaRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Validate, classify, merge and validate again
    pub fn build(self) -> Result<DefaultsFile> {
        let compiled;
        let validator = if std::ptr::eq(self.registry, SchemaRegistry::global()) {
            validate::global()?
        } else {
            compiled = Validator::new(self.registry)?;
            &compiled
        };

        validator.validate(&Value::Object(self.frontmatter.clone()), ValidationStage::Input)?;

        let sources = [self.base, self.custom_metadata, Some(self.frontmatter)];
        let mut parts = merge_sources(sources.into_iter().flatten(), self.registry);

        if let Some(path) = &self.output_file {
            let resolved = resolve_path(path)?;
            debug!(output_file = %resolved.display(), "explicit output file");
            parts.root.insert(
                OUTPUT_FILE.to_string(),
                Value::String(resolved.to_string_lossy().into_owned()),
            );
        }

        let inferred = parts
            .root
            .get(OUTPUT_FILE)
            .and_then(Value::as_str)
            .map(infer_writer_for_path);

        match (self.writer, inferred) {
            (Some(writer), _) => {
                parts.root.insert(WRITER.to_string(), Value::String(writer));
            }
            (None, Some(Some(inferred))) => {
                debug!(writer = inferred, "writer inferred from output file");
                parts.root.insert(WRITER.to_string(), Value::String(inferred.to_string()));
            }
            (None, Some(None)) => {
                if let Some(previous) = parts.root.remove(WRITER) {
                    debug!(writer = %previous, "output file extension has no writer, leaving writer unset");
                }
            }
            (None, None) => {}
        }

        let defaults = DefaultsFile { parts };
        validator.validate(&defaults.to_value(), ValidationStage::Output)?;

        Ok(defaults)
    }
}

/// Build a defaults file from frontmatter and optional overrides
///
/// See [`DefaultsBuilder`] for precedence rules.
pub fn make_defaults_file(
    frontmatter: &RawProperties,
    custom_metadata: Option<&RawProperties>,
    base: Option<&RawProperties>,
    output_file: Option<&Path>,
    writer: Option<&str>,
) -> Result<DefaultsFile> {
    let mut builder = DefaultsBuilder::new(frontmatter);
    if let Some(custom_metadata) = custom_metadata {
        builder = builder.custom_metadata(custom_metadata);
    }
    if let Some(base) = base {
        builder = builder.base(base);
    }
    if let Some(output_file) = output_file {
        builder = builder.output_file(output_file);
    }
    if let Some(writer) = writer {
        builder = builder.writer(writer);
    }
    builder.build()
}

/// Absolute form of `path`, relative paths taken from the current directory
fn resolve_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(normalize(&absolute))
}

/// Drop `.` segments and fold `..` into its parent without touching the file system
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

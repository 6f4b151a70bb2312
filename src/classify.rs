//! Property classification
//!
//! Decides where a single frontmatter key belongs in a defaults file.
//! Classification is total: unknown keys fall back to [`PropertyClass::Variable`].

use serde::{Deserialize, Serialize};

use crate::schema::SchemaRegistry;

/// Keys pandoc only honours inside `metadata`.
///
/// Some of these are also accepted at the root, where pandoc sets the metadata
/// field under the hood; writing them under `metadata` keeps the output explicit.
/// Others (`citation-style`, `reference-section-title`) are metadata-only.
pub const SPECIAL_METADATA_KEYS: &[&str] = &[
    "bibliography",
    "csl",
    "citation-abbreviations",
    "reference-section-title",
    "suppress-bibliography",
    "citation-style",
];

/// Keys that must sit at the root to behave the same across output formats
pub const FORCED_ROOT_KEYS: &[&str] = &["toc", "table-of-contents"];

/// Names of the nested buckets; never classified as root options themselves
pub const BUCKET_KEYS: &[&str] = &["metadata", "variables"];

/// Destination of a key in the defaults file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyClass {
    /// Recognized pandoc option, stored at the root
    Root,
    /// Citation/bibliography field, stored under `metadata`
    SpecialMetadata,
    /// Anything else, stored under `variables`
    Variable,
}

impl PropertyClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyClass::Root => "root",
            PropertyClass::SpecialMetadata => "metadata",
            PropertyClass::Variable => "variable",
        }
    }
}

impl std::fmt::Display for PropertyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_special_metadata_key(key: &str) -> bool {
    SPECIAL_METADATA_KEYS.contains(&key)
}

pub fn is_forced_root_key(key: &str) -> bool {
    FORCED_ROOT_KEYS.contains(&key)
}

/// Classify a key against the global registry
pub fn classify(key: &str) -> PropertyClass {
    classify_with(SchemaRegistry::global(), key)
}

/// Classify a key against an explicit registry
pub fn classify_with(registry: &SchemaRegistry, key: &str) -> PropertyClass {
    if is_special_metadata_key(key) {
        PropertyClass::SpecialMetadata
    } else if is_forced_root_key(key) {
        PropertyClass::Root
    } else if registry.is_root_property(key) && !BUCKET_KEYS.contains(&key) {
        PropertyClass::Root
    } else {
        PropertyClass::Variable
    }
}

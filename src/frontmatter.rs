//! Loading property sources from disk
//!
//! Markdown documents contribute the YAML block between the leading `---`
//! fences; YAML and JSON files contribute their whole top-level mapping.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{DefaultsError, Result};
use crate::merge::RawProperties;

/// Extract the YAML frontmatter of a document, without its fences
///
/// Returns `None` when the document does not open with `---` or the block is
/// never closed. A closing `...` fence is accepted as in pandoc.
pub fn extract_frontmatter(content: &str) -> Option<String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.lines();
    if lines.next()?.trim_end() != "---" {
        return None;
    }

    let mut block = Vec::new();
    for line in lines {
        let fence = line.trim_end();
        if fence == "---" || fence == "..." {
            return Some(block.join("\n"));
        }
        block.push(line);
    }
    None
}

/// Parse a YAML (or JSON) document into properties
///
/// An empty document yields no properties; anything other than a mapping is
/// rejected.
pub fn parse_properties(source: &str, origin: &str) -> Result<RawProperties> {
    if source.trim().is_empty() {
        return Ok(RawProperties::new());
    }
    match serde_yaml::from_str::<Value>(source)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(RawProperties::new()),
        other => Err(DefaultsError::InvalidSource {
            path: origin.to_string(),
            reason: format!("expected a mapping at the top level, found {}", kind_of(&other)),
        }),
    }
}

/// Load properties from a Markdown, YAML or JSON file
pub fn load_properties(path: impl AsRef<Path>) -> Result<RawProperties> {
    let path = path.as_ref();
    let origin = path.display().to_string();
    let content = fs::read_to_string(path)?;

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let properties = match extension.as_str() {
        "json" => match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => map,
            other => {
                return Err(DefaultsError::InvalidSource {
                    path: origin,
                    reason: format!("expected a JSON object, found {}", kind_of(&other)),
                })
            }
        },
        "yaml" | "yml" => parse_properties(&content, &origin)?,
        _ => match extract_frontmatter(&content) {
            Some(block) => parse_properties(&block, &origin)?,
            None => {
                debug!(path = %origin, "no frontmatter found");
                RawProperties::new()
            }
        },
    };

    debug!(path = %origin, keys = properties.len(), "loaded properties");
    Ok(properties)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

//! Flattening and merging of property sources
//!
//! Each source is flattened and partitioned on its own; the resulting
//! [`Partitions`] are then merged in ascending precedence, key by key, with
//! each partition merged independently of the others.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::classify::{classify_with, is_special_metadata_key, PropertyClass};
use crate::schema::SchemaRegistry;

/// One input source: frontmatter, custom metadata or a base configuration
pub type RawProperties = Map<String, Value>;

/// Section of a defaults file a key is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Root,
    Metadata,
    Variables,
}

impl Partition {
    pub const ALL: [Partition; 3] = [Partition::Root, Partition::Metadata, Partition::Variables];

    pub fn name(&self) -> &'static str {
        match self {
            Partition::Root => "root",
            Partition::Metadata => "metadata",
            Partition::Variables => "variables",
        }
    }
}

impl From<PropertyClass> for Partition {
    fn from(class: PropertyClass) -> Self {
        match class {
            PropertyClass::Root => Partition::Root,
            PropertyClass::SpecialMetadata => Partition::Metadata,
            PropertyClass::Variable => Partition::Variables,
        }
    }
}

/// Classified output: the three sections of a defaults file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Partitions {
    pub root: Map<String, Value>,
    pub metadata: Map<String, Value>,
    pub variables: Map<String, Value>,
}

impl Partitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partition(&self, partition: Partition) -> &Map<String, Value> {
        match partition {
            Partition::Root => &self.root,
            Partition::Metadata => &self.metadata,
            Partition::Variables => &self.variables,
        }
    }

    pub fn partition_mut(&mut self, partition: Partition) -> &mut Map<String, Value> {
        match partition {
            Partition::Root => &mut self.root,
            Partition::Metadata => &mut self.metadata,
            Partition::Variables => &mut self.variables,
        }
    }

    /// Insert into one partition, overwriting an existing value for the key there
    pub fn insert(&mut self, partition: Partition, key: impl Into<String>, value: Value) -> Option<Value> {
        self.partition_mut(partition).insert(key.into(), value)
    }

    /// Insert into one partition and drop the key from the other two
    ///
    /// Keeps a single source's partitions disjoint.
    pub fn place(&mut self, partition: Partition, key: impl Into<String>, value: Value) {
        let key = key.into();
        for other in Partition::ALL.into_iter().filter(|p| *p != partition) {
            if self.partition_mut(other).remove(&key).is_some() {
                warn!(
                    key = %key,
                    from = other.name(),
                    to = partition.name(),
                    "key appears in two sections of one source; keeping the classified value"
                );
            }
        }
        self.insert(partition, key, value);
    }

    /// Locate a key in whichever partition holds it
    pub fn get(&self, key: &str) -> Option<(Partition, &Value)> {
        Partition::ALL
            .into_iter()
            .find_map(|p| self.partition(p).get(key).map(|v| (p, v)))
    }

    /// Merge a higher-precedence set of partitions over this one
    pub fn absorb(&mut self, higher: Partitions) {
        for (key, value) in higher.root {
            self.root.insert(key, value);
        }
        for (key, value) in higher.metadata {
            self.metadata.insert(key, value);
        }
        for (key, value) in higher.variables {
            self.variables.insert(key, value);
        }
    }

    /// Whether no key occurs in more than one partition
    pub fn is_disjoint(&self) -> bool {
        let in_root_and = |map: &Map<String, Value>| map.keys().any(|k| self.root.contains_key(k));
        !in_root_and(&self.metadata)
            && !in_root_and(&self.variables)
            && !self.metadata.keys().any(|k| self.variables.contains_key(k))
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty() && self.metadata.is_empty() && self.variables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.root.len() + self.metadata.len() + self.variables.len()
    }
}

/// A source with nested mappings unwound
#[derive(Debug, Default)]
struct Flattened {
    /// Scalars and arrays, to be classified
    leaves: Vec<(String, Value)>,
    /// Children of explicit `metadata` mappings
    metadata: Vec<(String, Value)>,
    /// Children of explicit `variables` mappings
    variables: Vec<(String, Value)>,
}

fn flatten_into(source: &RawProperties, out: &mut Flattened) {
    for (key, value) in source {
        match (key.as_str(), value) {
            ("metadata", Value::Object(children)) => {
                out.metadata
                    .extend(children.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            ("variables", Value::Object(children)) => {
                out.variables
                    .extend(children.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            ("metadata" | "variables", other) => {
                warn!(key = %key, value = %other, "ignoring non-mapping value for bucket");
            }
            // Authors nest for readability; the children count as top-level keys
            (_, Value::Object(children)) => flatten_into(children, out),
            _ => out.leaves.push((key.clone(), value.clone())),
        }
    }
}

/// Classify one source into partitions
///
/// Within the source, classified leaves win over explicit `variables`
/// entries, which win over explicit `metadata` entries for the same key.
/// Citation keys are always routed to `metadata`.
pub fn assemble(source: &RawProperties, registry: &SchemaRegistry) -> Partitions {
    let mut flat = Flattened::default();
    flatten_into(source, &mut flat);

    let mut parts = Partitions::new();

    for (key, value) in flat.metadata {
        parts.place(Partition::Metadata, key, value);
    }
    for (key, value) in flat.variables {
        let partition = if is_special_metadata_key(&key) {
            Partition::Metadata
        } else {
            Partition::Variables
        };
        parts.place(partition, key, value);
    }
    for (key, value) in flat.leaves {
        let class = classify_with(registry, &key);
        debug!(key = %key, class = %class, "classified property");
        parts.place(class.into(), key, value);
    }

    parts
}

/// Classify and merge sources given in ascending precedence
///
/// Later sources overwrite earlier ones per partition and key; keys that do
/// not collide are kept from every source.
pub fn merge_sources<'a, I>(sources: I, registry: &SchemaRegistry) -> Partitions
where
    I: IntoIterator<Item = &'a RawProperties>,
{
    let mut merged = Partitions::new();
    for (i, source) in sources.into_iter().enumerate() {
        let parts = assemble(source, registry);
        debug!(
            source = i,
            root = parts.root.len(),
            metadata = parts.metadata.len(),
            variables = parts.variables.len(),
            "merging source"
        );
        merged.absorb(parts);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> RawProperties {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn registry() -> &'static SchemaRegistry {
        SchemaRegistry::global()
    }

    #[test]
    fn test_assemble_partitions() {
        let source = props(json!({
            "writer": "pdf",
            "csl": "https://www.zotero.org/styles/vancouver-superscript",
            "custom-property": "this-is-a-custom-property-string",
        }));
        let parts = assemble(&source, registry());

        assert_eq!(parts.root["writer"], "pdf");
        assert_eq!(
            parts.metadata["csl"],
            "https://www.zotero.org/styles/vancouver-superscript"
        );
        assert_eq!(parts.variables["custom-property"], "this-is-a-custom-property-string");
        assert!(!parts.root.contains_key("csl"));
    }

    #[test]
    fn test_explicit_buckets_are_absorbed() {
        let source = props(json!({
            "metadata": { "test-metadata": "test metadata" },
            "variables": { "test-variable": "test variable" },
        }));
        let parts = assemble(&source, registry());

        assert_eq!(parts.metadata["test-metadata"], "test metadata");
        assert_eq!(parts.variables["test-variable"], "test variable");
        assert!(parts.root.is_empty());
    }

    #[test]
    fn test_nested_objects_are_flattened() {
        let source = props(json!({
            "output": {
                "toc": true,
                "layout": { "geometry": "margin=2cm" },
                "metadata": { "lang": "en-GB" },
            },
            "bibliography": ["refs.bib", "more.bib"],
        }));
        let parts = assemble(&source, registry());

        assert_eq!(parts.root["toc"], true);
        assert_eq!(parts.variables["geometry"], "margin=2cm");
        assert_eq!(parts.metadata["lang"], "en-GB");
        assert_eq!(parts.metadata["bibliography"], json!(["refs.bib", "more.bib"]));
        assert!(!parts.variables.contains_key("output"));
    }

    #[test]
    fn test_citation_keys_in_variables_move_to_metadata() {
        let source = props(json!({ "variables": { "csl": "apa.csl", "title": "T" } }));
        let parts = assemble(&source, registry());

        assert_eq!(parts.metadata["csl"], "apa.csl");
        assert_eq!(parts.variables["title"], "T");
        assert!(!parts.variables.contains_key("csl"));
    }

    #[test]
    fn test_non_mapping_bucket_is_discarded() {
        let source = props(json!({ "variables": false, "metadata": "nope", "title": "T" }));
        let parts = assemble(&source, registry());

        assert_eq!(parts.len(), 1);
        assert_eq!(parts.variables["title"], "T");
    }

    #[test]
    fn test_leaf_wins_within_one_source() {
        let source = props(json!({
            "title": "leaf",
            "metadata": { "title": "explicit" },
        }));
        let parts = assemble(&source, registry());

        assert_eq!(parts.variables["title"], "leaf");
        assert!(!parts.metadata.contains_key("title"));
        assert!(parts.is_disjoint());
    }

    #[test]
    fn test_precedence() {
        let base = props(json!({ "variables": { "title": "Default Title" }, "toc": false }));
        let custom = props(json!({ "variables": { "title": "Custom Metadata Title" } }));
        let frontmatter = props(json!({ "toc": true }));

        let merged = merge_sources([&base, &custom, &frontmatter], registry());

        assert_eq!(merged.variables["title"], "Custom Metadata Title");
        assert_eq!(merged.root["toc"], true);
    }

    #[test]
    fn test_non_colliding_keys_preserved() {
        let custom = props(json!({
            "variables": {
                "title-page-background": "/working/resources/template_resources/lackadaisical_title.pdf"
            }
        }));
        let frontmatter = props(json!({ "title": "Custom Title" }));

        let merged = merge_sources([&custom, &frontmatter], registry());

        assert_eq!(merged.variables["title"], "Custom Title");
        assert_eq!(
            merged.variables["title-page-background"],
            "/working/resources/template_resources/lackadaisical_title.pdf"
        );
    }

    #[test]
    fn test_no_cross_partition_deduplication() {
        // Only possible when one source places a root option explicitly under variables
        let base = props(json!({ "toc": true }));
        let frontmatter = props(json!({ "variables": { "toc": "custom" } }));

        let merged = merge_sources([&base, &frontmatter], registry());

        assert_eq!(merged.root["toc"], true);
        assert_eq!(merged.variables["toc"], "custom");
        assert_eq!(merged.get("toc").map(|(p, _)| p), Some(Partition::Root));
    }

    #[test]
    fn test_merge_of_nothing_is_empty() {
        let merged = merge_sources(std::iter::empty(), registry());
        assert!(merged.is_empty());
    }
}

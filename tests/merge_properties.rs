//! Property tests for classification and merging

use pandoc_defaults::classify::SPECIAL_METADATA_KEYS;
use pandoc_defaults::merge::assemble;
use pandoc_defaults::{classify, merge_sources, PropertyClass, RawProperties, SchemaRegistry};
use proptest::prelude::*;
use serde_json::Value;

/// Keys drawn from every class, plus arbitrary custom names
fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vec![
            "writer", "reader", "toc", "table-of-contents", "standalone", "toc-depth",
            "csl", "bibliography", "citation-style", "suppress-bibliography",
            "title", "author", "fontsize", "custom-property",
        ])
        .prop_map(String::from),
        "[a-z][a-z0-9-]{0,12}",
    ]
}

fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[ -~]{0,16}".prop_map(Value::String),
        prop::collection::vec("[a-z]{1,6}", 0..3).prop_map(Value::from),
    ]
}

/// A flat source without explicit buckets
fn source_strategy() -> impl Strategy<Value = RawProperties> {
    prop::collection::vec((key_strategy(), leaf_strategy()), 0..12).prop_map(|entries| {
        entries
            .into_iter()
            .filter(|(key, _)| key != "metadata" && key != "variables")
            .collect()
    })
}

fn bucket_strategy() -> impl Strategy<Value = Value> {
    prop::collection::vec((key_strategy(), leaf_strategy()), 0..6)
        .prop_map(|entries| Value::Object(entries.into_iter().collect()))
}

/// A source with explicit `metadata`/`variables` mappings and nested groups
fn nested_source_strategy() -> impl Strategy<Value = RawProperties> {
    (
        source_strategy(),
        prop::option::of(bucket_strategy()),
        prop::option::of(bucket_strategy()),
        prop::collection::vec((key_strategy(), source_strategy()), 0..3),
    )
        .prop_map(|(mut source, metadata, variables, groups)| {
            for (key, group) in groups {
                if key != "metadata" && key != "variables" {
                    source.insert(key, Value::Object(group));
                }
            }
            if let Some(metadata) = metadata {
                source.insert("metadata".to_string(), metadata);
            }
            if let Some(variables) = variables {
                source.insert("variables".to_string(), variables);
            }
            source
        })
}

/// Every key that assembly has to place somewhere
fn expected_keys(source: &RawProperties, out: &mut Vec<String>) {
    for (key, value) in source {
        match (key.as_str(), value) {
            ("metadata" | "variables", Value::Object(children)) => {
                out.extend(children.keys().cloned())
            }
            (_, Value::Object(children)) => expected_keys(children, out),
            _ => out.push(key.clone()),
        }
    }
}

proptest! {
    #[test]
    fn classification_is_total(key in ".*") {
        let class = classify(&key);
        prop_assert!(matches!(
            class,
            PropertyClass::Root | PropertyClass::SpecialMetadata | PropertyClass::Variable
        ));
    }

    #[test]
    fn special_keys_are_always_metadata(index in 0..SPECIAL_METADATA_KEYS.len()) {
        prop_assert_eq!(classify(SPECIAL_METADATA_KEYS[index]), PropertyClass::SpecialMetadata);
    }

    #[test]
    fn flat_sources_merge_disjoint(sources in prop::collection::vec(source_strategy(), 0..4)) {
        let merged = merge_sources(sources.iter(), SchemaRegistry::global());
        prop_assert!(merged.is_disjoint());
    }

    #[test]
    fn assembled_source_is_disjoint(source in nested_source_strategy()) {
        prop_assert!(assemble(&source, SchemaRegistry::global()).is_disjoint());
    }

    #[test]
    fn every_nested_key_is_placed(source in nested_source_strategy()) {
        let parts = assemble(&source, SchemaRegistry::global());

        let mut keys = Vec::new();
        expected_keys(&source, &mut keys);
        for key in &keys {
            prop_assert!(parts.get(key).is_some(), "{} was dropped", key);
        }
        prop_assert!(parts.len() <= keys.len());
    }

    #[test]
    fn later_sources_win(key in key_strategy(), a in leaf_strategy(), b in leaf_strategy(), c in leaf_strategy()) {
        prop_assume!(key != "metadata" && key != "variables");
        let single = |value: &Value| -> RawProperties {
            let mut map = RawProperties::new();
            map.insert(key.clone(), value.clone());
            map
        };
        let (base, custom, frontmatter) = (single(&a), single(&b), single(&c));
        let empty = RawProperties::new();

        let all = merge_sources([&base, &custom, &frontmatter], SchemaRegistry::global());
        prop_assert_eq!(all.get(&key).map(|(_, v)| v), Some(&c));

        let without_frontmatter = merge_sources([&base, &custom, &empty], SchemaRegistry::global());
        prop_assert_eq!(without_frontmatter.get(&key).map(|(_, v)| v), Some(&b));
    }

    #[test]
    fn merge_is_idempotent(source in nested_source_strategy()) {
        let once = merge_sources([&source], SchemaRegistry::global());
        let twice = merge_sources([&source, &source], SchemaRegistry::global());
        prop_assert_eq!(once, twice);
    }
}

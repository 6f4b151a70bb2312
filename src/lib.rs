//! Pandoc Defaults
//!
//! Turns loosely-structured document frontmatter into a validated pandoc
//! defaults file.
//!
//! ## Features
//!
//! - **Classification**: every key lands at the root (a pandoc option), under
//!   `metadata` (citation fields) or under `variables` (template values)
//! - **Flattening**: nested mappings are unwound; explicit `metadata` and
//!   `variables` mappings are absorbed into their buckets
//! - **Precedence**: frontmatter overrides custom metadata overrides a base configuration
//! - **Validation**: input and output are checked against a JSON Schema of pandoc's options
//! - **Writer Inference**: the writer follows the output file's extension
//!
//! ## Output shape
//!
//! ```text
//! writer: pdf
//! output-file: /abs/out.pdf
//! toc: true
//! metadata:
//!   csl: apa.csl
//! variables:
//!   title: My Report
//! ```

pub mod classify;
pub mod config;
pub mod defaults;
pub mod error;
pub mod frontmatter;
pub mod merge;
pub mod schema;
pub mod validate;
pub mod writer;

pub use classify::{classify, PropertyClass};
pub use config::ToolConfig;
pub use defaults::{make_defaults_file, DefaultsBuilder, DefaultsFile};
pub use error::{DefaultsError, Result, ValidationStage, Violation};
pub use merge::{merge_sources, Partition, Partitions, RawProperties};
pub use schema::{PropertySpec, SchemaRegistry, ValueType};
pub use validate::Validator;
pub use writer::{infer_writer, infer_writer_for_path};

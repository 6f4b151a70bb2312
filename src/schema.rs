//! Schema Registry
//!
//! Static description of every option pandoc accepts at the root of a defaults
//! file, plus the reader and writer identifiers it knows about. The registry is
//! built once per process and never mutated.
//!
//! Informed by <https://github.com/jgm/pandoc/issues/5990> and the pandoc manual.
//! Identifier lists track `pandoc --list-input-formats` and
//! `pandoc --list-output-formats` as of pandoc 2.11.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Input formats (pandoc 2.11)
pub const READERS: &[&str] = &[
    "biblatex",
    "bibtex",
    "commonmark",
    "commonmark_x",
    "creole",
    "csljson",
    "csv",
    "docbook",
    "docx",
    "dokuwiki",
    "epub",
    "fb2",
    "gfm",
    "haddock",
    "html",
    "ipynb",
    "jats",
    "jira",
    "json",
    "latex",
    "man",
    "markdown",
    "markdown_github",
    "markdown_mmd",
    "markdown_phpextra",
    "markdown_strict",
    "mediawiki",
    "muse",
    "native",
    "odt",
    "opml",
    "org",
    "rst",
    "t2t",
    "textile",
    "tikiwiki",
    "twiki",
    "vimwiki",
];

/// Output formats (pandoc 2.11)
pub const WRITERS: &[&str] = &[
    "asciidoc",
    "asciidoctor",
    "beamer",
    "biblatex",
    "bibtex",
    "commonmark",
    "commonmark_x",
    "context",
    "csljson",
    "docbook",
    "docbook4",
    "docbook5",
    "docx",
    "dokuwiki",
    "dzslides",
    "epub",
    "epub2",
    "epub3",
    "fb2",
    "gfm",
    "haddock",
    "html",
    "html4",
    "html5",
    "icml",
    "ipynb",
    "jats",
    "jats_archiving",
    "jats_articleauthoring",
    "jats_publishing",
    "jira",
    "json",
    "latex",
    "man",
    "markdown",
    "markdown_github",
    "markdown_mmd",
    "markdown_phpextra",
    "markdown_strict",
    "mediawiki",
    "ms",
    "muse",
    "native",
    "odt",
    "opendocument",
    "opml",
    "org",
    "pdf",
    "plain",
    "pptx",
    "revealjs",
    "rst",
    "rtf",
    "s5",
    "slideous",
    "slidy",
    "tei",
    "texinfo",
    "textile",
    "xwiki",
    "zimwiki",
];

/// Format extensions usable as `+ext`/`-ext` modifiers (pandoc 2.11)
///
/// `lhs` is pandoc's shorthand for `literate_haskell`.
pub const EXTENSIONS: &[&str] = &[
    "abbreviations",
    "all_symbols_escapable",
    "amuse",
    "angle_brackets_escapable",
    "ascii_identifiers",
    "attributes",
    "auto_identifiers",
    "autolink_bare_uris",
    "backtick_code_blocks",
    "blank_before_blockquote",
    "blank_before_header",
    "bracketed_spans",
    "citations",
    "compact_definition_lists",
    "definition_lists",
    "east_asian_line_breaks",
    "element_citations",
    "emoji",
    "empty_paragraphs",
    "epub_html_exts",
    "escaped_line_breaks",
    "example_lists",
    "fancy_lists",
    "fenced_code_attributes",
    "fenced_code_blocks",
    "fenced_divs",
    "footnotes",
    "four_space_rule",
    "gfm_auto_identifiers",
    "grid_tables",
    "gutenberg",
    "hard_line_breaks",
    "header_attributes",
    "ignore_line_breaks",
    "implicit_figures",
    "implicit_header_references",
    "inline_code_attributes",
    "inline_notes",
    "intraword_underscores",
    "latex_macros",
    "lhs",
    "line_blocks",
    "link_attributes",
    "lists_without_preceding_blankline",
    "literate_haskell",
    "markdown_attribute",
    "markdown_in_html_blocks",
    "mmd_header_identifiers",
    "mmd_link_attributes",
    "mmd_title_block",
    "multiline_tables",
    "native_divs",
    "native_numbering",
    "native_spans",
    "ntb",
    "old_dashes",
    "pandoc_title_block",
    "pipe_tables",
    "raw_attribute",
    "raw_html",
    "raw_markdown",
    "raw_tex",
    "shortcut_reference_links",
    "simple_tables",
    "smart",
    "sourcepos",
    "space_in_atx_header",
    "spaced_reference_links",
    "startnum",
    "strikeout",
    "styles",
    "subscript",
    "superscript",
    "task_lists",
    "table_captions",
    "tex_math_dollars",
    "tex_math_double_backslash",
    "tex_math_single_backslash",
    "xrefs_name",
    "xrefs_number",
    "yaml_metadata_block",
];

/// Direction of a pandoc format identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Reader,
    Writer,
}

impl FormatKind {
    /// Base format names of this kind
    pub fn identifiers(&self) -> &'static [&'static str] {
        match self {
            FormatKind::Reader => READERS,
            FormatKind::Writer => WRITERS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatKind::Reader => "reader",
            FormatKind::Writer => "writer",
        }
    }
}

impl std::fmt::Display for FormatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON value type a property may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl ValueType {
    /// JSON Schema name of this type
    pub fn json_name(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Array => "array",
            ValueType::Object => "object",
        }
    }
}

/// Restriction on the values a string property may take
#[derive(Debug, Clone, PartialEq)]
pub enum Allowed {
    /// Any value of the declared type
    Any,
    /// Exactly one of a closed set
    OneOf(Vec<&'static str>),
    /// A pandoc format name, optionally followed by `+ext`/`-ext` modifiers
    Format(FormatKind),
}

/// Constraint attached to a single recognized option
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub types: Vec<ValueType>,
    pub allowed: Allowed,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    /// Shape of the children when the option is an object
    pub fields: Vec<PropertySpec>,
}

impl PropertySpec {
    pub fn new(name: &'static str, value_type: ValueType) -> Self {
        Self {
            name,
            types: vec![value_type],
            allowed: Allowed::Any,
            minimum: None,
            maximum: None,
            min_length: None,
            max_length: None,
            fields: Vec::new(),
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, ValueType::String)
    }

    pub fn number(name: &'static str) -> Self {
        Self::new(name, ValueType::Number)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, ValueType::Boolean)
    }

    pub fn array(name: &'static str) -> Self {
        Self::new(name, ValueType::Array)
    }

    pub fn object(name: &'static str) -> Self {
        Self::new(name, ValueType::Object)
    }

    /// Also accept another value type
    pub fn or(mut self, value_type: ValueType) -> Self {
        self.types.push(value_type);
        self
    }

    pub fn one_of(mut self, values: &[&'static str]) -> Self {
        self.allowed = Allowed::OneOf(values.to_vec());
        self
    }

    pub fn format(mut self, kind: FormatKind) -> Self {
        self.allowed = Allowed::Format(kind);
        self
    }

    pub fn range(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    pub fn length(mut self, min_length: u64, max_length: u64) -> Self {
        self.min_length = Some(min_length);
        self.max_length = Some(max_length);
        self
    }

    pub fn with_fields(mut self, fields: Vec<PropertySpec>) -> Self {
        self.fields = fields;
        self
    }

    /// Whether a value of the given type is acceptable
    pub fn accepts(&self, value_type: ValueType) -> bool {
        self.types.contains(&value_type)
    }

    /// Render this constraint as a JSON Schema fragment
    pub fn to_json_schema(&self) -> Value {
        let mut schema = Map::new();

        let type_value = match self.types.as_slice() {
            [single] => json!(single.json_name()),
            many => json!(many.iter().map(ValueType::json_name).collect::<Vec<_>>()),
        };
        schema.insert("type".to_string(), type_value);

        match &self.allowed {
            Allowed::Any => {}
            Allowed::OneOf(values) => {
                schema.insert("enum".to_string(), json!(values));
            }
            Allowed::Format(kind) => {
                let pattern = format_pattern(kind.identifiers(), EXTENSIONS);
                schema.insert("pattern".to_string(), json!(pattern));
            }
        }

        if let Some(minimum) = self.minimum {
            schema.insert("minimum".to_string(), json!(minimum));
        }
        if let Some(maximum) = self.maximum {
            schema.insert("maximum".to_string(), json!(maximum));
        }
        if let Some(min_length) = self.min_length {
            schema.insert("minLength".to_string(), json!(min_length));
        }
        if let Some(max_length) = self.max_length {
            schema.insert("maxLength".to_string(), json!(max_length));
        }

        if !self.fields.is_empty() {
            let properties: Map<String, Value> = self
                .fields
                .iter()
                .map(|field| (field.name.to_string(), field.to_json_schema()))
                .collect();
            schema.insert("properties".to_string(), Value::Object(properties));
        }

        Value::Object(schema)
    }
}

/// Anchored pattern matching a name from `identifiers` followed by modifiers from `extensions`
fn format_pattern(identifiers: &[&str], extensions: &[&str]) -> String {
    let alternation =
        |names: &[&str]| names.iter().map(|name| regex::escape(name)).collect::<Vec<_>>().join("|");
    format!(
        "^(?:{})(?:[+-](?:{}))*$",
        alternation(identifiers),
        alternation(extensions)
    )
}

/// Split `markdown+smart-raw_html` into its base name and modifier names
pub fn split_format(identifier: &str) -> (&str, Vec<&str>) {
    let mut parts = identifier.split(['+', '-']);
    let base = parts.next().unwrap_or(identifier);
    (base, parts.collect())
}

static GLOBAL: LazyLock<SchemaRegistry> = LazyLock::new(SchemaRegistry::pandoc);

/// Registry of recognized root options
#[derive(Debug)]
pub struct SchemaRegistry {
    properties: Vec<PropertySpec>,
    index: HashMap<&'static str, usize>,
    readers: HashSet<&'static str>,
    writers: HashSet<&'static str>,
    extensions: HashSet<&'static str>,
}

impl SchemaRegistry {
    /// The process-wide registry for the targeted pandoc version
    pub fn global() -> &'static SchemaRegistry {
        &GLOBAL
    }

    /// Build a registry from an explicit property list
    pub fn from_properties(properties: Vec<PropertySpec>) -> Self {
        let index = properties
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.name, i))
            .collect();
        Self {
            properties,
            index,
            readers: READERS.iter().copied().collect(),
            writers: WRITERS.iter().copied().collect(),
            extensions: EXTENSIONS.iter().copied().collect(),
        }
    }

    /// Every option understood by pandoc's defaults files
    pub fn pandoc() -> Self {
        use PropertySpec as P;

        Self::from_properties(vec![
            // General
            P::string("input-file"),
            P::array("input-files"),
            P::string("reader").format(FormatKind::Reader),
            P::string("writer").format(FormatKind::Writer),
            P::string("output-file"),
            P::string("data-dir"),
            P::array("metadata-files"),
            P::boolean("file-scope"),
            P::boolean("standalone"),
            P::string("template"),
            P::object("variables").or(ValueType::Boolean),
            P::object("metadata"),
            P::string("wrap").one_of(&["auto", "none", "preserve"]),
            P::boolean("ascii"),
            P::boolean("toc"),
            P::boolean("table-of-contents"),
            P::number("toc-depth").range(1.0, 5.0),
            P::boolean("number-sections"),
            P::array("number-offset"),
            P::string("top-level-division").one_of(&["default", "section", "chapter", "part"]),
            P::string("extract-media"),
            P::array("resource-path"),
            P::array("include-in-header"),
            P::array("include-after-body"),
            P::array("include-before-body"),
            // Enumerated styles exist, but a path to a theme file is also valid
            P::string("highlight-style"),
            P::array("syntax-definitions"),
            P::number("dpi"),
            P::string("eol").one_of(&["lf", "crlf", "native"]),
            P::number("columns"),
            P::boolean("preserve-tabs"),
            P::number("tab-stop"),
            P::string("pdf-engine").one_of(&["pdflatex", "xelatex", "lualatex", "tectonic", "latexmk"]),
            P::array("pdf-engine-opts"),
            P::string("pdf-engine-opt"),
            P::string("reference-doc"),
            P::boolean("self-contained"),
            P::array("request-headers"),
            P::string("abbreviations"),
            P::array("indented-code-classes"),
            P::string("default-image-extension").length(3, 5),
            P::array("filters"),
            P::string("cite-method").one_of(&["citeproc", "natbib", "biblatex"]),
            P::number("shift-heading-level-by"),
            P::string("track-changes").one_of(&["accept", "reject", "all"]),
            P::boolean("strip-comments"),
            P::boolean("reference-links"),
            P::string("reference-location"),
            P::boolean("atx-headers"),
            P::boolean("listings"),
            P::boolean("incremental"),
            P::number("slide-level").range(1.0, 5.0),
            P::boolean("section-divs"),
            P::boolean("html-q-tags"),
            P::string("email-obfuscation").one_of(&["none", "javascript", "references"]),
            P::string("identifier-prefix"),
            P::string("title-prefix"),
            P::array("css"),
            // EPUB
            P::string("epub-subdirectory"),
            P::string("epub-cover-image"),
            P::string("epub-metadata"),
            P::array("epub-fonts"),
            P::number("epub-chapter-level").range(1.0, 5.0),
            P::string("ipynb-output").one_of(&["all", "none", "best"]),
            P::object("html-math-method").with_fields(vec![
                P::string("method").one_of(&["mathjax", "katex", "gladtex", "mathml"]),
                P::string("url"),
            ]),
            // Diagnostics
            P::boolean("trace"),
            P::boolean("dump-args"),
            P::boolean("ignore-args"),
            P::string("verbosity").one_of(&["INFO", "WARNING", "ERROR"]),
            P::boolean("fail-if-warnings"),
            P::string("log-file"),
            // Citations; accepted at the root but routed into metadata
            P::string("bibliography").or(ValueType::Array),
            P::string("csl"),
            P::string("citation-abbreviations"),
        ])
    }

    /// Whether `key` names a recognized root option
    pub fn is_root_property(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Constraint for a recognized root option
    pub fn property(&self, key: &str) -> Option<&PropertySpec> {
        self.index.get(key).map(|&i| &self.properties[i])
    }

    /// All recognized options, in declaration order
    pub fn properties(&self) -> impl Iterator<Item = &PropertySpec> {
        self.properties.iter()
    }

    pub fn readers(&self) -> &HashSet<&'static str> {
        &self.readers
    }

    pub fn writers(&self) -> &HashSet<&'static str> {
        &self.writers
    }

    pub fn extensions(&self) -> &HashSet<&'static str> {
        &self.extensions
    }

    /// Whether `id` is a known reader with only known extension modifiers
    pub fn is_known_reader(&self, id: &str) -> bool {
        self.is_known_format(FormatKind::Reader, id)
    }

    /// Whether `id` is a known writer with only known extension modifiers
    pub fn is_known_writer(&self, id: &str) -> bool {
        self.is_known_format(FormatKind::Writer, id)
    }

    pub fn is_known_format(&self, kind: FormatKind, id: &str) -> bool {
        let (base, _) = split_format(id);
        let bases = match kind {
            FormatKind::Reader => &self.readers,
            FormatKind::Writer => &self.writers,
        };
        bases.contains(base) && self.unknown_extensions(id).is_empty()
    }

    /// Modifiers of `id` that name no known extension
    pub fn unknown_extensions<'a>(&self, id: &'a str) -> Vec<&'a str> {
        let (_, modifiers) = split_format(id);
        modifiers
            .into_iter()
            .filter(|name| !self.extensions.contains(name))
            .collect()
    }

    /// Render the registry as a Draft 7 JSON Schema document
    ///
    /// Only declared properties are constrained; unknown keys are allowed so that
    /// frontmatter carrying template variables still validates.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|spec| (spec.name.to_string(), spec.to_json_schema()))
            .collect();

        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "pandoc defaults file",
            "type": "object",
            "properties": properties,
        })
    }
}

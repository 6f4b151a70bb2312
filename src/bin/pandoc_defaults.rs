//! Pandoc Defaults CLI
//!
//! Builds pandoc defaults files from document frontmatter and inspects how
//! keys are classified.
//!
//! Usage:
//!   pandoc-defaults build report.md --output-file report.pdf
//!   pandoc-defaults validate defaults.yaml
//!   pandoc-defaults classify csl toc title
//!   pandoc-defaults formats markdown+smart

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use pandoc_defaults::config::OutputFormat;
use pandoc_defaults::frontmatter::load_properties;
use pandoc_defaults::{
    classify, infer_writer_for_path, validate, DefaultsBuilder, DefaultsError, SchemaRegistry,
    ToolConfig, ValidationStage,
};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pandoc-defaults")]
#[command(about = "Generate validated pandoc defaults files from frontmatter")]
struct Cli {
    /// Configuration file (in addition to the default locations)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Yaml => Format::Yaml,
            OutputFormat::Json => Format::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a defaults file from a document's frontmatter
    Build {
        /// Markdown document, or a YAML/JSON properties file
        input: PathBuf,

        /// Custom metadata file; the document's frontmatter overrides it
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Base configuration file; lowest precedence
        #[arg(short, long)]
        base: Option<PathBuf>,

        /// Output file for pandoc; also selects the writer
        #[arg(short = 'o', long)]
        output_file: Option<PathBuf>,

        /// Pandoc writer, overriding inference
        #[arg(short, long)]
        writer: Option<String>,

        /// Where to write the defaults file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Serialization of the defaults file
        #[arg(short, long, value_enum)]
        format: Option<Format>,
    },

    /// Check a defaults or frontmatter file against the schema
    Validate {
        /// File to check
        file: PathBuf,
    },

    /// Show where keys would be placed
    Classify {
        /// Keys to classify
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Show the writer inferred for an output path
    Writer {
        /// Output path
        path: PathBuf,
    },

    /// Print the JSON Schema of recognized options
    Schema,

    /// List known readers, writers and extensions, or check one identifier
    Formats {
        /// Reader or writer identifier to check, e.g. `markdown+smart`
        id: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        report(&e);
        std::process::exit(1);
    }
}

fn report(e: &anyhow::Error) {
    eprintln!("❌ Error: {:#}", e);
    if let Some(defaults_error) = e.downcast_ref::<DefaultsError>() {
        for violation in defaults_error.violations() {
            error!(key = %violation.key, "{}", violation.message);
            eprintln!("   └─ {}", violation);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Build {
            input,
            metadata,
            base,
            output_file,
            writer,
            out,
            format,
        } => {
            let config = ToolConfig::load_from(cli.config.as_deref())
                .context("Failed to load configuration")?;

            let frontmatter = load_properties(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;

            let metadata_path = metadata.or(config.sources.custom_metadata);
            let custom_metadata = metadata_path
                .as_ref()
                .map(|path| {
                    load_properties(path)
                        .with_context(|| format!("Failed to read custom metadata {}", path.display()))
                })
                .transpose()?;

            let base_path = base.or(config.sources.base);
            let base = base_path
                .as_ref()
                .map(|path| {
                    load_properties(path)
                        .with_context(|| format!("Failed to read base configuration {}", path.display()))
                })
                .transpose()?;

            let mut builder = DefaultsBuilder::new(&frontmatter);
            if let Some(custom_metadata) = &custom_metadata {
                builder = builder.custom_metadata(custom_metadata);
            }
            if let Some(base) = &base {
                builder = builder.base(base);
            }
            if let Some(output_file) = output_file {
                builder = builder.output_file(output_file);
            }
            if let Some(writer) = writer {
                builder = builder.writer(writer);
            }

            let defaults = builder.build()?;
            info!(
                root = defaults.root().len(),
                metadata = defaults.metadata().len(),
                variables = defaults.variables().len(),
                "defaults file assembled"
            );

            let rendered = match format.unwrap_or_else(|| config.output.format.into()) {
                Format::Yaml => defaults.to_yaml()?,
                Format::Json => defaults.to_json_pretty()?,
            };

            if let Some(path) = out {
                fs::write(&path, &rendered)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("✅ Defaults written to {:?}", path);
            } else {
                println!("{}", rendered);
            }
            Ok(())
        }

        Commands::Validate { file } => {
            let properties = load_properties(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;

            validate::validate(&Value::Object(properties), ValidationStage::Input)?;
            println!("✅ {} - valid", file.display());
            Ok(())
        }

        Commands::Classify { keys } => {
            let width = keys.iter().map(String::len).max().unwrap_or(0);
            for key in &keys {
                println!("{:width$}  {}", key, classify(key), width = width);
            }
            Ok(())
        }

        Commands::Writer { path } => {
            match infer_writer_for_path(&path) {
                Some(writer) => println!("{}", writer),
                None => println!("unset"),
            }
            Ok(())
        }

        Commands::Schema => {
            let schema = SchemaRegistry::global().to_json_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }

        Commands::Formats { id: Some(id) } => {
            let registry = SchemaRegistry::global();
            let reader = registry.is_known_reader(&id);
            let writer = registry.is_known_writer(&id);
            println!("reader: {}", if reader { "✅" } else { "❌" });
            println!("writer: {}", if writer { "✅" } else { "❌" });

            let unknown = registry.unknown_extensions(&id);
            if !unknown.is_empty() {
                println!("unknown extensions: {}", unknown.join(", "));
            }
            if reader || writer {
                Ok(())
            } else {
                anyhow::bail!("{} is neither a known reader nor a known writer", id)
            }
        }

        Commands::Formats { id: None } => {
            let registry = SchemaRegistry::global();
            for (label, names) in [
                ("Readers", registry.readers()),
                ("Writers", registry.writers()),
                ("Extensions", registry.extensions()),
            ] {
                let mut names: Vec<_> = names.iter().copied().collect();
                names.sort_unstable();
                println!("{}:\n  {}", label, names.join(" "));
            }
            Ok(())
        }
    }
}

//! Configuration for the `pandoc-defaults` tool
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (pandoc-defaults.toml)
//! - Environment variables (PANDOC_DEFAULTS__*)
//!
//! ## Example config file (pandoc-defaults.toml):
//! ```toml
//! [sources]
//! base = "~/.config/pandoc/base.yaml"
//! custom_metadata = "project-metadata.yaml"
//!
//! [output]
//! format = "yaml"
//! ```

use std::path::PathBuf;

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Extra property sources merged under the document's frontmatter
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Lower-precedence property sources
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Base configuration; lowest precedence
    #[serde(default)]
    pub base: Option<PathBuf>,

    /// Custom metadata; overridden by frontmatter
    #[serde(default)]
    pub custom_metadata: Option<PathBuf>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Serialization of the defaults file
    #[serde(default)]
    pub format: OutputFormat,
}

/// Serialization format for the defaults file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl ToolConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, with `config_path` as a required extra file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "pandoc-defaults.toml",
            ".pandoc-defaults.toml",
            "config/pandoc-defaults.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("org", "pandoc", "pandoc-defaults") {
            let xdg_config = config_dir.config_dir().join("pandoc-defaults.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("PANDOC_DEFAULTS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ToolConfig::default();
        assert_eq!(config.output.format, OutputFormat::Yaml);
        assert!(config.sources.base.is_none());
    }

    #[test]
    fn test_serialize_config() {
        let config = ToolConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("format = \"yaml\""));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[sources]\nbase = \"base.yaml\"\n\n[output]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = ToolConfig::load_from(path.to_str()).unwrap();
        assert_eq!(config.sources.base, Some(PathBuf::from("base.yaml")));
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = ToolConfig::default();
        config.sources.custom_metadata = Some(PathBuf::from("meta.yaml"));
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = ToolConfig::load_from(path.to_str()).unwrap();
        assert_eq!(loaded.sources.custom_metadata, Some(PathBuf::from("meta.yaml")));
    }
}

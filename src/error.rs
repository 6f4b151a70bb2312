//! Error types for defaults file generation

use std::fmt;

use thiserror::Error;

/// Result type for defaults operations
pub type Result<T> = std::result::Result<T, DefaultsError>;

/// Which side of assembly a validation ran on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStage {
    /// Raw frontmatter, before classification
    Input,
    /// The fully assembled defaults object
    Output,
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationStage::Input => write!(f, "input"),
            ValidationStage::Output => write!(f, "output"),
        }
    }
}

/// A single constraint failure, attributed to a root key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Root key the failure belongs to (empty for the object itself)
    pub key: String,
    pub message: String,
}

impl Violation {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.key, self.message)
        }
    }
}

/// Defaults generation errors
#[derive(Error, Debug)]
pub enum DefaultsError {
    #[error("Validation of {stage} against schema returned {} error(s)", .violations.len())]
    Validation {
        stage: ValidationStage,
        violations: Vec<Violation>,
    },

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid source {path}: {reason}")]
    InvalidSource { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl DefaultsError {
    /// Violations carried by a validation failure, empty for every other error
    pub fn violations(&self) -> &[Violation] {
        match self {
            DefaultsError::Validation { violations, .. } => violations,
            _ => &[],
        }
    }
}

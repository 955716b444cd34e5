//! quizkit configuration.
//!
//! Loaded from `quizkit.toml`; every field has a serde default so an empty
//! or missing file yields [`QuizkitConfig::default`].

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default config file name looked up by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "quizkit.toml";

/// Top-level quizkit configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizkitConfig {
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Rules applied by the schema validator beyond the bare shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Reject multiple-choice questions whose correct answer is not among
    /// the options.
    #[serde(default = "default_true")]
    pub require_answers_in_options: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            require_answers_in_options: true,
        }
    }
}

/// Behaviour of a running quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Move to the next question when a non-final question's timer expires.
    #[serde(default = "default_true")]
    pub auto_advance: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { auto_advance: true }
    }
}

fn default_true() -> bool {
    true
}

impl QuizkitConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration from `path` if given, else from
    /// [`DEFAULT_CONFIG_FILE`] when it exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    tracing::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid quizkit configuration")
    }
}

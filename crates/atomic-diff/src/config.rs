//! Configuration file support

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How records are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per record
    #[default]
    Text,
    /// Records grouped by kind as pretty JSON
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON pointer to the identity field of each item
    pub key: String,
    /// Pair removed and inserted items with the same identity
    pub detect_moves: bool,
    /// Output format when `--format` is not given
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key: "/id".to_string(),
            detect_moves: true,
            format: OutputFormat::Text,
        }
    }
}

impl Config {
    /// `<config_dir>/atomic-diff/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("atomic-diff").join("config.toml"))
    }

    /// Load from an explicit path, else from the default path if present
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

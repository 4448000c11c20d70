//! Optional TOML configuration file
//!
//! ```toml
//! [generate]
//! output_path = "output/valuesets"
//! output_prefix = "valueset-"
//! output_version = "r4"
//! encoding = "json"
//!
//! [bundle]
//! id = "opioid-cds-bundle"
//! max_entries = 50
//! post = "http://localhost:8080/fhir"
//! ```
//!
//! Command-line flags override file values, which override the defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_OUTPUT_PATH: &str = "output";
pub const DEFAULT_OUTPUT_PREFIX: &str = "valueset-";
pub const DEFAULT_MAX_ENTRIES: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateSettings {
    pub path_to_spreadsheet: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub output_prefix: Option<String>,
    pub output_version: Option<String>,
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundleSettings {
    pub input: Option<PathBuf>,
    pub id: Option<String>,
    pub output_version: Option<String>,
    pub encoding: Option<String>,
    pub output: Option<PathBuf>,
    pub max_entries: Option<usize>,
    pub post: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub generate: GenerateSettings,
    pub bundle: BundleSettings,
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid configuration file")
    }
}

/// Load settings from `path`, or defaults when no file was given
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    Settings::from_toml(&content).with_context(|| format!("In {}", path.display()))
}

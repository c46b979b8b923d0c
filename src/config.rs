use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::BatchError;
use crate::markup::{ClassLookup, ParseOptions};
use crate::output::{Backend, OutputMode};

const DEFAULT_SOURCE: &str = "./test/input";
const DEFAULT_DESTINATION: &str = "./test/output";
const DEFAULT_EXTENSION: &str = "svg";
const DEFAULT_AGGREGATE_FILE: &str = "shapes.json";

/// What the batch driver does when one document fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Stop at the first failing document
    #[default]
    Abort,
    /// Log the failure and continue with the next document
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_source")]
    pub source: PathBuf,
    #[serde(default = "default_destination")]
    pub destination: PathBuf,
    /// File extension of input documents, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default)]
    pub mode: OutputMode,
    #[serde(default)]
    pub backend: Backend,

    /// Write one combined file keyed by document name
    #[serde(default)]
    pub aggregate: bool,
    #[serde(default = "default_aggregate_file")]
    pub aggregate_file: String,

    #[serde(default)]
    pub on_error: OnError,
    #[serde(default)]
    pub pretty: bool,

    #[serde(default)]
    pub class_lookup: ClassLookup,
    #[serde(default = "default_excluded_layers")]
    pub excluded_layers: Vec<String>,
}

fn default_source() -> PathBuf {
    PathBuf::from(DEFAULT_SOURCE)
}
fn default_destination() -> PathBuf {
    PathBuf::from(DEFAULT_DESTINATION)
}
fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}
fn default_aggregate_file() -> String {
    DEFAULT_AGGREGATE_FILE.to_string()
}
fn default_excluded_layers() -> Vec<String> {
    ParseOptions::default().excluded_layers
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            source: default_source(),
            destination: default_destination(),
            extension: default_extension(),
            mode: OutputMode::default(),
            backend: Backend::default(),
            aggregate: false,
            aggregate_file: default_aggregate_file(),
            on_error: OnError::default(),
            pretty: false,
            class_lookup: ClassLookup::default(),
            excluded_layers: default_excluded_layers(),
        }
    }
}

impl BatchConfig {
    pub fn from_toml(content: &str) -> Result<Self, BatchError> {
        toml::from_str(content)
            .map_err(|e| BatchError::Config(format!("Failed to parse TOML: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self, BatchError> {
        let content = std::fs::read_to_string(path).map_err(|e| BatchError::io(path, e))?;
        Self::from_toml(&content)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            class_lookup: self.class_lookup,
            excluded_layers: self.excluded_layers.clone(),
        }
    }

    /// Whether `path` has the configured extension, ignoring case
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(self.extension.trim_start_matches('.')))
    }
}

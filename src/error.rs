//! Error types for svg2shapes

use std::path::PathBuf;
use thiserror::Error;

/// Result type for document parsing
pub type Result<T> = std::result::Result<T, ParseError>;

/// Reasons a single document cannot be converted.
///
/// Any of these aborts the whole document: no partial model is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A required delimiter (view box, style block, group or element markers) is missing
    #[error("Structure not found: {0}")]
    StructuralNotFound(String),

    /// A required attribute is absent from an element
    #[error("Missing attribute '{attribute}' on <{element}>")]
    AttributeMissing { element: String, attribute: String },

    /// An attribute is present but its value cannot be interpreted
    #[error("Malformed attribute {attribute}=\"{value}\"")]
    MalformedAttribute { attribute: String, value: String },

    /// Element text matches none of the known shape keywords
    #[error("Unrecognized shape element: {0}")]
    UnrecognizedShapeKind(String),

    /// A style rule lacks a class identifier or a brace-delimited body
    #[error("Malformed style rule: {0}")]
    MalformedStyleRule(String),

    /// The markup could not be read as XML (tree backend only)
    #[error("XML parse error: {0}")]
    Xml(String),
}

impl ParseError {
    pub(crate) fn missing(element: &str, attribute: &str) -> Self {
        ParseError::AttributeMissing {
            element: element.to_string(),
            attribute: attribute.to_string(),
        }
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        ParseError::StructuralNotFound(what.into())
    }
}

/// Errors raised by the batch driver
#[derive(Error, Debug)]
pub enum BatchError {
    /// Reading the source directory or writing an artifact failed
    #[error("IO error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document failed to parse and the batch is configured to abort
    #[error("Failed to convert {}: {}", .file.display(), .source)]
    Parse {
        file: PathBuf,
        #[source]
        source: ParseError,
    },

    /// Two inputs would be written under the same document name
    #[error("Inputs {} and {} share the document name '{name}'", .first.display(), .second.display())]
    DuplicateName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Serializing a model failed
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be read or understood
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BatchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BatchError::Io {
            path: path.into(),
            source,
        }
    }
}

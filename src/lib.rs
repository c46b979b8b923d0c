//! # svg2shapes
//!
//! Converts SVG documents exported by a design tool into compact records of
//! shapes, style classes and named layers, ready to be loaded by a game or
//! UI runtime without parsing markup.
//!
//! ```rust,ignore
//! use svg2shapes::{parse_document, output::{Converted, to_json}};
//!
//! let svg = std::fs::read_to_string("ship.svg").unwrap();
//! let model = parse_document(&svg).unwrap();
//! let json = to_json(&Converted::Layers(model), Some("ship"), true).unwrap();
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod logging;
pub mod markup;
pub mod output;

pub use error::{BatchError, ParseError, Result};
pub use markup::{
    DocumentModel, FlatModel, ParseOptions, parse_document, parse_document_tree,
    parse_document_with, parse_flat,
};

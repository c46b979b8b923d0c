mod attr;
mod document;
mod scan;
mod shape;
mod style;
mod tree;
mod types;

pub use attr::{
    AttributeMap, AttributeSource, ClassLookup, ElementText, extract_attribute,
    extract_class_name, extract_quoted_attribute,
};
pub use document::{
    ParseOptions, Stage, parse_dimensions, parse_document, parse_document_with, parse_flat,
};
pub use scan::{GroupSlice, LogicalLine, merge_lines, scan_elements, scan_groups};
pub use shape::{build_shape, classify_shape, detect_kind, parse_points};
pub use style::{parse_style_line, parse_styles};
pub use tree::{GroupNode, MarkupTree, parse_document_tree, project_tree, read_tree};
pub use types::*;

//! Conversion entry point and JSON serialization of the models.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::markup::{
    DocumentModel, FlatModel, ParseOptions, parse_document_tree, parse_document_with, parse_flat,
};

/// Shape of the produced record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// `dimensions`, `classes`, `hitboxes`, `layers`
    #[default]
    Layers,
    /// `dimensions`, `classes`, `shapes` from a single line-by-line pass
    Flat,
}

/// How layered documents are read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Delimiter scanning over the export's fixed layout
    #[default]
    Scan,
    /// XML reader followed by typed projection
    Tree,
}

/// A converted document in either output mode
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Converted {
    Layers(DocumentModel),
    Flat(FlatModel),
}

/// Convert one document.
///
/// Flat mode always uses the line scanner; `backend` only selects how
/// layered documents are read.
pub fn convert(
    text: &str,
    mode: OutputMode,
    backend: Backend,
    options: &ParseOptions,
) -> Result<Converted> {
    match (mode, backend) {
        (OutputMode::Layers, Backend::Scan) => {
            parse_document_with(text, options).map(Converted::Layers)
        }
        (OutputMode::Layers, Backend::Tree) => {
            parse_document_tree(text, options).map(Converted::Layers)
        }
        (OutputMode::Flat, _) => parse_flat(text, options).map(Converted::Flat),
    }
}

#[derive(Serialize)]
struct Named<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(flatten)]
    document: &'a Converted,
}

fn named<'a>(document: &'a Converted, name: Option<&'a str>) -> Named<'a> {
    Named {
        name: name.filter(|n| !n.is_empty()),
        document,
    }
}

/// Serialize a document; `name` is written only when non-empty
pub fn to_json(
    document: &Converted,
    name: Option<&str>,
    pretty: bool,
) -> serde_json::Result<String> {
    let value = named(document, name);
    if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
}

/// Same record as [`to_json`], as a JSON value for aggregation
pub fn to_value(
    document: &Converted,
    name: Option<&str>,
) -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(named(document, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOC: &str = r#"<svg viewBox="0 0 54 56">
<style type="text/css">
	.st0{fill:#112233;stroke-width:2;}
</style>
<g id="fill">
	<rect x="1" y="2" width="10" height="20"/>
</g>
<g id="hitBoxes">
	<rect class="st0" x="3" y="4" width="5" height="6"/>
</g>
</svg>"#;

    fn layered() -> Converted {
        convert(DOC, OutputMode::Layers, Backend::Scan, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn layered_record_field_names() {
        let value = to_value(&layered(), Some("icon")).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "icon",
                "dimensions": {"width": "54", "height": "56"},
                "classes": [{"className": "st0", "fill": "#112233", "stroke-width": "2"}],
                "hitboxes": [{"x": "3", "y": "4", "width": "5", "height": "6"}],
                "layers": [{
                    "name": "fill",
                    "shapes": [{"type": "rect", "className": "default", "x": "1", "y": "2", "w": "10", "h": "20"}]
                }]
            })
        );
    }

    #[test]
    fn empty_name_is_omitted() {
        let json = to_json(&layered(), Some(""), false).unwrap();
        assert!(json.starts_with(r#"{"dimensions":"#));
        let json = to_json(&layered(), None, false).unwrap();
        assert!(json.starts_with(r#"{"dimensions":"#));
    }

    #[test]
    fn name_comes_first_and_class_keys_keep_order() {
        let json = to_json(&layered(), Some("icon"), false).unwrap();
        assert!(json.starts_with(r##"{"name":"icon","dimensions":{"width":"54","height":"56"},"classes":[{"className":"st0","fill":"#112233","stroke-width":"2"}]"##));
    }

    #[test]
    fn flat_record_lists_shapes() {
        let options = ParseOptions::default();
        let flat = convert(DOC, OutputMode::Flat, Backend::Tree, &options).unwrap();
        let value = to_value(&flat, None).unwrap();
        assert_eq!(value["shapes"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["shapes"][1]["className"], "st0");
        assert!(value.get("layers").is_none());
    }

    #[test]
    fn shape_variants_serialize_short_names() {
        let doc = r#"<svg viewBox="0 0 9 9"><g id="a">
<circle cx="1" r="2"/>
<ellipse rx="3" ry="4"/>
<polygon points="1,2 3,4"/>
<path d="M0 0z"/>
</g><g id="h"></g></svg>"#;
        let options = ParseOptions::default();
        let converted = convert(doc, OutputMode::Layers, Backend::Scan, &options).unwrap();
        let value = to_value(&converted, None).unwrap();
        let shapes = &value["layers"][0]["shapes"];
        assert_eq!(shapes[0], json!({"type": "circle", "className": "default", "x": "1", "y": "0", "r": "2"}));
        assert_eq!(shapes[1], json!({"type": "ellipse", "className": "default", "x": "0", "y": "0", "rx": "3", "ry": "4"}));
        assert_eq!(shapes[2]["points"], json!([{"x": "1", "y": "2"}, {"x": "3", "y": "4"}]));
        assert_eq!(shapes[3], json!({"type": "path", "className": "default", "coords": "M0 0z"}));
    }
}

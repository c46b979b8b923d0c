//! Structural backend: read the markup as XML, then project groups and
//! shape elements through the same shape builders as the text scanner.
//!
//! Unlike the scanner this tolerates attribute reordering, arbitrary line
//! wrapping and nested groups (their shapes belong to the enclosing
//! top-level group).

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::reader::Reader as XmlReader;
use tracing::debug;

use super::attr::AttributeMap;
use super::document::{ParseOptions, parse_dimensions, split_hitbox_layer, with_fallback_class};
use super::shape::build_shape;
use super::style::parse_style_line;
use super::types::*;
use crate::error::{ParseError, Result};

/// Elements of one top-level group, before projection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupNode {
    pub id: Option<String>,
    pub elements: Vec<AttributeMap>,
}

/// Everything the projection needs from the markup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkupTree {
    pub view_box: Option<String>,
    pub style_text: String,
    pub groups: Vec<GroupNode>,
}

fn read_attributes(e: &BytesStart, decoder: Decoder) -> Result<AttributeMap> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let attributes = e
        .attributes()
        .map(|a| -> Result<(String, String)> {
            let a = a.map_err(xml_error)?;
            let value = a.decode_and_unescape_value(decoder).map_err(xml_error)?;
            Ok((
                String::from_utf8_lossy(a.key.as_ref()).to_string(),
                value.into_owned(),
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(AttributeMap::new(tag, attributes))
}

fn xml_error(e: impl std::fmt::Display) -> ParseError {
    ParseError::Xml(e.to_string())
}

/// Stage one: collect the view box, style text and grouped elements
pub fn read_tree(text: &str) -> Result<MarkupTree> {
    let mut reader = XmlReader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut tree = MarkupTree::default();
    let mut buf = Vec::new();
    let mut group_depth = 0usize;
    let mut in_style = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(XmlEvent::Start(ref e)) => {
                let node = read_attributes(e, reader.decoder())?;
                match node.tag.as_str() {
                    "svg" => tree.view_box = find(&node, "viewBox"),
                    "style" => in_style = true,
                    "g" => {
                        if group_depth == 0 {
                            tree.groups.push(GroupNode {
                                id: find(&node, "id"),
                                elements: Vec::new(),
                            });
                        }
                        group_depth += 1;
                    }
                    _ => push_element(&mut tree, group_depth, node),
                }
            }
            Ok(XmlEvent::Empty(ref e)) => {
                let node = read_attributes(e, reader.decoder())?;
                match node.tag.as_str() {
                    "svg" => tree.view_box = find(&node, "viewBox"),
                    "g" if group_depth == 0 => tree.groups.push(GroupNode {
                        id: find(&node, "id"),
                        elements: Vec::new(),
                    }),
                    "g" => {}
                    _ => push_element(&mut tree, group_depth, node),
                }
            }
            Ok(XmlEvent::Text(ref e)) if in_style => {
                tree.style_text.push_str(&e.decode().map_err(xml_error)?);
            }
            Ok(XmlEvent::CData(ref e)) if in_style => {
                tree.style_text.push_str(&String::from_utf8_lossy(e));
            }
            Ok(XmlEvent::End(ref e)) => match e.name().as_ref() {
                b"style" => in_style = false,
                b"g" => group_depth = group_depth.saturating_sub(1),
                _ => {}
            },
            Ok(XmlEvent::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(tree)
}

fn find(node: &AttributeMap, name: &str) -> Option<String> {
    node.attributes
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.clone())
}

// Only elements inside a group become shapes; text and other content are skipped
fn push_element(tree: &mut MarkupTree, group_depth: usize, node: AttributeMap) {
    if group_depth == 0 {
        return;
    }
    if let Some(group) = tree.groups.last_mut() {
        group.elements.push(node);
    }
}

/// Split style text into rules; each rule ends at its closing brace
fn style_rules(style_text: &str) -> impl Iterator<Item = String> + '_ {
    style_text
        .split_inclusive('}')
        .map(str::trim)
        .filter(|rule| !rule.is_empty())
        .map(str::to_string)
}

/// Stage two: project a markup tree into the document model
pub fn project_tree(tree: MarkupTree, options: &ParseOptions) -> Result<DocumentModel> {
    let view_box = tree
        .view_box
        .ok_or_else(|| ParseError::not_found("viewBox"))?;
    let dimensions = parse_dimensions(&format!("viewBox=\"{}\"", view_box.trim()))?;

    let style_classes = style_rules(&tree.style_text)
        .map(|rule| parse_style_line(&rule))
        .collect::<Result<Vec<_>>>()?;

    let mut layers = Vec::with_capacity(tree.groups.len());
    for group in tree.groups {
        let name = group.id.ok_or_else(|| ParseError::missing("g", "id"))?;
        let shapes = group
            .elements
            .iter()
            .map(|element| {
                let kind = ShapeKind::from_keyword(&element.tag)
                    .ok_or_else(|| ParseError::UnrecognizedShapeKind(element.tag.clone()))?;
                build_shape(kind, element, options.class_lookup)
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(layer = %name, shapes = shapes.len(), "layer projected");
        layers.push(Layer { name, shapes });
    }

    let (hitboxes, layers) = split_hitbox_layer(layers, options)?;
    Ok(DocumentModel {
        dimensions,
        style_classes: with_fallback_class(style_classes),
        hitboxes,
        layers,
    })
}

/// Convert a document through the XML reader instead of delimiter scanning
pub fn parse_document_tree(text: &str, options: &ParseOptions) -> Result<DocumentModel> {
    project_tree(read_tree(text)?, options)
}

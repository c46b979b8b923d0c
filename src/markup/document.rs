use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::attr::{ClassLookup, ElementText};
use super::scan::{LogicalLine, merge_lines, scan_elements, scan_groups};
use super::shape::{build_shape, classify_shape};
use super::style::{find_style_block, parse_style_line, parse_styles};
use super::types::*;
use crate::error::{ParseError, Result};

static VIEW_BOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"viewBox="(\S+) (\S+) (\S+) (\S+)""#).expect("valid viewBox regex")
});

/// Caller-supplied knobs for one conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseOptions {
    #[serde(default)]
    pub class_lookup: ClassLookup,
    /// Layers dropped from the output by name
    #[serde(default = "default_excluded_layers")]
    pub excluded_layers: Vec<String>,
}

fn default_excluded_layers() -> Vec<String> {
    vec![TEMP_LAYER.to_string()]
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            class_lookup: ClassLookup::default(),
            excluded_layers: default_excluded_layers(),
        }
    }
}

/// Extract `{width, height}` from `viewBox="min-x min-y width height"`
pub fn parse_dimensions(document: &str) -> Result<Dimensions> {
    let caps = VIEW_BOX
        .captures(document)
        .ok_or_else(|| ParseError::not_found("viewBox"))?;

    for i in 1..=4 {
        let value = &caps[i];
        if value.parse::<f64>().is_err() {
            return Err(ParseError::MalformedAttribute {
                attribute: "viewBox".to_string(),
                value: caps[0].to_string(),
            });
        }
    }

    Ok(Dimensions {
        width: caps[3].to_string(),
        height: caps[4].to_string(),
    })
}

/// Convert a document with default options
pub fn parse_document(text: &str) -> Result<DocumentModel> {
    parse_document_with(text, &ParseOptions::default())
}

/// Convert a document into dimensions, classes, hitboxes and layers.
///
/// The last group is the hitbox layer; excluded layers are dropped.
pub fn parse_document_with(text: &str, options: &ParseOptions) -> Result<DocumentModel> {
    let mut assembler = Assembler::new(text, options);
    assembler.extract_dimensions()?;
    assembler.extract_styles()?;
    assembler.extract_layers()?;
    assembler.separate_hitboxes()?;
    assembler.finish()
}

// ============================================
// Assembler state machine
// ============================================

/// Progress of a layered conversion; stages only move forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    DimensionsExtracted,
    StylesExtracted,
    LayersExtracted,
    HitboxesSeparated,
    Done,
}

struct Assembler<'a> {
    text: &'a str,
    options: &'a ParseOptions,
    stage: Stage,
    // Byte offset where group scanning begins
    body_start: usize,
    dimensions: Option<Dimensions>,
    style_classes: Vec<StyleClass>,
    layers: Vec<Layer>,
    hitboxes: Vec<Hitbox>,
}

impl<'a> Assembler<'a> {
    fn new(text: &'a str, options: &'a ParseOptions) -> Self {
        Assembler {
            text,
            options,
            stage: Stage::Start,
            body_start: 0,
            dimensions: None,
            style_classes: Vec::new(),
            layers: Vec::new(),
            hitboxes: Vec::new(),
        }
    }

    fn advance(&mut self, from: Stage, to: Stage) {
        debug_assert_eq!(self.stage, from, "assembler stages run in order");
        debug!(?from, ?to, "assembler stage");
        self.stage = to;
    }

    fn extract_dimensions(&mut self) -> Result<()> {
        self.dimensions = Some(parse_dimensions(self.text)?);
        self.advance(Stage::Start, Stage::DimensionsExtracted);
        Ok(())
    }

    fn extract_styles(&mut self) -> Result<()> {
        self.style_classes = with_fallback_class(parse_styles(self.text)?);
        if let Some((_, end)) = find_style_block(self.text)? {
            self.body_start = end;
        }
        self.advance(Stage::DimensionsExtracted, Stage::StylesExtracted);
        Ok(())
    }

    fn extract_layers(&mut self) -> Result<()> {
        let text = self.text;
        for group in scan_groups(&text[self.body_start..])? {
            let shapes = scan_elements(group.body)?
                .iter()
                .map(|element| classify_shape(element, self.options.class_lookup))
                .collect::<Result<Vec<_>>>()?;
            debug!(layer = %group.id, shapes = shapes.len(), "layer parsed");
            self.layers.push(Layer {
                name: group.id,
                shapes,
            });
        }
        self.advance(Stage::StylesExtracted, Stage::LayersExtracted);
        Ok(())
    }

    fn separate_hitboxes(&mut self) -> Result<()> {
        let (hitboxes, layers) =
            split_hitbox_layer(std::mem::take(&mut self.layers), self.options)?;
        self.hitboxes = hitboxes;
        self.layers = layers;
        self.advance(Stage::LayersExtracted, Stage::HitboxesSeparated);
        Ok(())
    }

    fn finish(mut self) -> Result<DocumentModel> {
        self.advance(Stage::HitboxesSeparated, Stage::Done);
        let dimensions = self
            .dimensions
            .ok_or_else(|| ParseError::not_found("viewBox"))?;
        Ok(DocumentModel {
            dimensions,
            style_classes: self.style_classes,
            hitboxes: self.hitboxes,
            layers: self.layers,
        })
    }
}

/// Substitute the default class when a document declares none
pub(crate) fn with_fallback_class(mut classes: Vec<StyleClass>) -> Vec<StyleClass> {
    if classes.is_empty() {
        classes.push(StyleClass::fallback());
    }
    classes
}

/// Pop the last layer into hitboxes and drop excluded layers
pub(crate) fn split_hitbox_layer(
    mut layers: Vec<Layer>,
    options: &ParseOptions,
) -> Result<(Vec<Hitbox>, Vec<Layer>)> {
    let hitbox_layer = layers
        .pop()
        .ok_or_else(|| ParseError::not_found("<g> hitbox layer"))?;

    let hitboxes = hitbox_layer
        .shapes
        .iter()
        .filter_map(|shape| {
            let hitbox = shape.hitbox();
            if hitbox.is_none() {
                warn!(
                    layer = %hitbox_layer.name,
                    kind = shape.kind().keyword(),
                    "ignoring non-rectangle in hitbox layer"
                );
            }
            hitbox
        })
        .collect();

    layers.retain(|layer| !options.excluded_layers.contains(&layer.name));
    Ok((hitboxes, layers))
}

// ============================================
// Single-pass conversion
// ============================================

/// Convert a document line by line into a flat shape list, ignoring groups
pub fn parse_flat(text: &str, options: &ParseOptions) -> Result<FlatModel> {
    let dimensions = match parse_dimensions(text) {
        Ok(dims) => Some(dims),
        Err(ParseError::StructuralNotFound(_)) => None,
        Err(e) => return Err(e),
    };

    let mut style_classes = Vec::new();
    let mut shapes = Vec::new();
    for line in merge_lines(text)? {
        match line {
            LogicalLine::StyleRule(rule) => style_classes.push(parse_style_line(&rule)?),
            LogicalLine::Element(kind, element) => {
                let element = ElementText::new(&element);
                shapes.push(build_shape(kind, &element, options.class_lookup)?);
            }
        }
    }
    debug!(shapes = shapes.len(), "flat document parsed");

    Ok(FlatModel {
        dimensions,
        style_classes: with_fallback_class(style_classes),
        shapes,
    })
}

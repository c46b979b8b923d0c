use serde::ser::{Serialize, SerializeMap, Serializer};

// ============================================
// Document level types
// ============================================

/// Width and height taken from the document's view box
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Dimensions {
    pub width: String,
    pub height: String,
}

/// A named set of rendering properties declared in the style block
#[derive(Debug, Clone, PartialEq)]
pub struct StyleClass {
    pub class_name: String,
    /// Property name/value pairs in declaration order
    pub properties: Vec<(String, String)>,
}

impl StyleClass {
    /// Class used when the document declares no styles
    pub fn fallback() -> Self {
        StyleClass {
            class_name: DEFAULT_CLASS.to_string(),
            properties: vec![
                ("method".to_string(), "fill".to_string()),
                ("color".to_string(), "#000000".to_string()),
            ],
        }
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

// Serialized as a flat object: className first, then properties as declared.
impl Serialize for StyleClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.properties.len() + 1))?;
        map.serialize_entry("className", &self.class_name)?;
        for (name, value) in &self.properties {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Class name assigned to shapes without a class attribute
pub const DEFAULT_CLASS: &str = "default";

/// Layer name that never reaches the output
pub const TEMP_LAYER: &str = "temp";

// ============================================
// Shape types
// ============================================

/// Shape element kinds, in keyword matching order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rect,
    Circle,
    Ellipse,
    Path,
    Line,
    Polyline,
    Polygon,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::Rect,
        ShapeKind::Circle,
        ShapeKind::Ellipse,
        ShapeKind::Path,
        ShapeKind::Line,
        ShapeKind::Polyline,
        ShapeKind::Polygon,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            ShapeKind::Rect => "rect",
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Path => "path",
            ShapeKind::Line => "line",
            ShapeKind::Polyline => "polyline",
            ShapeKind::Polygon => "polygon",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.keyword() == keyword)
    }
}

/// One vertex of a polyline or polygon
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Point {
    pub x: String,
    pub y: String,
}

/// A drawable primitive extracted from one element.
///
/// Coordinates are kept as the strings found in the markup; the consumer
/// decides how to interpret them.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rect {
        #[serde(rename = "className")]
        class_name: String,
        x: String,
        y: String,
        #[serde(rename = "w")]
        width: String,
        #[serde(rename = "h")]
        height: String,
    },
    Circle {
        #[serde(rename = "className")]
        class_name: String,
        x: String,
        y: String,
        #[serde(rename = "r")]
        radius: String,
    },
    Ellipse {
        #[serde(rename = "className")]
        class_name: String,
        x: String,
        y: String,
        #[serde(rename = "rx")]
        radius_x: String,
        #[serde(rename = "ry")]
        radius_y: String,
    },
    Line {
        #[serde(rename = "className")]
        class_name: String,
        x1: String,
        y1: String,
        x2: String,
        y2: String,
    },
    Polyline {
        #[serde(rename = "className")]
        class_name: String,
        points: Vec<Point>,
    },
    Polygon {
        #[serde(rename = "className")]
        class_name: String,
        points: Vec<Point>,
    },
    Path {
        #[serde(rename = "className")]
        class_name: String,
        #[serde(rename = "coords")]
        data: String,
    },
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rect { .. } => ShapeKind::Rect,
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Ellipse { .. } => ShapeKind::Ellipse,
            Shape::Line { .. } => ShapeKind::Line,
            Shape::Polyline { .. } => ShapeKind::Polyline,
            Shape::Polygon { .. } => ShapeKind::Polygon,
            Shape::Path { .. } => ShapeKind::Path,
        }
    }

    pub fn class_name(&self) -> &str {
        match self {
            Shape::Rect { class_name, .. }
            | Shape::Circle { class_name, .. }
            | Shape::Ellipse { class_name, .. }
            | Shape::Line { class_name, .. }
            | Shape::Polyline { class_name, .. }
            | Shape::Polygon { class_name, .. }
            | Shape::Path { class_name, .. } => class_name,
        }
    }

    /// Interaction bounds of a rectangle; other kinds have none
    pub fn hitbox(&self) -> Option<Hitbox> {
        match self {
            Shape::Rect {
                x,
                y,
                width,
                height,
                ..
            } => Some(Hitbox {
                x: x.clone(),
                y: y.clone(),
                width: width.clone(),
                height: height.clone(),
            }),
            _ => None,
        }
    }
}

// ============================================
// Layers and models
// ============================================

/// Shapes of one group, in painter's order
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Layer {
    pub name: String,
    pub shapes: Vec<Shape>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Hitbox {
    pub x: String,
    pub y: String,
    pub width: String,
    pub height: String,
}

/// Result of the layered conversion
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DocumentModel {
    pub dimensions: Dimensions,
    #[serde(rename = "classes")]
    pub style_classes: Vec<StyleClass>,
    pub hitboxes: Vec<Hitbox>,
    pub layers: Vec<Layer>,
}

/// Result of the single-pass conversion: every shape, no layers
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FlatModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(rename = "classes")]
    pub style_classes: Vec<StyleClass>,
    pub shapes: Vec<Shape>,
}

use std::sync::LazyLock;

use regex::Regex;

use super::attr::{AttributeSource, ClassLookup, ElementText};
use super::types::{Point, Shape, ShapeKind};
use crate::error::{ParseError, Result};

// Alternation order matters: at equal positions the earlier keyword wins.
static SHAPE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(rect|circle|ellipse|path|line|polyline|polygon)").expect("valid shape regex")
});

/// First shape keyword occurring anywhere in `text`
pub fn detect_kind(text: &str) -> Option<ShapeKind> {
    SHAPE_KEYWORD
        .find(text)
        .and_then(|m| ShapeKind::from_keyword(m.as_str()))
}

/// Classify one element's text and build its shape
pub fn classify_shape(element: &str, lookup: ClassLookup) -> Result<Shape> {
    let kind = detect_kind(element)
        .ok_or_else(|| ParseError::UnrecognizedShapeKind(element.to_string()))?;
    build_shape(kind, &ElementText::new(element), lookup)
}

/// Build a shape of a known kind from any attribute source
pub fn build_shape<A: AttributeSource + ?Sized>(
    kind: ShapeKind,
    source: &A,
    lookup: ClassLookup,
) -> Result<Shape> {
    match kind {
        ShapeKind::Rect => parse_rect(source, lookup),
        ShapeKind::Circle => parse_circle(source, lookup),
        ShapeKind::Ellipse => parse_ellipse(source, lookup),
        ShapeKind::Path => parse_path(source, lookup),
        ShapeKind::Line => parse_line(source, lookup),
        ShapeKind::Polyline => Ok(Shape::Polyline {
            class_name: source.class_name(lookup)?,
            points: parse_points(&source.required_quoted("points")?)?,
        }),
        ShapeKind::Polygon => Ok(Shape::Polygon {
            class_name: source.class_name(lookup)?,
            points: parse_points(&source.required_quoted("points")?)?,
        }),
    }
}

pub fn parse_rect<A: AttributeSource + ?Sized>(source: &A, lookup: ClassLookup) -> Result<Shape> {
    Ok(Shape::Rect {
        class_name: source.class_name(lookup)?,
        x: source.position("x"),
        y: source.position("y"),
        width: source.required("width")?,
        height: source.required("height")?,
    })
}

pub fn parse_circle<A: AttributeSource + ?Sized>(
    source: &A,
    lookup: ClassLookup,
) -> Result<Shape> {
    Ok(Shape::Circle {
        class_name: source.class_name(lookup)?,
        x: source.position("cx"),
        y: source.position("cy"),
        radius: source.required("r")?,
    })
}

pub fn parse_ellipse<A: AttributeSource + ?Sized>(
    source: &A,
    lookup: ClassLookup,
) -> Result<Shape> {
    Ok(Shape::Ellipse {
        class_name: source.class_name(lookup)?,
        x: source.position("cx"),
        y: source.position("cy"),
        radius_x: source.required("rx")?,
        radius_y: source.required("ry")?,
    })
}

pub fn parse_line<A: AttributeSource + ?Sized>(source: &A, lookup: ClassLookup) -> Result<Shape> {
    Ok(Shape::Line {
        class_name: source.class_name(lookup)?,
        x1: source.required("x1")?,
        y1: source.required("y1")?,
        x2: source.required("x2")?,
        y2: source.required("y2")?,
    })
}

pub fn parse_path<A: AttributeSource + ?Sized>(source: &A, lookup: ClassLookup) -> Result<Shape> {
    Ok(Shape::Path {
        class_name: source.class_name(lookup)?,
        data: source.required_quoted("d")?,
    })
}

/// Pair a `points` list into vertices.
///
/// Numbers may be separated by commas, whitespace, or both; `"10,10 20 20"`
/// is two points.
pub fn parse_points(points: &str) -> Result<Vec<Point>> {
    let coords: Vec<&str> = points
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();

    if coords.len() % 2 != 0 {
        return Err(ParseError::MalformedAttribute {
            attribute: "points".to_string(),
            value: points.to_string(),
        });
    }

    Ok(coords
        .chunks_exact(2)
        .map(|pair| Point {
            x: pair[0].to_string(),
            y: pair[1].to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(text: &str) -> Shape {
        classify_shape(text, ClassLookup::Substring).unwrap()
    }

    fn point(x: &str, y: &str) -> Point {
        Point {
            x: x.to_string(),
            y: y.to_string(),
        }
    }

    #[test]
    fn test_parse_rect_without_class() {
        let rect = shape(r#"<rect x="1" y="2" width="10" height="20"/>"#);
        assert_eq!(
            rect,
            Shape::Rect {
                class_name: "default".to_string(),
                x: "1".to_string(),
                y: "2".to_string(),
                width: "10".to_string(),
                height: "20".to_string(),
            }
        );
    }

    #[test]
    fn test_rect_position_defaults_to_zero() {
        let rect = shape(r#"<rect class="st2" width="54" height="56"/>"#);
        if let Shape::Rect { class_name, x, y, .. } = rect {
            assert_eq!(class_name, "st2");
            assert_eq!(x, "0");
            assert_eq!(y, "0");
        } else {
            panic!("Expected rect");
        }
    }

    #[test]
    fn test_rect_missing_size_fails() {
        assert_eq!(
            classify_shape(r#"<rect x="1" y="2" height="20"/>"#, ClassLookup::Substring),
            Err(ParseError::missing("rect", "width"))
        );
    }

    #[test]
    fn test_parse_circle_and_ellipse() {
        assert_eq!(
            shape(r#"<circle class="st1" cx="27" cy="28" r="5.5"/>"#),
            Shape::Circle {
                class_name: "st1".to_string(),
                x: "27".to_string(),
                y: "28".to_string(),
                radius: "5.5".to_string(),
            }
        );
        assert_eq!(
            shape(r#"<ellipse cx="3" rx="4" ry="2"/>"#),
            Shape::Ellipse {
                class_name: "default".to_string(),
                x: "3".to_string(),
                y: "0".to_string(),
                radius_x: "4".to_string(),
                radius_y: "2".to_string(),
            }
        );
    }

    #[test]
    fn test_circle_requires_radius() {
        assert_eq!(
            classify_shape(r#"<circle cx="1" cy="1"/>"#, ClassLookup::Substring),
            Err(ParseError::missing("circle", "r"))
        );
    }

    #[test]
    fn test_parse_line() {
        let line = shape(r#"<line class="st0" x1="0" y1="1" x2="10" y2="11"/>"#);
        assert_eq!(line.kind(), ShapeKind::Line);
        if let Shape::Line { x1, y2, .. } = line {
            assert_eq!(x1, "0");
            assert_eq!(y2, "11");
        }
    }

    #[test]
    fn test_polyline_is_not_a_line() {
        let poly = shape(r#"<polyline class="st0" points="10,10 20,20 "/>"#);
        assert_eq!(poly.kind(), ShapeKind::Polyline);
        let gon = shape(r#"<polygon points="0,0 5,0 5,5"/>"#);
        assert_eq!(gon.kind(), ShapeKind::Polygon);
        if let Shape::Polygon { points, .. } = gon {
            assert_eq!(points, vec![point("0", "0"), point("5", "0"), point("5", "5")]);
        }
    }

    #[test]
    fn test_points_reconstructed_with_separator() {
        let joined = format!("{} {}", "10,10 20", "20");
        assert_eq!(
            parse_points(&joined).unwrap(),
            vec![point("10", "10"), point("20", "20")]
        );
        assert!(parse_points("10,10 2020").is_err());
    }

    #[test]
    fn test_points_tolerate_tabs() {
        assert_eq!(
            parse_points("1,2\t\t3,4").unwrap(),
            vec![point("1", "2"), point("3", "4")]
        );
    }

    #[test]
    fn test_path_keeps_raw_data() {
        let path = shape(r#"<path class="st3" d="M10.2,4.1c0,1.5-1.2,2.7-2.7,2.7 S4.8,5.6,4.8,4.1z"/>"#);
        assert_eq!(
            path,
            Shape::Path {
                class_name: "st3".to_string(),
                data: "M10.2,4.1c0,1.5-1.2,2.7-2.7,2.7 S4.8,5.6,4.8,4.1z".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_element_fails() {
        assert!(matches!(
            classify_shape(r#"<text x="1">hi</text>"#, ClassLookup::Substring),
            Err(ParseError::UnrecognizedShapeKind(_))
        ));
    }
}

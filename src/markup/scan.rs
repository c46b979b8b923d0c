//! Delimiter scanning over raw markup.
//!
//! Groups are assumed not to nest and every shape element is assumed to be
//! self-closing; the first `</g>` after a `<g` closes it.

use super::attr::extract_attribute;
use super::shape::detect_kind;
use super::types::ShapeKind;
use crate::error::{ParseError, Result};

const GROUP_OPEN: &str = "<g";
const GROUP_CLOSE: &str = "</g>";
const ELEMENT_OPEN: &str = "<";
const ELEMENT_CLOSE: &str = "/>";

/// One `<g>` region of the document
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSlice<'a> {
    /// Value of the group's `id` attribute
    pub id: String,
    /// Text between the opening tag and `</g>`
    pub body: &'a str,
}

/// Find every group in `text`, in document order
pub fn scan_groups(text: &str) -> Result<Vec<GroupSlice<'_>>> {
    let mut groups = Vec::new();
    let mut cursor = 0;

    while let Some(start) = find_group_open(text, cursor) {
        let tag_end = text[start..]
            .find('>')
            .map(|i| start + i)
            .ok_or_else(|| ParseError::not_found("end of <g> tag"))?;
        let open_tag = &text[start..=tag_end];
        let id = extract_attribute(open_tag, "id")
            .ok_or_else(|| ParseError::missing("g", "id"))?
            .to_string();

        if open_tag.ends_with(ELEMENT_CLOSE) {
            groups.push(GroupSlice { id, body: "" });
            cursor = tag_end + 1;
            continue;
        }

        let close = text[tag_end..]
            .find(GROUP_CLOSE)
            .map(|i| tag_end + i)
            .ok_or_else(|| ParseError::not_found(GROUP_CLOSE))?;
        let body = &text[tag_end + 1..close];

        groups.push(GroupSlice { id, body });
        cursor = close + GROUP_CLOSE.len();
    }

    Ok(groups)
}

/// Next `<g` that is a whole tag name, not a prefix such as `<glyph`
fn find_group_open(text: &str, from: usize) -> Option<usize> {
    let mut cursor = from;
    while let Some(i) = text[cursor..].find(GROUP_OPEN) {
        let start = cursor + i;
        let next = text[start + GROUP_OPEN.len()..].chars().next();
        if next.is_some_and(|c| c.is_whitespace() || c == '>' || c == '/') {
            return Some(start);
        }
        cursor = start + GROUP_OPEN.len();
    }
    None
}

/// Split a group body into self-closing element texts.
///
/// Line breaks are removed first so attributes wrapped by the exporter
/// rejoin their element.
pub fn scan_elements(body: &str) -> Result<Vec<String>> {
    let flat: String = body.chars().filter(|&c| c != '\n' && c != '\r').collect();
    let mut elements = Vec::new();
    let mut cursor = 0;

    while let Some(i) = flat[cursor..].find(ELEMENT_OPEN) {
        let start = cursor + i;
        let end = flat[start..]
            .find(ELEMENT_CLOSE)
            .map(|j| start + j + ELEMENT_CLOSE.len())
            .ok_or_else(|| {
                ParseError::not_found(format!("{} after {}", ELEMENT_CLOSE, &flat[start..]))
            })?;
        elements.push(flat[start..end].to_string());
        cursor = end;
    }

    Ok(elements)
}

// ============================================
// Line-continuation merge
// ============================================

/// A logical line of the whole-document scan
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalLine {
    /// A `.st<n>{...}` style rule
    StyleRule(String),
    /// A complete shape element, continuation lines merged
    Element(ShapeKind, String),
}

/// Walk physical lines, merging shape elements that wrap onto later lines.
///
/// Polyline and polygon fragments are joined with a space so their point
/// lists stay separated; other kinds are joined directly.
pub fn merge_lines(text: &str) -> Result<Vec<LogicalLine>> {
    let mut out = Vec::new();
    let mut pending: Option<(ShapeKind, String)> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some((kind, mut element)) = pending.take() {
            if line.starts_with(ELEMENT_OPEN) {
                return Err(ParseError::not_found(format!(
                    "{} to close {}",
                    ELEMENT_CLOSE, element
                )));
            }
            if matches!(kind, ShapeKind::Polyline | ShapeKind::Polygon) {
                element.push(' ');
            }
            element.push_str(line);
            if element.ends_with(ELEMENT_CLOSE) {
                out.push(LogicalLine::Element(kind, element));
            } else {
                pending = Some((kind, element));
            }
            continue;
        }

        if line.starts_with(".st") {
            out.push(LogicalLine::StyleRule(line.to_string()));
        } else if let Some(kind) = shape_start(line) {
            if line.ends_with(ELEMENT_CLOSE) {
                out.push(LogicalLine::Element(kind, line.to_string()));
            } else {
                pending = Some((kind, line.to_string()));
            }
        }
    }

    match pending {
        Some((_, element)) => Err(ParseError::not_found(format!(
            "{} to close {}",
            ELEMENT_CLOSE, element
        ))),
        None => Ok(out),
    }
}

/// Kind of the shape element a line opens, if it opens one
fn shape_start(line: &str) -> Option<ShapeKind> {
    let tag = line.strip_prefix(ELEMENT_OPEN)?;
    let name_end = tag
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(tag.len());
    let kind = detect_kind(&tag[..name_end])?;
    (kind.keyword() == &tag[..name_end]).then_some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::attr::{AttributeSource, ElementText};

    #[test]
    fn finds_groups_in_order() {
        let text = "<g id=\"fill\">\n<rect width=\"1\" height=\"1\"/>\n</g>\n<g id=\"hitBoxes\">\n</g>";
        let groups = scan_groups(text).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, "fill");
        assert_eq!(groups[0].body, "\n<rect width=\"1\" height=\"1\"/>\n");
        assert_eq!(groups[1].id, "hitBoxes");
    }

    #[test]
    fn group_scan_skips_other_g_tags() {
        let text = "<glyph/><g id=\"a\"></g>";
        let groups = scan_groups(text).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, "a");
    }

    #[test]
    fn unclosed_group_fails() {
        assert_eq!(
            scan_groups("<g id=\"a\"><rect/>"),
            Err(ParseError::StructuralNotFound(GROUP_CLOSE.to_string()))
        );
    }

    #[test]
    fn group_without_id_fails() {
        assert_eq!(
            scan_groups("<g><rect/></g>"),
            Err(ParseError::missing("g", "id"))
        );
    }

    #[test]
    fn elements_rejoin_across_lines() {
        let body = "\n\t<rect x=\"1\" y=\"2\"\n\t\twidth=\"3\" height=\"4\"/>\n\t<circle r=\"2\"/>\n";
        let elements = scan_elements(body).unwrap();
        assert_eq!(
            elements,
            vec![
                "<rect x=\"1\" y=\"2\"\t\twidth=\"3\" height=\"4\"/>".to_string(),
                "<circle r=\"2\"/>".to_string(),
            ]
        );
    }

    #[test]
    fn unindented_wrap_keeps_following_attribute() {
        let elements = scan_elements("<rect x=\"1\" width=\"50\"\nheight=\"48\"/>").unwrap();
        assert_eq!(elements, vec!["<rect x=\"1\" width=\"50\"height=\"48\"/>".to_string()]);
        let rect = ElementText::new(&elements[0]);
        assert_eq!(rect.required("height").unwrap(), "48");
    }

    #[test]
    fn trailing_whitespace_is_not_an_element() {
        assert!(scan_elements("  \n\t ").unwrap().is_empty());
    }

    #[test]
    fn unterminated_element_fails() {
        assert!(matches!(
            scan_elements("<rect width=\"3\">"),
            Err(ParseError::StructuralNotFound(_))
        ));
    }

    #[test]
    fn merge_inserts_space_for_point_lists() {
        let text = "<polyline class=\"st0\" points=\"10,10 20\n20\"/>\n";
        assert_eq!(
            merge_lines(text).unwrap(),
            vec![LogicalLine::Element(
                ShapeKind::Polyline,
                "<polyline class=\"st0\" points=\"10,10 20 20\"/>".to_string()
            )]
        );
    }

    #[test]
    fn merge_joins_other_kinds_directly() {
        let text = "\t<path class=\"st1\" d=\"M0,0c1,1,2,2,3,3\n\t\tl4,4z\"/>";
        assert_eq!(
            merge_lines(text).unwrap(),
            vec![LogicalLine::Element(
                ShapeKind::Path,
                "<path class=\"st1\" d=\"M0,0c1,1,2,2,3,3l4,4z\"/>".to_string()
            )]
        );
    }

    #[test]
    fn merge_collects_style_rules_and_ignores_other_markup() {
        let text = "<svg viewBox=\"0 0 1 1\">\n<style type=\"text/css\">\n\t.st0{fill:red;}\n</style>\n<g id=\"x\">\n<line x1=\"0\" y1=\"0\" x2=\"1\" y2=\"1\"/>\n</g>\n</svg>";
        let lines = merge_lines(text).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], LogicalLine::StyleRule(".st0{fill:red;}".to_string()));
        assert!(matches!(lines[1], LogicalLine::Element(ShapeKind::Line, _)));
    }

    #[test]
    fn interrupted_continuation_fails() {
        let text = "<rect x=\"1\"\n<circle r=\"1\"/>";
        assert!(matches!(
            merge_lines(text),
            Err(ParseError::StructuralNotFound(_))
        ));
        assert!(merge_lines("<rect x=\"1\"").is_err());
    }
}

//! Attribute extraction from a single element.
//!
//! Two sources feed the shape builders: the raw text of a self-closing
//! element (scanner backend) and an attribute list read by the XML reader
//! (tree backend). Both go through [`AttributeSource`].

use crate::error::{ParseError, Result};
use serde::{Deserialize, Serialize};

use super::types::DEFAULT_CLASS;

/// How an element's class is detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassLookup {
    /// Any occurrence of the text `class` makes the class attribute required
    #[default]
    Substring,
    /// Only a real `class="..."` attribute counts
    Attribute,
}

/// Read access to the attributes of one element
pub trait AttributeSource {
    /// Value of `name` if it is a single token (no whitespace)
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Full quoted value of `name`, whitespace included
    fn quoted_attribute(&self, name: &str) -> Option<&str>;

    /// Whether the element mentions `class` under the substring heuristic
    fn mentions_class(&self) -> bool;

    /// Short label for error messages
    fn element_name(&self) -> &str;

    fn required(&self, name: &str) -> Result<String> {
        self.attribute(name)
            .map(str::to_string)
            .ok_or_else(|| ParseError::missing(self.element_name(), name))
    }

    fn required_quoted(&self, name: &str) -> Result<String> {
        self.quoted_attribute(name)
            .map(str::to_string)
            .ok_or_else(|| ParseError::missing(self.element_name(), name))
    }

    /// Position attributes fall back to "0"
    fn position(&self, name: &str) -> String {
        self.attribute(name).unwrap_or("0").to_string()
    }

    fn class_name(&self, lookup: ClassLookup) -> Result<String> {
        match lookup {
            ClassLookup::Substring if self.mentions_class() => self.required("class"),
            ClassLookup::Substring => Ok(DEFAULT_CLASS.to_string()),
            ClassLookup::Attribute => Ok(self
                .attribute("class")
                .unwrap_or(DEFAULT_CLASS)
                .to_string()),
        }
    }
}

// ============================================
// Raw element text
// ============================================

/// Text of one element, e.g. `<rect x="1" y="2" width="3" height="4"/>`
#[derive(Debug, Clone, Copy)]
pub struct ElementText<'a> {
    text: &'a str,
}

impl<'a> ElementText<'a> {
    pub fn new(text: &'a str) -> Self {
        ElementText { text }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }
}

impl AttributeSource for ElementText<'_> {
    fn attribute(&self, name: &str) -> Option<&str> {
        extract_attribute(self.text, name)
    }

    fn quoted_attribute(&self, name: &str) -> Option<&str> {
        extract_quoted_attribute(self.text, name)
    }

    fn mentions_class(&self) -> bool {
        self.text.contains("class")
    }

    fn element_name(&self) -> &str {
        element_name(self.text)
    }
}

/// First `name="value"` whose value is a single non-whitespace token.
///
/// The name must not continue another name, so `x` does not match inside
/// `rx="..."`. A closing quote counts as a boundary: wrapped elements are
/// joined without a separator.
pub fn extract_attribute<'a>(element: &'a str, name: &str) -> Option<&'a str> {
    attribute_values(element, name).find(|value| !value.contains(char::is_whitespace))
}

/// First `name="..."` with everything between the quotes
pub fn extract_quoted_attribute<'a>(element: &'a str, name: &str) -> Option<&'a str> {
    attribute_values(element, name).next()
}

/// Class of an element under the substring heuristic
pub fn extract_class_name(element: &str) -> Result<String> {
    ElementText::new(element).class_name(ClassLookup::Substring)
}

fn attribute_values<'a>(element: &'a str, name: &str) -> impl Iterator<Item = &'a str> {
    let needle = format!("{}=\"", name);
    let mut cursor = 0;

    std::iter::from_fn(move || {
        while let Some(found) = element[cursor..].find(&needle) {
            let start = cursor + found;
            cursor = start + needle.len();

            let at_boundary = element[..start]
                .chars()
                .next_back()
                .is_none_or(|c| !is_name_char(c));
            if !at_boundary {
                continue;
            }

            let end = element[cursor..].find('"')?;
            let value = &element[cursor..cursor + end];
            cursor += end + 1;
            return Some(value);
        }
        None
    })
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | ':')
}

/// Tag name of an element, or the whole text when there is none
fn element_name(element: &str) -> &str {
    let trimmed = element.trim_start().trim_start_matches('<');
    let end = trimmed
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(trimmed.len());
    if end == 0 { element } else { &trimmed[..end] }
}

// ============================================
// Parsed attribute list
// ============================================

/// Attributes of one element as read by the XML reader
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

impl AttributeMap {
    pub fn new(tag: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        AttributeMap {
            tag: tag.into(),
            attributes,
        }
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl AttributeSource for AttributeMap {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.get(name).map(str::trim)
    }

    fn quoted_attribute(&self, name: &str) -> Option<&str> {
        self.get(name)
    }

    // A parsed element has no free text, only real attributes
    fn mentions_class(&self) -> bool {
        self.get("class").is_some()
    }

    fn element_name(&self) -> &str {
        &self.tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_token_values_verbatim() {
        let el = r#"<rect x="1.5px" y="-2" width="10" height="20"/>"#;
        assert_eq!(extract_attribute(el, "x"), Some("1.5px"));
        assert_eq!(extract_attribute(el, "y"), Some("-2"));
        assert_eq!(extract_attribute(el, "width"), Some("10"));
        assert_eq!(extract_attribute(el, "cx"), None);
    }

    #[test]
    fn attribute_name_must_start_at_boundary() {
        let el = r#"<rect rx="4" x="7" width="1" height="1"/>"#;
        assert_eq!(extract_attribute(el, "x"), Some("7"));

        let el = r#"<ellipse cx="3" rx="9" ry="2"/>"#;
        assert_eq!(extract_attribute(el, "x"), None);
    }

    #[test]
    fn closing_quote_is_a_boundary() {
        let el = r#"<rect x="2" class="st0" width="50"height="48"/>"#;
        assert_eq!(extract_attribute(el, "height"), Some("48"));
        assert_eq!(extract_attribute(el, "width"), Some("50"));

        let el = r#"<ellipse class="st0" cx="3"rx="9" ry="2"/>"#;
        assert_eq!(extract_attribute(el, "x"), None);
        assert_eq!(extract_attribute(el, "rx"), Some("9"));
        assert_eq!(extract_attribute(r#"<path stroke-width="2"/>"#, "width"), None);
    }

    #[test]
    fn whitespace_values_need_quoted_lookup() {
        let el = r#"<polyline class="st1" points="1,2 3,4"/>"#;
        assert_eq!(extract_attribute(el, "points"), None);
        assert_eq!(extract_quoted_attribute(el, "points"), Some("1,2 3,4"));
    }

    #[test]
    fn class_defaults_without_substring() {
        assert_eq!(extract_class_name(r#"<circle r="3"/>"#).unwrap(), "default");
        assert_eq!(
            extract_class_name(r#"<circle class="st4" r="3"/>"#).unwrap(),
            "st4"
        );
    }

    #[test]
    fn class_substring_without_attribute_fails() {
        let el = r#"<path id="classic" d="M0,0"/>"#;
        assert_eq!(
            extract_class_name(el),
            Err(ParseError::missing("path", "class"))
        );
        assert_eq!(
            ElementText::new(el)
                .class_name(ClassLookup::Attribute)
                .unwrap(),
            "default"
        );
    }

    #[test]
    fn attribute_map_reads_like_text() {
        let map = AttributeMap::new(
            "circle",
            vec![
                ("cx".to_string(), "4".to_string()),
                ("r".to_string(), " 2 ".to_string()),
            ],
        );
        assert_eq!(map.position("cx"), "4");
        assert_eq!(map.position("cy"), "0");
        assert_eq!(map.required("r").unwrap(), "2");
        assert_eq!(map.class_name(ClassLookup::Substring).unwrap(), "default");
        assert_eq!(
            map.required("rx"),
            Err(ParseError::missing("circle", "rx"))
        );
    }
}

use std::sync::LazyLock;

use regex::Regex;

use super::types::StyleClass;
use crate::error::{ParseError, Result};

pub const STYLE_OPEN: &str = r#"<style type="text/css">"#;
pub const STYLE_CLOSE: &str = "</style>";

static CLASS_SELECTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(st\d+)").expect("valid class selector regex"));

/// Byte range of the style block, closing tag included
pub fn find_style_block(document: &str) -> Result<Option<(usize, usize)>> {
    let Some(start) = document.find(STYLE_OPEN) else {
        return Ok(None);
    };
    let close = document[start..]
        .find(STYLE_CLOSE)
        .ok_or_else(|| ParseError::not_found(STYLE_CLOSE))?;
    Ok(Some((start, start + close + STYLE_CLOSE.len())))
}

/// Parse every rule of the document's style block.
///
/// A document without a style block yields no classes.
pub fn parse_styles(document: &str) -> Result<Vec<StyleClass>> {
    let Some((start, end)) = find_style_block(document)? else {
        return Ok(Vec::new());
    };

    let mut lines: Vec<&str> = document[start..end].split('\n').collect();
    // Opening and closing tag lines
    lines.pop();
    if !lines.is_empty() {
        lines.remove(0);
    }

    lines
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_style_line)
        .collect()
}

/// Parse one rule such as `.st0{fill:#112233;stroke-width:2;}`
pub fn parse_style_line(line: &str) -> Result<StyleClass> {
    let class_name = CLASS_SELECTOR
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ParseError::MalformedStyleRule(line.to_string()))?;

    let open = line
        .find('{')
        .ok_or_else(|| ParseError::MalformedStyleRule(line.to_string()))?;
    let close = line[open + 1..]
        .find('}')
        .ok_or_else(|| ParseError::MalformedStyleRule(line.to_string()))?;
    let body = &line[open + 1..open + 1 + close];

    let mut properties: Vec<(String, String)> = Vec::new();
    for declaration in body.split(';').filter(|d| !d.trim().is_empty()) {
        let (name, value) = declaration
            .split_once(':')
            .ok_or_else(|| ParseError::MalformedStyleRule(line.to_string()))?;
        let (name, value) = (name.trim().to_string(), value.trim().to_string());

        // A repeated property keeps its first position and its last value
        match properties.iter_mut().find(|(k, _)| *k == name) {
            Some(existing) => existing.1 = value,
            None => properties.push((name, value)),
        }
    }

    Ok(StyleClass {
        class_name,
        properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rule_in_declaration_order() {
        let class = parse_style_line(".st0{fill:#112233;stroke-width:2;}").unwrap();
        assert_eq!(class.class_name, "st0");
        assert_eq!(
            class.properties,
            vec![
                ("fill".to_string(), "#112233".to_string()),
                ("stroke-width".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn value_keeps_text_after_first_colon() {
        let class = parse_style_line(".st3{font-family:'Foo:Bar';}").unwrap();
        assert_eq!(class.property("font-family"), Some("'Foo:Bar'"));
    }

    #[test]
    fn rule_without_class_or_braces_is_malformed() {
        assert!(matches!(
            parse_style_line("rect{fill:red;}"),
            Err(ParseError::MalformedStyleRule(_))
        ));
        assert!(matches!(
            parse_style_line(".st1 fill:red;"),
            Err(ParseError::MalformedStyleRule(_))
        ));
        assert!(matches!(
            parse_style_line(".st1{fill}"),
            Err(ParseError::MalformedStyleRule(_))
        ));
    }

    #[test]
    fn parses_illustrator_style_block() {
        let doc = "<svg>\n<style type=\"text/css\">\n\t.st0{fill:#FFFFFF;}\n\t.st1{fill:none;stroke:#000000;stroke-miterlimit:10;}\n</style>\n<g id=\"a\"></g>\n</svg>";
        let classes = parse_styles(doc).unwrap();
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].class_name, "st0");
        assert_eq!(classes[1].property("stroke-miterlimit"), Some("10"));
    }

    #[test]
    fn missing_style_block_yields_nothing() {
        assert!(parse_styles("<svg></svg>").unwrap().is_empty());
    }

    #[test]
    fn unclosed_style_block_fails() {
        assert_eq!(
            parse_styles("<style type=\"text/css\">\n.st0{fill:red;}\n"),
            Err(ParseError::StructuralNotFound(STYLE_CLOSE.to_string()))
        );
    }
}

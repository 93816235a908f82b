//! Minimal element-tree format used by serialized diff documents.
//!
//! The document format is a hierarchy of attribute-free elements holding
//! text, e.g. `<root><add><key><path>HKLM\X</path></key></add></root>`.
//! Text content is written and read back literally, with no entity
//! escaping, so that arbitrary registry data bytes survive the round trip.
//! The flip side is that data containing markup-significant characters
//! (`<` followed by a tag-like sequence) can confuse the reader; this is a
//! long-standing limitation of the format itself.

use crate::error::{DiffError, Result};
use std::fmt::Write as _;

/// A named tree node holding either text (leaf) or child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Element name (tag).
    pub name: String,

    /// Text content. Meaningful only for leaves; interstitial whitespace in
    /// container elements is discarded on read.
    pub text: String,

    /// Child elements, in document order.
    pub children: Vec<Element>,
}

impl Element {
    /// Creates an empty container element.
    pub fn node(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Element::default()
        }
    }

    /// Creates a leaf element with text content.
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Appends a child and returns `self` for chaining.
    pub fn with(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child element.
    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Returns the first direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Iterates over direct children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Resolves a slash-separated descendant path, e.g. `baseline/file/name`.
    pub fn descendant(&self, path: &str) -> Option<&Element> {
        let mut current = self;
        for segment in path.split('/') {
            current = current.child(segment)?;
        }
        Some(current)
    }

    /// Returns the text of a required descendant.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::MissingElement`] when the path is absent. The
    /// reader uses this for structural fields that must not be defaulted.
    pub fn require_text(&self, path: &str) -> Result<&str> {
        self.descendant(path)
            .map(|e| e.text.as_str())
            .ok_or_else(|| DiffError::missing_element(path))
    }

    /// Serializes the tree, leaves inline and containers indented.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        if self.children.is_empty() {
            // Text is emitted literally; no escaping.
            let _ = writeln!(out, "{indent}<{0}>{1}</{0}>", self.name, self.text);
        } else {
            let _ = writeln!(out, "{indent}<{}>", self.name);
            for child in &self.children {
                child.render_into(out, depth + 1);
            }
            let _ = writeln!(out, "{indent}</{}>", self.name);
        }
    }

    /// Parses a serialized tree back into an element.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::MalformedDocument`] on unbalanced or mismatched
    /// tags, or trailing non-whitespace content.
    pub fn parse(input: &str) -> Result<Element> {
        let mut cursor = Cursor { input, pos: 0 };
        cursor.skip_whitespace();
        let root = cursor.parse_element()?;
        cursor.skip_whitespace();
        if cursor.pos < input.len() {
            return Err(DiffError::malformed(format!(
                "trailing content after root element at byte {}",
                cursor.pos
            )));
        }
        Ok(root)
    }
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    /// Reads `<name>` and returns the name.
    fn read_open_tag(&mut self) -> Result<&'a str> {
        if !self.rest().starts_with('<') {
            return Err(DiffError::malformed(format!(
                "expected '<' at byte {}",
                self.pos
            )));
        }
        let rest = &self.rest()[1..];
        let end = rest
            .find('>')
            .ok_or_else(|| DiffError::malformed(format!("unterminated tag at byte {}", self.pos)))?;
        let name = &rest[..end];
        if name.is_empty() || name.starts_with('/') {
            return Err(DiffError::malformed(format!(
                "unexpected closing tag at byte {}",
                self.pos
            )));
        }
        self.pos += 1 + end + 1;
        Ok(name)
    }

    fn parse_element(&mut self) -> Result<Element> {
        let name = self.read_open_tag()?;
        let mut element = Element::node(name);

        loop {
            let chunk_start = self.pos;
            let tag_offset = self.rest().find('<').ok_or_else(|| {
                DiffError::malformed(format!("missing closing tag for <{name}>"))
            })?;
            self.pos += tag_offset;

            if self.rest().starts_with("</") {
                // Only leaves carry text; whitespace between children is layout.
                if element.children.is_empty() {
                    element.text = self.input[chunk_start..self.pos].to_string();
                }
                let close_end = self.rest().find('>').ok_or_else(|| {
                    DiffError::malformed(format!("unterminated closing tag at byte {}", self.pos))
                })?;
                let closing = &self.rest()[2..close_end];
                if closing != name {
                    return Err(DiffError::malformed(format!(
                        "mismatched closing tag: expected </{name}>, found </{closing}>"
                    )));
                }
                self.pos += close_end + 1;
                return Ok(element);
            }

            element.push(self.parse_element()?);
            self.skip_whitespace();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_round_trip() {
        let leaf = Element::leaf("path", "HKLM\\Software\\X");
        let parsed = Element::parse(&leaf.render()).unwrap();
        assert_eq!(parsed, leaf);
    }

    #[test]
    fn test_nested_round_trip() {
        let tree = Element::node("root").with(
            Element::node("add")
                .with(Element::node("key").with(Element::leaf("path", "HKLM\\X")))
                .with(
                    Element::node("value")
                        .with(Element::leaf("path", "HKLM\\X"))
                        .with(Element::leaf("name", "Ver"))
                        .with(Element::leaf("data", "\"1.0\"")),
                ),
        );
        assert_eq!(Element::parse(&tree.render()).unwrap(), tree);
    }

    #[test]
    fn test_empty_leaf() {
        let parsed = Element::parse("<nsrl></nsrl>").unwrap();
        assert_eq!(parsed, Element::leaf("nsrl", ""));
    }

    #[test]
    fn test_text_is_not_escaped() {
        let leaf = Element::leaf("data", "a&b \"quoted\" >arrow");
        let rendered = leaf.render();
        assert!(rendered.contains("a&b \"quoted\" >arrow"));
        assert_eq!(Element::parse(&rendered).unwrap().text, "a&b \"quoted\" >arrow");
    }

    #[test]
    fn test_descendant_lookup() {
        let tree = Element::node("root")
            .with(Element::node("baseline").with(
                Element::node("file").with(Element::leaf("name", "before.reg")),
            ));
        assert_eq!(
            tree.descendant("baseline/file/name").unwrap().text,
            "before.reg"
        );
        assert!(tree.descendant("baseline/file/sha").is_none());
    }

    #[test]
    fn test_require_text_missing() {
        let tree = Element::node("root");
        let err = tree.require_text("delta/app/action").unwrap_err();
        assert!(matches!(err, DiffError::MissingElement { ref path } if path == "delta/app/action"));
    }

    #[test]
    fn test_mismatched_closing_tag() {
        assert!(Element::parse("<a><b></c></a>").is_err());
    }

    #[test]
    fn test_unbalanced_input() {
        assert!(Element::parse("<a><b></b>").is_err());
        assert!(Element::parse("no tags here").is_err());
    }

    #[test]
    fn test_trailing_content_rejected() {
        assert!(Element::parse("<a></a><b></b>").is_err());
    }

    #[test]
    fn test_repeated_children() {
        let tree = Element::node("add")
            .with(Element::node("key").with(Element::leaf("path", "A")))
            .with(Element::node("key").with(Element::leaf("path", "B")));
        let parsed = Element::parse(&tree.render()).unwrap();
        let paths: Vec<_> = parsed
            .children_named("key")
            .map(|k| k.child("path").unwrap().text.clone())
            .collect();
        assert_eq!(paths, vec!["A", "B"]);
    }
}

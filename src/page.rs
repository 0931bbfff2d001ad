//! Page description files
//!
//! A page is a tree of element definitions in TOML or JSON. Layout is a simple
//! vertical flow: each element starts where its previous sibling ended
//! unless it pins an explicit `top`, and its height is explicit, the extent
//! of its children, or one line per line of text.

use crate::dom::{Document, NodeId, Rect};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Height of one line of text, in page pixels
pub const LINE_HEIGHT: f64 = 24.0;

#[derive(Debug, Clone, Deserialize)]
pub struct PageDef {
    #[serde(default)]
    pub title: Option<String>,
    /// Page width; defaults to the viewport width
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub body: Vec<NodeDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeDef {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    /// Space-separated class list
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Absolute document top; flows after the previous sibling when absent
    #[serde(default)]
    pub top: Option<f64>,
    #[serde(default)]
    pub left: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub children: Vec<NodeDef>,
}

fn default_tag() -> String {
    "div".to_string()
}

impl PageDef {
    /// Load from a `.toml` or `.json` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page {}", path.display()))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse page {}", path.display())),
            Some("toml") => toml::from_str(&content)
                .with_context(|| format!("Failed to parse page {}", path.display())),
            _ => bail!(
                "Unsupported page format for {} (expected .toml or .json)",
                path.display()
            ),
        }
    }

    /// Build the document, laying elements out in a column `default_width` wide
    pub fn build(&self, default_width: f64) -> Result<Document> {
        let mut doc = Document::new();
        let width = self.width.unwrap_or(default_width);

        if let Some(title) = &self.title {
            let node = doc.create_element("title");
            doc.element_mut(node).set_text(title.as_str());
            let head = doc.head();
            doc.append_child(head, node);
        }

        let body = doc.body();
        let mut cursor = 0.0;
        for def in &self.body {
            let child = build_node(&mut doc, body, def, 0.0, cursor, width)?;
            cursor = cursor.max(doc.element(child).rect.bottom());
        }
        doc.element_mut(body).rect = Rect::new(0.0, 0.0, width, cursor);
        Ok(doc)
    }
}

fn build_node(
    doc: &mut Document,
    parent: NodeId,
    def: &NodeDef,
    x: f64,
    y: f64,
    width: f64,
) -> Result<NodeId> {
    if def.tag.trim().is_empty() {
        bail!("Element with empty tag under <{}>", doc.element(parent).tag);
    }

    let node = doc.create_element(&def.tag);
    {
        let el = doc.element_mut(node);
        if let Some(id) = &def.id {
            el.set_attribute("id", id.as_str());
        }
        for class in def.class.iter().flat_map(|c| c.split_whitespace()) {
            el.add_class(class);
        }
        for (name, value) in &def.attrs {
            el.set_attribute(name, value.as_str());
        }
        if let Some(text) = &def.text {
            el.set_text(text.as_str());
        }
    }
    doc.append_child(parent, node);

    let left = def.left.unwrap_or(x);
    let top = def.top.unwrap_or(y);
    let width = def.width.unwrap_or(width);

    let mut cursor = top;
    for child in &def.children {
        let child = build_node(doc, node, child, left, cursor, width)?;
        cursor = cursor.max(doc.element(child).rect.bottom());
    }

    let height = match def.height {
        Some(h) => h,
        None if !def.children.is_empty() => cursor - top,
        None => def
            .text
            .as_deref()
            .map(|t| t.lines().count().max(1) as f64 * LINE_HEIGHT)
            .unwrap_or(0.0),
    };
    doc.element_mut(node).rect = Rect::new(left, top, width, height);
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
title = "Test"

[[body]]
tag = "section"
id = "home"
height = 600.0

[[body]]
tag = "section"
id = "about"

[[body.children]]
tag = "p"
class = "about-text fade"
text = "Hello\nWorld"

[[body.children]]
class = "skill-item"
attrs = { "data-level" = "85" }
height = 40.0
"#;

    #[test]
    fn test_flow_layout() {
        let def: PageDef = toml::from_str(PAGE).unwrap();
        let doc = def.build(1280.0).unwrap();

        let about = doc.get_element_by_id("about").unwrap();
        assert_eq!(doc.element(about).rect, Rect::new(0.0, 600.0, 1280.0, 88.0));

        let text = doc.select_one(".about-text").unwrap().unwrap();
        assert!(doc.element(text).has_class("fade"));
        assert_eq!(doc.element(text).rect.top(), 600.0);
        assert_eq!(doc.element(text).rect.height, 48.0);

        let skill = doc.select_one(".skill-item").unwrap().unwrap();
        assert_eq!(doc.element(skill).rect.top(), 648.0);
        assert_eq!(doc.element(skill).attribute("data-level"), Some("85"));
        assert_eq!(doc.scroll_height(), 688.0);
    }

    #[test]
    fn test_json_pages_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.json");
        std::fs::write(
            &path,
            r#"{"body":[{"tag":"img","attrs":{"data-src":"a.png"},"top":2000,"height":100}]}"#,
        )
        .unwrap();

        let doc = PageDef::load(&path).unwrap().build(800.0).unwrap();
        let img = doc.select_one("img[data-src]").unwrap().unwrap();
        assert_eq!(doc.element(img).rect, Rect::new(0.0, 2000.0, 800.0, 100.0));
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html></html>").unwrap();
        assert!(PageDef::load(&path).is_err());
    }
}

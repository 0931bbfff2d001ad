//! Deferred image loading for `img[data-src]`

use crate::dom::{Document, NodeId};
use crate::observer::{IntersectionObserver, ObserverEntry, ObserverOptions};
use crate::viewport::Viewport;
use anyhow::Result;

const LAZY_SELECTOR: &str = "img[data-src]";

/// Observes lazy images and swaps in their real source on first contact
#[derive(Debug, Clone)]
pub struct LazyImages {
    observer: IntersectionObserver,
}

impl LazyImages {
    /// Observe every image that carries `data-src`
    pub fn discover(doc: &Document) -> Result<Self> {
        let mut observer = IntersectionObserver::new(ObserverOptions::default());
        for img in doc.select(LAZY_SELECTOR)? {
            observer.observe(img);
        }
        Ok(Self { observer })
    }

    pub fn pending(&self) -> usize {
        self.observer.targets().len()
    }

    /// Re-check intersections. Returns the images loaded by this pass.
    pub fn check(&mut self, doc: &mut Document, viewport: &Viewport) -> Vec<NodeId> {
        let entries = self.observer.take_records(doc, viewport);
        entries
            .iter()
            .filter_map(|entry| self.on_entry(doc, entry))
            .collect()
    }

    fn on_entry(&mut self, doc: &mut Document, entry: &ObserverEntry) -> Option<NodeId> {
        if !entry.is_intersecting {
            return None;
        }
        let img = entry.target;
        let src = doc.element_mut(img).remove_attribute("data-src")?;
        tracing::debug!("Lazy image loaded: {}", src);
        doc.element_mut(img).set_attribute("src", src);
        self.observer.unobserve(img);
        Some(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Rect;

    #[test]
    fn test_loads_once_in_view() {
        let mut doc = Document::new();
        let body = doc.body();
        let img = doc.create_element("img");
        doc.element_mut(img).set_attribute("data-src", "photo.webp");
        doc.element_mut(img).rect = Rect::new(0.0, 1200.0, 300.0, 200.0);
        doc.append_child(body, img);

        let mut lazy = LazyImages::discover(&doc).unwrap();
        let mut viewport = Viewport::new(1280.0, 800.0);
        assert!(lazy.check(&mut doc, &viewport).is_empty());
        assert_eq!(doc.element(img).attribute("src"), None);

        // Touching the bottom edge is enough at threshold 0
        viewport.scroll_y = 400.0;
        assert_eq!(lazy.check(&mut doc, &viewport), vec![img]);
        assert_eq!(doc.element(img).attribute("src"), Some("photo.webp"));
        assert_eq!(doc.element(img).attribute("data-src"), None);
        assert_eq!(lazy.pending(), 0);
    }

    #[test]
    fn test_plain_images_are_ignored() {
        let mut doc = Document::new();
        let body = doc.body();
        let img = doc.create_element("img");
        doc.element_mut(img).set_attribute("src", "logo.svg");
        doc.append_child(body, img);
        assert_eq!(LazyImages::discover(&doc).unwrap().pending(), 0);
    }
}

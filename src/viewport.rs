//! Viewport geometry
//!
//! Visibility is decided from an element's client rectangle, which is its
//! document box shifted by the scroll offset.

use crate::dom::{Document, NodeId, Rect};

/// Insets applied to the viewport before intersecting, positive grows it.
/// `bottom: -50.0` is the `0px 0px -50px 0px` root margin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl RootMargin {
    pub fn bottom(bottom: f64) -> Self {
        Self {
            bottom,
            ..Self::default()
        }
    }
}

/// The visible window onto the document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    /// Viewport box in client coordinates
    pub fn client_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Element box relative to the viewport's top-left corner
    pub fn bounding_client_rect(&self, doc: &Document, node: NodeId) -> Rect {
        doc.element(node)
            .rect
            .translate(-self.scroll_x, -self.scroll_y)
    }

    /// True iff the element lies entirely inside `[0, width] × [0, height]`
    pub fn is_visible(&self, doc: &Document, node: NodeId) -> bool {
        self.client_rect()
            .contains_rect(&self.bounding_client_rect(doc, node))
    }

    /// Fraction of the element's area inside the margin-adjusted viewport.
    ///
    /// Returns `None` when the element does not touch the root at all. A
    /// zero-area element that touches the root reports `1.0`.
    pub fn intersection_ratio(
        &self,
        doc: &Document,
        node: NodeId,
        margin: RootMargin,
    ) -> Option<f64> {
        let root = Rect::new(
            -margin.left,
            -margin.top,
            self.width + margin.left + margin.right,
            self.height + margin.top + margin.bottom,
        );
        let target = self.bounding_client_rect(doc, node);
        let overlap = target.intersection(&root)?;

        let area = target.area();
        if area == 0.0 {
            return Some(1.0);
        }
        Some(overlap.area() / area)
    }

    /// Largest valid vertical scroll offset for the document
    pub fn max_scroll_y(&self, doc: &Document) -> f64 {
        (doc.scroll_height() - self.height).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_box(rect: Rect) -> (Document, NodeId) {
        let mut doc = Document::new();
        let node = doc.create_element("div");
        doc.element_mut(node).rect = rect;
        let body = doc.body();
        doc.append_child(body, node);
        (doc, node)
    }

    #[test]
    fn test_fully_visible() {
        let (doc, node) = doc_with_box(Rect::new(0.0, 100.0, 400.0, 200.0));
        let viewport = Viewport::new(800.0, 600.0);
        assert!(viewport.is_visible(&doc, node));
    }

    #[test]
    fn test_partially_visible_is_not_visible() {
        let (doc, node) = doc_with_box(Rect::new(0.0, 500.0, 400.0, 200.0));
        let mut viewport = Viewport::new(800.0, 600.0);
        assert!(!viewport.is_visible(&doc, node));

        viewport.scroll_y = 100.0;
        assert!(viewport.is_visible(&doc, node));

        // Scrolled past the top edge
        viewport.scroll_y = 501.0;
        assert!(!viewport.is_visible(&doc, node));
    }

    #[test]
    fn test_intersection_ratio_with_bottom_margin() {
        // Element occupies client rows 540..640, root shrunk to 0..550
        let (doc, node) = doc_with_box(Rect::new(0.0, 540.0, 100.0, 100.0));
        let viewport = Viewport::new(800.0, 600.0);

        let plain = viewport
            .intersection_ratio(&doc, node, RootMargin::default())
            .unwrap();
        assert!((plain - 0.6).abs() < 1e-9);

        let shrunk = viewport
            .intersection_ratio(&doc, node, RootMargin::bottom(-50.0))
            .unwrap();
        assert!((shrunk - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_intersection_ratio_outside() {
        let (doc, node) = doc_with_box(Rect::new(0.0, 2000.0, 100.0, 100.0));
        let viewport = Viewport::new(800.0, 600.0);
        assert!(viewport
            .intersection_ratio(&doc, node, RootMargin::default())
            .is_none());
    }

    #[test]
    fn test_max_scroll() {
        let (doc, _) = doc_with_box(Rect::new(0.0, 0.0, 800.0, 1500.0));
        let viewport = Viewport::new(800.0, 600.0);
        assert_eq!(viewport.max_scroll_y(&doc), 900.0);
    }
}

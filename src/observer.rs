//! Intersection observers
//!
//! Tracks a set of targets and reports an entry whenever a target's
//! intersecting state changes, including the first check after `observe`.
//! The runtime calls [`IntersectionObserver::take_records`] after every
//! scroll, resize or load, mirroring the browser's post-layout delivery.

use crate::dom::{Document, NodeId};
use crate::viewport::{RootMargin, Viewport};
use std::collections::HashMap;

/// Observer configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Minimum visible fraction that counts as intersecting. `0.0` means
    /// any contact, including touching edges.
    pub threshold: f64,
    pub root_margin: RootMargin,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: RootMargin::default(),
        }
    }
}

/// A state change for one target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
}

#[derive(Debug, Clone)]
pub struct IntersectionObserver {
    options: ObserverOptions,
    targets: Vec<NodeId>,
    /// Last reported state per target; absent until the first delivery
    last: HashMap<NodeId, bool>,
}

impl IntersectionObserver {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            targets: Vec::new(),
            last: HashMap::new(),
        }
    }

    /// Start observing. Re-observing an existing target is a no-op.
    pub fn observe(&mut self, target: NodeId) {
        if !self.targets.contains(&target) {
            self.targets.push(target);
        }
    }

    pub fn unobserve(&mut self, target: NodeId) {
        self.targets.retain(|&t| t != target);
        self.last.remove(&target);
    }

    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    /// Compute entries for every target whose state changed since the last call
    pub fn take_records(&mut self, doc: &Document, viewport: &Viewport) -> Vec<ObserverEntry> {
        let mut entries = Vec::new();
        for &target in &self.targets {
            let ratio = if doc.is_attached(target) {
                viewport.intersection_ratio(doc, target, self.options.root_margin)
            } else {
                None
            };
            let is_intersecting = ratio.is_some_and(|r| r >= self.options.threshold);

            if self.last.insert(target, is_intersecting) != Some(is_intersecting) {
                entries.push(ObserverEntry {
                    target,
                    is_intersecting,
                    intersection_ratio: ratio.unwrap_or(0.0),
                });
            }
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Rect;

    fn setup() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let near = doc.create_element("div");
        let far = doc.create_element("div");
        doc.element_mut(near).rect = Rect::new(0.0, 100.0, 100.0, 100.0);
        doc.element_mut(far).rect = Rect::new(0.0, 1500.0, 100.0, 100.0);
        doc.append_child(body, near);
        doc.append_child(body, far);
        (doc, near, far)
    }

    #[test]
    fn test_initial_delivery_reports_every_target() {
        let (doc, near, far) = setup();
        let viewport = Viewport::new(800.0, 600.0);
        let mut observer = IntersectionObserver::new(ObserverOptions::default());
        observer.observe(near);
        observer.observe(far);

        let entries = observer.take_records(&doc, &viewport);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_intersecting);
        assert!(!entries[1].is_intersecting);

        // No change, no entries
        assert!(observer.take_records(&doc, &viewport).is_empty());
    }

    #[test]
    fn test_threshold_and_margin() {
        let (doc, _, far) = setup();
        let mut viewport = Viewport::new(800.0, 600.0);
        let mut observer = IntersectionObserver::new(ObserverOptions {
            threshold: 0.1,
            root_margin: RootMargin::bottom(-50.0),
        });
        observer.observe(far);
        assert!(!observer.take_records(&doc, &viewport)[0].is_intersecting);

        // Client top 1500-955 = 545, visible part 545..550 = 5% - below threshold
        viewport.scroll_y = 955.0;
        assert!(observer.take_records(&doc, &viewport).is_empty());

        // Client top 540, visible 540..550 = 10%
        viewport.scroll_y = 960.0;
        let entries = observer.take_records(&doc, &viewport);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_intersecting);
    }

    #[test]
    fn test_unobserve_stops_reports() {
        let (doc, near, _) = setup();
        let viewport = Viewport::new(800.0, 600.0);
        let mut observer = IntersectionObserver::new(ObserverOptions::default());
        observer.observe(near);
        observer.unobserve(near);
        assert!(observer.take_records(&doc, &viewport).is_empty());
        assert!(observer.targets().is_empty());
    }
}

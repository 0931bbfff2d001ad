//! Scroll-driven behavior: debounced reveal pass, active nav link and the
//! back-to-top control

use crate::config::{LayoutConfig, Timing};
use crate::dom::{Document, NodeId, Selector};
use crate::scheduler::{Scheduler, Task, TimerId};
use crate::viewport::Viewport;
use anyhow::Result;

/// Elements revealed once they are fully on screen
pub const REVEAL_SELECTOR: &str = ".about-text, .contact-info, .linkedin-content > *";

/// Marker class so an element is only revealed once
pub const ANIMATED: &str = "animated";

const SECTION_SELECTOR: &str = "section[id]";

#[derive(Debug, Default)]
pub struct ScrollCoordinator {
    /// The one outstanding reveal timer, replaced on every scroll
    pending_reveal: Option<TimerId>,
    back_to_top: Option<NodeId>,
}

impl ScrollCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn back_to_top(&self) -> Option<NodeId> {
        self.back_to_top
    }

    /// Create the hidden back-to-top button at the end of `<body>`
    pub fn install_back_to_top(&mut self, doc: &mut Document) -> NodeId {
        let button = doc.create_element("button");
        {
            let el = doc.element_mut(button);
            el.add_class("back-to-top");
            el.set_attribute("aria-label", "Back to top");
            el.set_text("↑");
            el.set_style("position", "fixed");
            el.set_style("bottom", "2rem");
            el.set_style("right", "2rem");
            el.set_style("opacity", "0");
            el.set_style("visibility", "hidden");
            el.set_style("z-index", "1000");
        }
        let body = doc.body();
        doc.append_child(body, button);
        self.back_to_top = Some(button);
        button
    }

    /// Whether `target` is (or is inside) the back-to-top button
    pub fn is_back_to_top(&self, doc: &Document, target: NodeId) -> bool {
        self.back_to_top.is_some_and(|b| doc.contains(b, target))
    }

    /// Handle one scroll event at the viewport's current offset
    pub fn on_scroll(
        &mut self,
        doc: &mut Document,
        scheduler: &mut Scheduler,
        viewport: &Viewport,
        timing: &Timing,
        layout: &LayoutConfig,
    ) -> Result<()> {
        if let Some(id) = self.pending_reveal.take() {
            scheduler.clear_timeout(id);
        }
        self.pending_reveal = Some(scheduler.set_timeout(timing.scroll_debounce(), Task::RevealPass));

        update_active_nav(doc, viewport.scroll_y, layout.section_preamble)?;
        self.update_back_to_top(doc, viewport.scroll_y, layout.back_to_top_threshold);
        Ok(())
    }

    /// Show or hide the back-to-top button for scroll offset `y`
    pub fn update_back_to_top(&self, doc: &mut Document, y: f64, threshold: f64) {
        let Some(button) = self.back_to_top else {
            return;
        };
        let (opacity, visibility) = if y > threshold {
            ("1", "visible")
        } else {
            ("0", "hidden")
        };
        let el = doc.element_mut(button);
        el.set_style("opacity", opacity);
        el.set_style("visibility", visibility);
    }

    /// Debounce timer fired. Returns how many elements were revealed.
    pub fn run_reveal_pass(&mut self, doc: &mut Document, viewport: &Viewport) -> Result<usize> {
        self.pending_reveal = None;

        let mut revealed = 0;
        for node in doc.select(REVEAL_SELECTOR)? {
            if doc.element(node).has_class(ANIMATED) || !viewport.is_visible(doc, node) {
                continue;
            }
            let el = doc.element_mut(node);
            el.add_class(crate::animate::FADE_IN_UP);
            el.add_class(ANIMATED);
            revealed += 1;
        }
        if revealed > 0 {
            tracing::trace!("Reveal pass: {} element(s)", revealed);
        }
        Ok(revealed)
    }
}

/// Id of the section containing scroll offset `y`, if any.
///
/// A section spans `[top - preamble, top - preamble + height)`; when ranges
/// overlap the last section in document order wins.
pub fn active_section(doc: &Document, y: f64, preamble: f64) -> Result<Option<String>> {
    let mut current = None;
    for section in doc.select(SECTION_SELECTOR)? {
        let el = doc.element(section);
        let top = el.rect.top() - preamble;
        if y >= top && y < top + el.rect.height {
            current = el.attribute("id").map(str::to_string);
        }
    }
    Ok(current)
}

/// Mark the nav link for the current section `active` and clear all others
pub fn update_active_nav(doc: &mut Document, y: f64, preamble: f64) -> Result<Option<String>> {
    let current = active_section(doc, y, preamble)?;
    let wanted = current.as_ref().map(|id| format!("#{}", id));

    for link in doc.query_all(&Selector::class("nav-link")) {
        let matches = wanted.is_some() && doc.element(link).attribute("href") == wanted.as_deref();
        let el = doc.element_mut(link);
        if matches {
            el.add_class("active");
        } else {
            el.remove_class("active");
        }
    }
    Ok(current)
}

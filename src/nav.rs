//! Navigation: mobile menu toggle and in-page anchor scrolling

use crate::dom::{Document, NodeId, Selector};
use anyhow::{Context, Result};

const ACTIVE: &str = "active";

/// Hamburger button and the menu it opens.
///
/// Only wired when both elements exist on the page.
#[derive(Debug, Clone, Copy)]
pub struct MobileNav {
    hamburger: NodeId,
    menu: NodeId,
}

impl MobileNav {
    /// Find `.hamburger` and `.nav-menu`
    pub fn discover(doc: &Document) -> Option<Self> {
        let hamburger = doc.query(&Selector::class("hamburger"))?;
        let menu = doc.query(&Selector::class("nav-menu"))?;
        Some(Self { hamburger, menu })
    }

    pub fn hamburger(&self) -> NodeId {
        self.hamburger
    }

    pub fn is_open(&self, doc: &Document) -> bool {
        doc.element(self.menu).has_class(ACTIVE)
    }

    /// Route a click: toggle on the hamburger, close on a nav link or outside.
    /// Returns the open state afterwards.
    pub fn on_click(&self, doc: &mut Document, target: NodeId) -> bool {
        if doc.contains(self.hamburger, target) {
            doc.element_mut(self.hamburger).toggle_class(ACTIVE);
            doc.element_mut(self.menu).toggle_class(ACTIVE);
            tracing::debug!("Mobile menu toggled");
        } else if doc.closest(target, &Selector::class("nav-link")).is_some()
            || !doc.contains(self.menu, target)
        {
            self.close(doc);
        }
        self.is_open(doc)
    }

    pub fn close(&self, doc: &mut Document) {
        doc.element_mut(self.hamburger).remove_class(ACTIVE);
        doc.element_mut(self.menu).remove_class(ACTIVE);
    }
}

/// Anchor scrolling for links whose `href` starts with `#`
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    anchors: Selector,
}

impl SmoothScroll {
    pub fn new() -> Result<Self> {
        Ok(Self {
            anchors: Selector::parse("a[href^=\"#\"]")?,
        })
    }

    /// The in-page anchor the click landed on, if any
    pub fn anchor_for(&self, doc: &Document, target: NodeId) -> Option<NodeId> {
        doc.closest(target, &self.anchors)
    }

    /// Scroll destination for a click, or `None` when the link has no target.
    ///
    /// A fragment that is not a valid selector (a bare `#`) is an error.
    pub fn destination(
        &self,
        doc: &Document,
        target: NodeId,
        nav_offset: f64,
    ) -> Result<Option<f64>> {
        let Some(anchor) = self.anchor_for(doc, target) else {
            return Ok(None);
        };
        let href = doc.element(anchor).attribute("href").unwrap_or_default();
        let section = doc
            .select_one(href)
            .with_context(|| format!("Failed to resolve anchor '{}'", href))?;

        Ok(section.map(|s| doc.element(s).rect.top() - nav_offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Rect;

    struct Page {
        doc: Document,
        hamburger: NodeId,
        menu: NodeId,
        link: NodeId,
        outside: NodeId,
    }

    fn page() -> Page {
        let mut doc = Document::new();
        let body = doc.body();

        let hamburger = doc.create_element("div");
        doc.element_mut(hamburger).add_class("hamburger");
        doc.append_child(body, hamburger);
        let bar = doc.create_element("span");
        doc.append_child(hamburger, bar);

        let menu = doc.create_element("ul");
        doc.element_mut(menu).add_class("nav-menu");
        doc.append_child(body, menu);
        let link = doc.create_element("a");
        doc.element_mut(link).add_class("nav-link");
        doc.element_mut(link).set_attribute("href", "#about");
        doc.append_child(menu, link);

        let about = doc.create_element("section");
        doc.element_mut(about).set_attribute("id", "about");
        doc.element_mut(about).rect = Rect::new(0.0, 900.0, 1280.0, 600.0);
        doc.append_child(body, about);

        let outside = doc.create_element("p");
        doc.append_child(about, outside);

        Page {
            doc,
            hamburger,
            menu,
            link,
            outside,
        }
    }

    #[test]
    fn test_hamburger_toggles_both() {
        let mut p = page();
        let nav = MobileNav::discover(&p.doc).unwrap();
        let bar = p.doc.children(p.hamburger)[0];

        assert!(nav.on_click(&mut p.doc, bar));
        assert!(p.doc.element(p.hamburger).has_class("active"));
        assert!(p.doc.element(p.menu).has_class("active"));

        assert!(!nav.on_click(&mut p.doc, p.hamburger));
        assert!(!p.doc.element(p.hamburger).has_class("active"));
    }

    #[test]
    fn test_link_and_outside_click_close() {
        let mut p = page();
        let nav = MobileNav::discover(&p.doc).unwrap();

        nav.on_click(&mut p.doc, p.hamburger);
        assert!(!nav.on_click(&mut p.doc, p.link));

        nav.on_click(&mut p.doc, p.hamburger);
        // Inside the menu but not on a link keeps it open
        assert!(nav.on_click(&mut p.doc, p.menu));
        assert!(!nav.on_click(&mut p.doc, p.outside));
    }

    #[test]
    fn test_not_wired_without_menu() {
        let mut doc = Document::new();
        let body = doc.body();
        let hamburger = doc.create_element("div");
        doc.element_mut(hamburger).add_class("hamburger");
        doc.append_child(body, hamburger);
        assert!(MobileNav::discover(&doc).is_none());
    }

    #[test]
    fn test_smooth_scroll_destination() {
        let p = page();
        let scroll = SmoothScroll::new().unwrap();
        assert_eq!(scroll.destination(&p.doc, p.link, 80.0).unwrap(), Some(820.0));
        assert_eq!(scroll.destination(&p.doc, p.outside, 80.0).unwrap(), None);
    }

    #[test]
    fn test_unknown_and_invalid_fragments() {
        let mut p = page();
        let missing = p.doc.create_element("a");
        p.doc.element_mut(missing).set_attribute("href", "#nowhere");
        let bare = p.doc.create_element("a");
        p.doc.element_mut(bare).set_attribute("href", "#");
        let body = p.doc.body();
        p.doc.append_child(body, missing);
        p.doc.append_child(body, bare);

        let scroll = SmoothScroll::new().unwrap();
        assert_eq!(scroll.destination(&p.doc, missing, 80.0).unwrap(), None);
        let err = scroll.destination(&p.doc, bare, 80.0).unwrap_err();
        assert!(format!("{:#}", err).contains("not a valid selector"));
    }
}

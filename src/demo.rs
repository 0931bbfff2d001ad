// Demo page: a built-in portfolio used when `folio preview` gets no page
//
// The page ships inside the binary so the preview works from any directory.
// It exercises every component: all six animation roles, a lazy image, the
// theme toggle, LinkedIn buttons and reveal targets.

use crate::page::PageDef;
use anyhow::{Context, Result};

const DEMO_PAGE: &str = include_str!("../demos/portfolio.toml");

/// Parse the bundled demo page
pub fn demo_page() -> Result<PageDef> {
    toml::from_str(DEMO_PAGE).context("Bundled demo page is invalid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_page_covers_components() {
        let doc = demo_page().unwrap().build(1280.0).unwrap();

        for selector in [
            ".hamburger",
            ".nav-menu",
            "#theme-toggle",
            ".skill-item .skill-progress",
            ".cert-card .progress-fill",
            ".stat-item .stat-number",
            ".project-card",
            ".education-item",
            ".timeline-item",
            "img[data-src]",
            ".linkedin-content > *",
            ".about-text",
            ".contact-info",
            ".hero-buttons",
        ] {
            assert!(
                doc.select_one(selector).unwrap().is_some(),
                "demo page has no {}",
                selector
            );
        }

        // Every nav link points at a section
        for link in doc.select(".nav-link").unwrap() {
            let href = doc.element(link).attribute("href").unwrap();
            assert!(doc.get_element_by_id(&href[1..]).is_some(), "{}", href);
        }
    }

    #[test]
    fn test_demo_sections_stack() {
        let doc = demo_page().unwrap().build(1280.0).unwrap();
        let home = doc.get_element_by_id("home").unwrap();
        let about = doc.get_element_by_id("about").unwrap();
        assert_eq!(doc.element(home).rect.top(), 60.0);
        assert_eq!(doc.element(about).rect.top(), 700.0);
    }
}

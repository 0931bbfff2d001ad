//! Click tracking for key page elements
//!
//! There is no analytics backend: interactions are kept in memory for the
//! snapshot and logged.

use crate::dom::{Document, NodeId, Selector};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

const TRACKED_SELECTOR: &str = ".btn, .nav-link, .project-card, .social-link";

/// One recorded interaction
#[derive(Debug, Clone, Serialize)]
pub struct Interaction {
    pub at: DateTime<Utc>,
    pub action: String,
    /// Trimmed text content, or the class name when there is no text
    pub element: String,
}

#[derive(Debug, Clone)]
pub struct InteractionTracker {
    tracked: Selector,
    interactions: Vec<Interaction>,
}

impl InteractionTracker {
    pub fn new() -> Result<Self> {
        Ok(Self {
            tracked: Selector::parse(TRACKED_SELECTOR)?,
            interactions: Vec::new(),
        })
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Record a click if it landed on or inside a tracked element
    pub fn on_click(&mut self, doc: &Document, target: NodeId) -> Option<&Interaction> {
        let node = doc.closest(target, &self.tracked)?;
        let text = doc.text_content(node);
        let text = text.trim();
        let element = if text.is_empty() {
            doc.element(node).class_name()
        } else {
            text.to_string()
        };

        tracing::info!("User interaction: click on {}", element);
        self.interactions.push(Interaction {
            at: Utc::now(),
            action: "click".to_string(),
            element,
        });
        self.interactions.last()
    }
}

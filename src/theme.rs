// Theme preference - light/dark color scheme persisted in the key-value store
//
// The scheme is mirrored onto the root element as `data-color-scheme` so page
// styles (and the terminal preview) can follow it.

use crate::dom::{Document, NodeId};
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage key for the preference
pub const STORAGE_KEY: &str = "theme";

/// Root attribute carrying the active scheme
pub const SCHEME_ATTRIBUTE: &str = "data-color-scheme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ColorScheme::Light => ColorScheme::Dark,
            ColorScheme::Dark => ColorScheme::Light,
        }
    }

    /// Anything other than "light" reads as dark, so the toggle always lands on light from it
    fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some("light") => ColorScheme::Light,
            _ => ColorScheme::Dark,
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `#theme-toggle` control. Only wired when the element exists.
#[derive(Debug, Clone, Copy)]
pub struct ThemeToggle {
    button: NodeId,
}

impl ThemeToggle {
    /// Wire the toggle if present and apply the stored preference
    pub fn init(doc: &mut Document, store: &dyn KeyValueStore) -> Option<Self> {
        let button = doc.get_element_by_id("theme-toggle")?;

        // Stored value is applied verbatim
        let stored = match store.get(STORAGE_KEY) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to read theme preference: {:#}", e);
                None
            }
        };
        let scheme = stored.unwrap_or_else(|| ColorScheme::Light.as_str().to_string());
        let root = doc.root();
        doc.element_mut(root).set_attribute(SCHEME_ATTRIBUTE, scheme);

        Some(Self { button })
    }

    pub fn button(&self) -> NodeId {
        self.button
    }

    /// Whether a click on `target` hits the toggle
    pub fn is_hit(&self, doc: &Document, target: NodeId) -> bool {
        doc.contains(self.button, target)
    }

    /// Flip the scheme and persist it
    pub fn toggle(
        &self,
        doc: &mut Document,
        store: &mut dyn KeyValueStore,
    ) -> anyhow::Result<ColorScheme> {
        let root = doc.root();
        let next = current_scheme(doc).toggled();
        doc.element_mut(root).set_attribute(SCHEME_ATTRIBUTE, next.as_str());
        tracing::info!("Theme switched to {}", next);
        store.set(STORAGE_KEY, next.as_str())?;
        Ok(next)
    }
}

/// Scheme currently on the root element. An absent attribute reads as not-light.
pub fn current_scheme(doc: &Document) -> ColorScheme {
    ColorScheme::from_attribute(doc.element(doc.root()).attribute(SCHEME_ATTRIBUTE))
}

//! Layout configuration: scroll offsets, thresholds and viewport size

use serde::Deserialize;

/// Geometry constants for navigation, observers and the preview
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Fixed navbar height subtracted when scrolling to an anchor
    pub nav_offset: f64,
    /// Lead-in before a section counts as the current one
    pub section_preamble: f64,
    /// Back-to-top shows when the scroll offset is strictly greater than this
    pub back_to_top_threshold: f64,
    /// Visible fraction that triggers an animation
    pub observer_threshold: f64,
    /// Pixels trimmed off the bottom of the viewport for animation triggers
    pub observer_bottom_margin: f64,
    /// Default viewport width for headless runs
    pub viewport_width: f64,
    /// Default viewport height for headless runs
    pub viewport_height: f64,
    /// Page pixels per terminal row in the preview
    pub px_per_row: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            nav_offset: 80.0,
            section_preamble: 100.0,
            back_to_top_threshold: 500.0,
            observer_threshold: 0.1,
            observer_bottom_margin: 50.0,
            viewport_width: 1280.0,
            viewport_height: 800.0,
            px_per_row: 20.0,
        }
    }
}

/// Layout settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileLayout {
    pub nav_offset: Option<f64>,
    pub section_preamble: Option<f64>,
    pub back_to_top_threshold: Option<f64>,
    pub observer_threshold: Option<f64>,
    pub observer_bottom_margin: Option<f64>,
    pub viewport_width: Option<f64>,
    pub viewport_height: Option<f64>,
    pub px_per_row: Option<f64>,
}

impl LayoutConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileLayout>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            nav_offset: file.nav_offset.unwrap_or(defaults.nav_offset),
            section_preamble: file.section_preamble.unwrap_or(defaults.section_preamble),
            back_to_top_threshold: file
                .back_to_top_threshold
                .unwrap_or(defaults.back_to_top_threshold),
            observer_threshold: file
                .observer_threshold
                .map(|t| t.clamp(0.0, 1.0))
                .unwrap_or(defaults.observer_threshold),
            observer_bottom_margin: file
                .observer_bottom_margin
                .unwrap_or(defaults.observer_bottom_margin),
            viewport_width: file
                .viewport_width
                .filter(|&w| w > 0.0)
                .unwrap_or(defaults.viewport_width),
            viewport_height: file
                .viewport_height
                .filter(|&h| h > 0.0)
                .unwrap_or(defaults.viewport_height),
            px_per_row: file
                .px_per_row
                .filter(|&p| p > 0.0)
                .unwrap_or(defaults.px_per_row),
        }
    }
}

/// Parse a `WIDTHxHEIGHT` viewport size such as `1280x800`
pub fn parse_viewport_size(s: &str) -> Option<(f64, f64)> {
    let (w, h) = s.trim().split_once(['x', 'X'])?;
    let width: f64 = w.trim().parse().ok()?;
    let height: f64 = h.trim().parse().ok()?;
    (width > 0.0 && height > 0.0).then_some((width, height))
}

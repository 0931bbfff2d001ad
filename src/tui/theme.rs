// Preview palette
//
// The preview follows the page's own color scheme: toggling the theme on the
// page repaints the terminal in the matching palette.

use crate::notify::Severity;
use crate::theme::ColorScheme;
use ratatui::style::{Color, Modifier, Style};

/// Colors for every preview element
#[derive(Debug, Clone)]
pub struct Palette {
    // Base colors
    pub bg: Color,
    pub fg: Color,
    pub dim: Color,
    pub border: Color,

    // Navigation
    pub title: Color,
    pub nav_active: Color,

    // Page content
    pub heading: Color,
    pub revealed: Color,
    pub bar_filled: Color,
    pub bar_empty: Color,
    pub image: Color,

    // Status bar
    pub status_bg: Color,
    pub status_fg: Color,
    pub fault: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

impl Palette {
    /// Palette for the page's scheme; pages without a toggle render dark
    pub fn for_scheme(scheme: Option<ColorScheme>) -> Self {
        match scheme {
            Some(ColorScheme::Light) => Self::light(),
            Some(ColorScheme::Dark) | None => Self::dark(),
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::White,
            dim: Color::DarkGray,
            border: Color::Gray,

            title: Color::Cyan,
            nav_active: Color::Yellow,

            heading: Color::Cyan,
            revealed: Color::White,
            bar_filled: Color::Green,
            bar_empty: Color::DarkGray,
            image: Color::Magenta,

            status_bg: Color::DarkGray,
            status_fg: Color::White,
            fault: Color::Red,
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Color::White,
            fg: Color::Black,
            dim: Color::Gray,
            border: Color::DarkGray,

            title: Color::Blue,
            nav_active: Color::Magenta,

            heading: Color::Blue,
            revealed: Color::Black,
            bar_filled: Color::Blue,
            bar_empty: Color::Gray,
            image: Color::Magenta,

            status_bg: Color::Gray,
            status_fg: Color::Black,
            fault: Color::Red,
        }
    }

    /// Border color of the notification panel
    pub fn severity(&self, severity: Severity) -> Color {
        match severity {
            Severity::Info => Color::Cyan,
            Severity::Success => Color::Green,
            Severity::Warning => Color::Yellow,
            Severity::Error => Color::Red,
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Text of an element that has not been revealed yet
    pub fn pending(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn emphasized(&self) -> Style {
        Style::default()
            .fg(self.revealed)
            .add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_follows_scheme() {
        assert_eq!(Palette::for_scheme(Some(ColorScheme::Light)).bg, Color::White);
        assert_eq!(Palette::for_scheme(Some(ColorScheme::Dark)).bg, Color::Reset);
        assert_eq!(Palette::for_scheme(None).bg, Color::Reset);
    }
}

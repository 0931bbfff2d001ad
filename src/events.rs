// Events that drive the page runtime
//
// A replay script is JSON Lines, one event per line. The preview produces the
// same events from key presses, so both surfaces go through one dispatcher.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One input to the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")] // {"type": "click", "target": ".hamburger"}
pub enum PageEvent {
    /// Click the `nth` element matching `target`
    Click {
        target: String,
        #[serde(default)]
        nth: usize,
    },

    /// Scroll the window to vertical offset `y`
    Scroll { y: f64 },

    /// Resize the viewport
    Resize { width: f64, height: f64 },

    /// Pointer moved onto an element
    PointerEnter {
        target: String,
        #[serde(default)]
        nth: usize,
    },

    /// Pointer left an element
    PointerLeave {
        target: String,
        #[serde(default)]
        nth: usize,
    },

    /// Tab hidden or shown
    VisibilityChange { hidden: bool },

    /// Let virtual time pass, firing due timers
    Wait { ms: u64 },
}

impl PageEvent {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            PageEvent::Click { .. } => "click",
            PageEvent::Scroll { .. } => "scroll",
            PageEvent::Resize { .. } => "resize",
            PageEvent::PointerEnter { .. } => "pointer_enter",
            PageEvent::PointerLeave { .. } => "pointer_leave",
            PageEvent::VisibilityChange { .. } => "visibility_change",
            PageEvent::Wait { .. } => "wait",
        }
    }
}

/// Parse a JSON Lines script. Blank lines and `//` comments are skipped.
pub fn parse_script(content: &str) -> Result<Vec<PageEvent>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with("//")
        })
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid event on line {}", i + 1))
        })
        .collect()
}

pub fn load_script(path: &Path) -> Result<Vec<PageEvent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    parse_script(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script = r#"
// open the menu, then jump to about
{"type":"click","target":".hamburger"}
{"type":"click","target":".nav-link","nth":1}
{"type":"scroll","y":600}

{"type":"wait","ms":300}
{"type":"visibility_change","hidden":true}
"#;
        let events = parse_script(script).unwrap();
        assert_eq!(events.len(), 5);
        assert_eq!(
            events[0],
            PageEvent::Click {
                target: ".hamburger".to_string(),
                nth: 0
            }
        );
        assert_eq!(events[2], PageEvent::Scroll { y: 600.0 });
        assert_eq!(events[3].kind(), "wait");
    }

    #[test]
    fn test_parse_error_names_line() {
        let err = parse_script("{\"type\":\"scroll\",\"y\":1}\n{\"type\":\"jump\"}").unwrap_err();
        assert_eq!(err.to_string(), "Invalid event on line 2");
    }
}

// Startup module - banner and component wiring status
//
// Printed to stderr so `folio run` keeps stdout clean for the JSON snapshot.
// The welcome banner goes through tracing, so the preview shows it in the
// status bar and headless runs can filter it.

use crate::config::{Config, VERSION};
use crate::runtime::Wiring;

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// Component loading result for display
pub struct ComponentStatus {
    pub name: &'static str,
    pub enabled: bool,
    pub description: String,
}

/// Print the startup banner and component status
pub fn print_startup(page_label: &str, wiring: &Wiring) {
    use colors::*;

    eprintln!();
    eprintln!("  {BOLD}{CYAN}folio{RESET} {DIM}v{VERSION}{RESET}");
    eprintln!("  {DIM}Headless portfolio page runtime{RESET}");
    eprintln!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            eprintln!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            eprintln!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }
    eprintln!();

    eprintln!("  {DIM}Wiring components...{RESET}");
    for component in component_status(wiring) {
        print_component_status(&component);
    }
    eprintln!();
    eprintln!("  {MAGENTA}▸{RESET} Page {BOLD}{}{RESET}", page_label);
    eprintln!();
}

/// Status of each component for a loaded page
fn component_status(wiring: &Wiring) -> Vec<ComponentStatus> {
    vec![
        ComponentStatus {
            name: "animations",
            enabled: wiring.observed > 0,
            description: format!("{} observed element(s)", wiring.observed),
        },
        ComponentStatus {
            name: "scroll",
            enabled: true, // Always on
            description: "Active nav, reveal pass, back-to-top".to_string(),
        },
        ComponentStatus {
            name: "notify",
            enabled: true,
            description: "Notification panel".to_string(),
        },
        ComponentStatus {
            name: "mobile-nav",
            enabled: wiring.mobile_nav,
            description: "Hamburger menu".to_string(),
        },
        ComponentStatus {
            name: "theme",
            enabled: wiring.theme_toggle,
            description: "Light/dark toggle".to_string(),
        },
        ComponentStatus {
            name: "lazy-images",
            enabled: wiring.lazy_images > 0,
            description: format!("{} deferred image(s)", wiring.lazy_images),
        },
    ]
}

fn print_component_status(component: &ComponentStatus) {
    use colors::*;

    let (icon, style) = if component.enabled {
        (format!("{GREEN}✓{RESET}"), "")
    } else {
        (format!("{DIM}○{RESET}"), DIM)
    };

    eprintln!(
        "    {icon} {style}{:<12}{RESET} {DIM}{}{RESET}",
        component.name, component.description
    );
}

/// Log the console welcome banner
pub fn log_welcome(title: Option<&str>) {
    tracing::info!("═══════════════════════════════════");
    tracing::info!("  🚀 {}", title.unwrap_or("IT Professional Portfolio"));
    tracing::info!("═══════════════════════════════════");
    tracing::info!("Welcome to my portfolio! Feel free to explore and connect.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_status_follows_wiring() {
        let wiring = Wiring {
            mobile_nav: false,
            theme_toggle: true,
            observed: 0,
            lazy_images: 2,
        };
        let status = component_status(&wiring);
        let enabled = |name: &str| status.iter().find(|c| c.name == name).unwrap().enabled;
        assert!(!enabled("mobile-nav"));
        assert!(!enabled("animations"));
        assert!(enabled("theme"));
        assert!(enabled("lazy-images"));
    }
}

//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Render the full config as a commented TOML document
    pub fn to_toml(&self) -> String {
        let t = &self.timing;
        let l = &self.layout;
        let log = &self.logging;

        format!(
            r#"# folio configuration

# ─────────────────────────────────────────────────────────────────────────────
# TIMING (milliseconds)
# ─────────────────────────────────────────────────────────────────────────────
[timing]
notification_duration_ms = {notification_duration}
notification_exit_ms = {notification_exit}
scroll_debounce_ms = {scroll_debounce}
skill_delay_ms = {skill_delay}
cert_delay_ms = {cert_delay}
counter_tick_ms = {counter_tick}
counter_steps = {counter_steps}   # step size = ceil(target / counter_steps)
hero_delay_ms = {hero_delay}
hero_stagger_ms = {hero_stagger}

# ─────────────────────────────────────────────────────────────────────────────
# LAYOUT (pixels)
# ─────────────────────────────────────────────────────────────────────────────
[layout]
nav_offset = {nav_offset:?}               # fixed navbar height for anchor scrolling
section_preamble = {section_preamble:?}   # lead-in before a section becomes active
back_to_top_threshold = {back_to_top:?}
observer_threshold = {observer_threshold:?}
observer_bottom_margin = {observer_margin:?}
viewport_width = {viewport_width:?}
viewport_height = {viewport_height:?}
px_per_row = {px_per_row:?}               # preview only

# Key-value storage (theme preference)
[storage]
path = "{storage_path}"

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# JSON file logging (in addition to preview buffer or stderr)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            notification_duration = t.notification_duration_ms,
            notification_exit = t.notification_exit_ms,
            scroll_debounce = t.scroll_debounce_ms,
            skill_delay = t.skill_delay_ms,
            cert_delay = t.cert_delay_ms,
            counter_tick = t.counter_tick_ms,
            counter_steps = t.counter_steps,
            hero_delay = t.hero_delay_ms,
            hero_stagger = t.hero_stagger_ms,
            nav_offset = l.nav_offset,
            section_preamble = l.section_preamble,
            back_to_top = l.back_to_top_threshold,
            observer_threshold = l.observer_threshold,
            observer_margin = l.observer_bottom_margin,
            viewport_width = l.viewport_width,
            viewport_height = l.viewport_height,
            px_per_row = l.px_per_row,
            storage_path = toml_path(&self.storage.path),
            log_level = log.level,
            log_file_enabled = log.file_enabled,
            log_file_dir = toml_path(&log.file_dir),
            log_file_rotation = log.file_rotation.as_str(),
            log_file_prefix = log.file_prefix,
        )
    }
}

/// Path as a TOML basic-string body (backslashes escaped for Windows paths)
fn toml_path(path: &std::path::Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}

//! Timing configuration: every delay and interval the page uses
//!
//! Values are milliseconds on the page's virtual clock.

use serde::Deserialize;
use std::time::Duration;

/// Delays and intervals for animations, notifications and scrolling
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    /// How long a notification stays before auto-dismissing
    pub notification_duration_ms: u64,
    /// Exit transition length before a dismissed notification is removed
    pub notification_exit_ms: u64,
    /// Debounce window for the scroll-driven reveal pass
    pub scroll_debounce_ms: u64,
    /// Delay before a skill bar fills
    pub skill_delay_ms: u64,
    /// Delay before a certification progress bar fills
    pub cert_delay_ms: u64,
    /// Interval between stat counter steps
    pub counter_tick_ms: u64,
    /// Number of steps a counter aims for (step = ceil(target / steps))
    pub counter_steps: u64,
    /// Delay after load before the hero reveal starts
    pub hero_delay_ms: u64,
    /// Stagger between hero elements
    pub hero_stagger_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            notification_duration_ms: 5000,
            notification_exit_ms: 300,
            scroll_debounce_ms: 10,
            skill_delay_ms: 200,
            cert_delay_ms: 300,
            counter_tick_ms: 50,
            counter_steps: 30,
            hero_delay_ms: 500,
            hero_stagger_ms: 200,
        }
    }
}

/// Timing settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileTiming {
    pub notification_duration_ms: Option<u64>,
    pub notification_exit_ms: Option<u64>,
    pub scroll_debounce_ms: Option<u64>,
    pub skill_delay_ms: Option<u64>,
    pub cert_delay_ms: Option<u64>,
    pub counter_tick_ms: Option<u64>,
    pub counter_steps: Option<u64>,
    pub hero_delay_ms: Option<u64>,
    pub hero_stagger_ms: Option<u64>,
}

impl Timing {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileTiming>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            notification_duration_ms: file
                .notification_duration_ms
                .unwrap_or(defaults.notification_duration_ms),
            notification_exit_ms: file
                .notification_exit_ms
                .unwrap_or(defaults.notification_exit_ms),
            scroll_debounce_ms: file
                .scroll_debounce_ms
                .unwrap_or(defaults.scroll_debounce_ms),
            skill_delay_ms: file.skill_delay_ms.unwrap_or(defaults.skill_delay_ms),
            cert_delay_ms: file.cert_delay_ms.unwrap_or(defaults.cert_delay_ms),
            counter_tick_ms: file.counter_tick_ms.unwrap_or(defaults.counter_tick_ms),
            // Zero steps would make every counter jump straight to its target
            counter_steps: file
                .counter_steps
                .filter(|&s| s > 0)
                .unwrap_or(defaults.counter_steps),
            hero_delay_ms: file.hero_delay_ms.unwrap_or(defaults.hero_delay_ms),
            hero_stagger_ms: file.hero_stagger_ms.unwrap_or(defaults.hero_stagger_ms),
        }
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_duration_ms)
    }

    pub fn notification_exit(&self) -> Duration {
        Duration::from_millis(self.notification_exit_ms)
    }

    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_ms)
    }

    pub fn skill_delay(&self) -> Duration {
        Duration::from_millis(self.skill_delay_ms)
    }

    pub fn cert_delay(&self) -> Duration {
        Duration::from_millis(self.cert_delay_ms)
    }

    pub fn counter_tick(&self) -> Duration {
        Duration::from_millis(self.counter_tick_ms)
    }

    pub fn hero_delay(&self) -> Duration {
        Duration::from_millis(self.hero_delay_ms)
    }

    pub fn hero_stagger(&self) -> Duration {
        Duration::from_millis(self.hero_stagger_ms)
    }
}

//! Viewport-triggered animations
//!
//! Each observed element animates at most once. An intersecting observer
//! entry dispatches on the element's role classes; once any visual change
//! has been applied or scheduled the element is marked animated and later
//! entries for it are ignored. Missing or malformed data attributes leave
//! the element untouched without raising an error.

use crate::config::Timing;
use crate::dom::{Document, NodeId, Selector};
use crate::observer::ObserverEntry;
use crate::scheduler::{Scheduler, Task};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Elements the animation observer watches
pub const OBSERVED_SELECTOR: &str =
    ".skill-item, .cert-card, .stat-item, .project-card, .education-item, .timeline-item";

/// Elements revealed by the staggered hero sequence, in order
pub const HERO_SELECTOR: &str = ".hero-name, .hero-title, .hero-subtitle, .hero-status";

/// Class applied for fade-in reveals
pub const FADE_IN_UP: &str = "fade-in-up";

/// Class applied for slide-in reveals
pub const SLIDE_IN_LEFT: &str = "slide-in-left";

/// Leading unsigned integer, ignoring leading whitespace
static LEADING_INT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\s*(\d+)").ok());

/// Semantic role of an observed element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    SkillItem,
    CertCard,
    StatItem,
    ProjectCard,
    EducationItem,
    TimelineItem,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::SkillItem,
        Role::CertCard,
        Role::StatItem,
        Role::ProjectCard,
        Role::EducationItem,
        Role::TimelineItem,
    ];

    pub fn class(self) -> &'static str {
        match self {
            Role::SkillItem => "skill-item",
            Role::CertCard => "cert-card",
            Role::StatItem => "stat-item",
            Role::ProjectCard => "project-card",
            Role::EducationItem => "education-item",
            Role::TimelineItem => "timeline-item",
        }
    }

    /// Roles carried by an element, in dispatch order
    pub fn of(doc: &Document, node: NodeId) -> Vec<Role> {
        let el = doc.element(node);
        Role::ALL
            .into_iter()
            .filter(|r| el.has_class(r.class()))
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Counter
// ─────────────────────────────────────────────────────────────────────────────

/// Linear count-up for a stat number
#[derive(Debug, Clone, PartialEq)]
pub struct Counter {
    pub node: NodeId,
    pub current: u64,
    pub target: u64,
    pub step: u64,
    /// Re-append "+" to every displayed value
    pub plus: bool,
}

impl Counter {
    /// Counter from 0 to `target` in roughly `steps` increments of `ceil(target / steps)`
    pub fn new(node: NodeId, target: u64, steps: u64, plus: bool) -> Self {
        Self {
            node,
            current: 0,
            target,
            step: target.div_ceil(steps.max(1)),
            plus,
        }
    }

    /// Advance one step, clamping at the target. Returns true once finished.
    pub fn advance(&mut self) -> bool {
        self.current = self.current.saturating_add(self.step);
        if self.current >= self.target {
            self.current = self.target;
            return true;
        }
        false
    }

    /// Text shown after the current step
    pub fn display(&self) -> String {
        if self.plus {
            format!("{}+", self.current)
        } else {
            self.current.to_string()
        }
    }
}

/// Every value a counter displays for `target`, in order
pub fn counter_sequence(target: u64, steps: u64) -> Vec<u64> {
    let step = target.div_ceil(steps.max(1));
    let mut values = Vec::new();
    let mut current = 0u64;
    loop {
        current = current.saturating_add(step);
        if current >= target {
            values.push(target);
            return values;
        }
        values.push(current);
    }
}

/// Parse stat text like `"87"` or `"15+"` into (target, has plus suffix)
pub fn parse_stat(text: &str) -> Option<(u64, bool)> {
    let plus = text.contains('+');
    let stripped = text.replace('+', "");
    let digits = LEADING_INT.as_ref()?.captures(&stripped)?.get(1)?.as_str();
    let target = digits.parse().ok()?;
    Some((target, plus))
}

/// Parse a 0–100 percentage attribute into a CSS width
pub fn parse_percent(value: &str) -> Option<String> {
    let level: f64 = value.trim().parse().ok()?;
    if !level.is_finite() || !(0.0..=100.0).contains(&level) {
        return None;
    }
    Some(format!("{}%", level))
}

// ─────────────────────────────────────────────────────────────────────────────
// Animation Trigger
// ─────────────────────────────────────────────────────────────────────────────

/// Exactly-once activation of observed elements
#[derive(Debug, Default)]
pub struct AnimationTrigger {
    animated: HashSet<NodeId>,
}

impl AnimationTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_animated(&self, node: NodeId) -> bool {
        self.animated.contains(&node)
    }

    pub fn animated_count(&self) -> usize {
        self.animated.len()
    }

    /// Handle one entry from the animation observer
    pub fn on_entry(
        &mut self,
        doc: &mut Document,
        scheduler: &mut Scheduler,
        timing: &Timing,
        entry: &ObserverEntry,
    ) {
        let node = entry.target;
        if !entry.is_intersecting || self.animated.contains(&node) {
            return;
        }

        let mut activated = false;
        for role in Role::of(doc, node) {
            activated |= activate(doc, scheduler, timing, node, role);
        }

        if activated {
            self.animated.insert(node);
            tracing::debug!("Animated {} ({})", doc.element(node).class_name(), entry.intersection_ratio);
        }
    }
}

/// Apply one role's visual change. Returns whether anything was applied or scheduled.
fn activate(
    doc: &mut Document,
    scheduler: &mut Scheduler,
    timing: &Timing,
    node: NodeId,
    role: Role,
) -> bool {
    match role {
        Role::SkillItem => {
            let Some(bar) = doc.find_within(node, &Selector::class("skill-progress")) else {
                return false;
            };
            let Some(width) = doc.element(node).attribute("data-level").and_then(parse_percent)
            else {
                return false;
            };
            scheduler.set_timeout(timing.skill_delay(), Task::SetWidth { node: bar, width });
            true
        }
        Role::CertCard => {
            let Some(fill) = doc.find_within(node, &Selector::class("progress-fill")) else {
                return false;
            };
            let Some(width) = doc.element(fill).attribute("data-progress").and_then(parse_percent)
            else {
                return false;
            };
            scheduler.set_timeout(timing.cert_delay(), Task::SetWidth { node: fill, width });
            true
        }
        Role::StatItem => {
            let Some(number) = doc.find_within(node, &Selector::class("stat-number")) else {
                return false;
            };
            if let Some((target, plus)) = parse_stat(&doc.text_content(number)) {
                let counter = Counter::new(number, target, timing.counter_steps, plus);
                scheduler.set_timeout(timing.counter_tick(), Task::CounterTick(counter));
            }
            doc.element_mut(node).add_class(FADE_IN_UP);
            true
        }
        Role::ProjectCard => {
            doc.element_mut(node).add_class(FADE_IN_UP);
            true
        }
        Role::EducationItem | Role::TimelineItem => {
            doc.element_mut(node).add_class(SLIDE_IN_LEFT);
            true
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Task handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Fill a progress bar if it is still in the document
pub fn run_set_width(doc: &mut Document, node: NodeId, width: &str) {
    if doc.is_attached(node) {
        doc.element_mut(node).set_style("width", width);
    }
}

/// Show the next counter value and re-arm until the target is reached
pub fn run_counter_tick(
    doc: &mut Document,
    scheduler: &mut Scheduler,
    timing: &Timing,
    mut counter: Counter,
) {
    if !doc.is_attached(counter.node) {
        return;
    }
    let done = counter.advance();
    let node = counter.node;
    doc.element_mut(node).set_text(counter.display());
    if !done {
        scheduler.set_timeout(timing.counter_tick(), Task::CounterTick(counter));
    }
}

/// Arm the hero reveal relative to page load
pub fn schedule_hero_reveal(scheduler: &mut Scheduler, timing: &Timing) {
    scheduler.set_timeout(timing.hero_delay(), Task::HeroReveal);
}

/// Stagger `fade-in-up` across the hero elements, then the hero buttons
pub fn run_hero_reveal(
    doc: &Document,
    scheduler: &mut Scheduler,
    timing: &Timing,
) -> anyhow::Result<()> {
    let elements = doc.select(HERO_SELECTOR)?;
    for (i, &node) in elements.iter().enumerate() {
        scheduler.set_timeout(
            timing.hero_stagger() * i as u32,
            Task::AddClass {
                node,
                class: FADE_IN_UP,
            },
        );
    }

    if let Some(buttons) = doc.query(&Selector::class("hero-buttons")) {
        scheduler.set_timeout(
            timing.hero_stagger() * elements.len() as u32,
            Task::AddClass {
                node: buttons,
                class: FADE_IN_UP,
            },
        );
    }
    Ok(())
}

/// Add a class if the element is still in the document
pub fn run_add_class(doc: &mut Document, node: NodeId, class: &str) {
    if doc.is_attached(node) {
        doc.element_mut(node).add_class(class);
    }
}

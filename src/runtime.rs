//! Page runtime
//!
//! Owns the document and every component, routes events to them and runs
//! due timers. Each listener and each timer task runs to completion; a
//! failure is logged, counted as a fault and does not stop the remaining
//! listeners.

use crate::animate::{self, AnimationTrigger, OBSERVED_SELECTOR};
use crate::config::{Config, LayoutConfig, Timing};
use crate::dom::{Document, NodeId, NodeSnapshot, Selector};
use crate::events::PageEvent;
use crate::lazy::LazyImages;
use crate::linkedin;
use crate::nav::{MobileNav, SmoothScroll};
use crate::notify::{self, Notification, NotificationWidget, Severity};
use crate::observer::{IntersectionObserver, ObserverOptions};
use crate::scheduler::{Scheduler, Task};
use crate::scroll::{self, ScrollCoordinator};
use crate::storage::KeyValueStore;
use crate::theme::{self, ColorScheme, ThemeToggle};
use crate::tracking::{Interaction, InteractionTracker};
use crate::viewport::{RootMargin, Viewport};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

/// Which optional components found their elements on load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Wiring {
    pub mobile_nav: bool,
    pub theme_toggle: bool,
    pub observed: usize,
    pub lazy_images: usize,
}

/// Serializable end state of a run
#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot {
    pub time_ms: u128,
    pub scroll_y: f64,
    pub viewport: (f64, f64),
    pub color_scheme: Option<String>,
    pub active_section: Option<String>,
    pub notification: Option<NotificationSnapshot>,
    pub animated: usize,
    pub faults: usize,
    pub interactions: Vec<Interaction>,
    pub document: NodeSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationSnapshot {
    pub message: String,
    pub severity: Severity,
    pub shown_at_ms: u128,
}

pub struct Page {
    doc: Document,
    scheduler: Scheduler,
    viewport: Viewport,
    timing: Timing,
    layout: LayoutConfig,
    store: Box<dyn KeyValueStore>,

    animations: AnimationTrigger,
    animation_observer: IntersectionObserver,
    lazy_images: LazyImages,
    notifications: NotificationWidget,
    scroll: ScrollCoordinator,
    mobile_nav: Option<MobileNav>,
    smooth_scroll: SmoothScroll,
    theme_toggle: Option<ThemeToggle>,
    tracker: InteractionTracker,

    hidden: bool,
    faults: usize,
}

impl Page {
    /// Wire every component against `doc` in load order, then deliver the
    /// first observer records.
    pub fn load(
        mut doc: Document,
        config: &Config,
        viewport: Viewport,
        store: Box<dyn KeyValueStore>,
    ) -> Result<Self> {
        let layout = config.layout.clone();
        let timing = config.timing.clone();

        let mobile_nav = MobileNav::discover(&doc);
        let smooth_scroll = SmoothScroll::new()?;
        scroll::update_active_nav(&mut doc, viewport.scroll_y, layout.section_preamble)?;

        let mut animation_observer = IntersectionObserver::new(ObserverOptions {
            threshold: layout.observer_threshold,
            root_margin: RootMargin::bottom(-layout.observer_bottom_margin),
        });
        for node in doc.select(OBSERVED_SELECTOR)? {
            animation_observer.observe(node);
        }

        NotificationWidget::install_styles(&mut doc);
        let theme_toggle = ThemeToggle::init(&mut doc, store.as_ref());

        let mut scheduler = Scheduler::new();
        animate::schedule_hero_reveal(&mut scheduler, &timing);

        let lazy_images = LazyImages::discover(&doc)?;
        let mut scroll = ScrollCoordinator::new();
        scroll.install_back_to_top(&mut doc);
        let tracker = InteractionTracker::new()?;

        let mut page = Self {
            doc,
            scheduler,
            viewport,
            timing,
            layout,
            store,
            animations: AnimationTrigger::new(),
            animation_observer,
            lazy_images,
            notifications: NotificationWidget::new(),
            scroll,
            mobile_nav,
            smooth_scroll,
            theme_toggle,
            tracker,
            hidden: false,
            faults: 0,
        };

        let wiring = page.wiring();
        tracing::info!(
            "Page loaded: {} observed, {} lazy image(s), mobile nav {}, theme toggle {}",
            wiring.observed,
            wiring.lazy_images,
            if wiring.mobile_nav { "on" } else { "off" },
            if wiring.theme_toggle { "on" } else { "off" }
        );
        tracing::debug!("Service Worker support detected - ready for PWA implementation");

        page.check_observers();
        Ok(page)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    pub fn faults(&self) -> usize {
        self.faults
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_menu_open(&self) -> bool {
        self.mobile_nav.is_some_and(|nav| nav.is_open(&self.doc))
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notifications.current(&self.doc)
    }

    pub fn interactions(&self) -> &[Interaction] {
        self.tracker.interactions()
    }

    pub fn is_animated(&self, node: NodeId) -> bool {
        self.animations.is_animated(node)
    }

    /// Scheme on the root element, if the theme toggle set one
    pub fn color_scheme(&self) -> Option<ColorScheme> {
        self.theme_toggle.map(|_| theme::current_scheme(&self.doc))
    }

    /// Raw value of the root scheme attribute, as the stylesheet would see it
    pub fn color_scheme_attribute(&self) -> Option<String> {
        self.theme_toggle?;
        let root = self.doc.root();
        self.doc
            .element(root)
            .attribute(theme::SCHEME_ATTRIBUTE)
            .map(str::to_string)
    }

    pub fn back_to_top(&self) -> Option<NodeId> {
        self.scroll.back_to_top()
    }

    pub fn wiring(&self) -> Wiring {
        Wiring {
            mobile_nav: self.mobile_nav.is_some(),
            theme_toggle: self.theme_toggle.is_some(),
            observed: self.animation_observer.targets().len(),
            lazy_images: self.lazy_images.pending(),
        }
    }

    pub fn active_section(&self) -> Option<String> {
        scroll::active_section(&self.doc, self.viewport.scroll_y, self.layout.section_preamble)
            .ok()
            .flatten()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply a script event. Unresolvable targets are errors for the caller;
    /// faults inside listeners are absorbed and counted.
    pub fn dispatch(&mut self, event: &PageEvent) -> Result<()> {
        tracing::trace!("Dispatch {:?}", event);
        match event {
            PageEvent::Click { target, nth } => {
                let node = self.resolve(target, *nth)?;
                self.click(node);
            }
            PageEvent::Scroll { y } => self.scroll_to(*y),
            PageEvent::Resize { width, height } => self.resize(*width, *height),
            PageEvent::PointerEnter { target, nth } => {
                let node = self.resolve(target, *nth)?;
                self.pointer(node, true);
            }
            PageEvent::PointerLeave { target, nth } => {
                let node = self.resolve(target, *nth)?;
                self.pointer(node, false);
            }
            PageEvent::VisibilityChange { hidden } => self.set_hidden(*hidden),
            PageEvent::Wait { ms } => self.advance_by(Duration::from_millis(*ms)),
        }
        Ok(())
    }

    fn resolve(&self, selector: &str, nth: usize) -> Result<NodeId> {
        let matches = self
            .doc
            .select(selector)
            .with_context(|| format!("Bad event target '{}'", selector))?;
        matches
            .get(nth)
            .copied()
            .ok_or_else(|| anyhow!("No element #{} matches '{}'", nth, selector))
    }

    /// Click an element, running every interested listener in order
    pub fn click(&mut self, target: NodeId) {
        if let Some(nav) = self.mobile_nav {
            nav.on_click(&mut self.doc, target);
        }

        let destination =
            self.smooth_scroll
                .destination(&self.doc, target, self.layout.nav_offset);
        match destination {
            Ok(Some(y)) => self.scroll_to(y),
            Ok(None) => {}
            Err(e) => self.fault("smooth scroll", e),
        }

        if let Some(toggle) = self.theme_toggle {
            if toggle.is_hit(&self.doc, target) {
                let result = toggle.toggle(&mut self.doc, self.store.as_mut());
                if let Err(e) = result {
                    self.fault("theme toggle", e);
                }
            }
        }

        if let Some(button) = linkedin::button_for(&self.doc, target) {
            let label = self.doc.text_content(button);
            self.show_notification(linkedin::message_for(&label), Severity::Info);
        }

        if self.scroll.is_back_to_top(&self.doc, target) {
            self.scroll_to(0.0);
        }

        self.notifications
            .on_click(&mut self.doc, &mut self.scheduler, &self.timing, target);

        self.tracker.on_click(&self.doc, target);
    }

    /// Scroll the window, clamped to the scrollable range. Scroll listeners
    /// only run when the offset actually changes.
    pub fn scroll_to(&mut self, y: f64) {
        let y = y.clamp(0.0, self.viewport.max_scroll_y(&self.doc));
        if y == self.viewport.scroll_y {
            return;
        }
        self.viewport.scroll_y = y;

        let result = self.scroll.on_scroll(
            &mut self.doc,
            &mut self.scheduler,
            &self.viewport,
            &self.timing,
            &self.layout,
        );
        if let Err(e) = result {
            self.fault("scroll", e);
        }
        self.check_observers();
    }

    pub fn scroll_by(&mut self, dy: f64) {
        self.scroll_to(self.viewport.scroll_y + dy);
    }

    /// Resize the viewport. If the new size shortens the scrollable range
    /// the clamped offset is delivered as a scroll event.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
        tracing::debug!("Viewport resized to {}x{}", width, height);

        let max = self.viewport.max_scroll_y(&self.doc);
        if self.viewport.scroll_y > max {
            self.scroll_to(max);
        } else {
            self.check_observers();
        }
    }

    pub fn pointer(&mut self, target: NodeId, entered: bool) {
        NotificationWidget::on_hover(&mut self.doc, target, entered);
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
        if hidden {
            tracing::info!("Page hidden - optimizing performance");
        } else {
            tracing::info!("Page visible - resuming normal operations");
        }
    }

    pub fn show_notification(&mut self, message: &str, severity: Severity) -> NodeId {
        self.notifications.show(
            &mut self.doc,
            &mut self.scheduler,
            &self.timing,
            message,
            severity,
        )
    }

    /// Click the close button of the visible notification, if any
    pub fn close_notification(&mut self) {
        let close = self.notification().and_then(|n| {
            self.doc
                .find_within(n.node, &Selector::class("notification-close"))
        });
        if let Some(close) = close {
            self.click(close);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Time
    // ─────────────────────────────────────────────────────────────────────────

    pub fn advance_by(&mut self, delta: Duration) {
        let until = self.scheduler.now() + delta;
        self.advance_to(until);
    }

    /// Run every task due at or before `until`, in order, then move the clock there
    pub fn advance_to(&mut self, until: Duration) {
        while let Some(task) = self.scheduler.pop_due(until) {
            let name = task.name();
            if let Err(e) = self.run_task(task) {
                self.fault(name, e);
            }
        }
        self.scheduler.set_now(until);
    }

    fn run_task(&mut self, task: Task) -> Result<()> {
        match task {
            Task::SetWidth { node, width } => animate::run_set_width(&mut self.doc, node, &width),
            Task::CounterTick(counter) => {
                animate::run_counter_tick(&mut self.doc, &mut self.scheduler, &self.timing, counter)
            }
            Task::AddClass { node, class } => animate::run_add_class(&mut self.doc, node, class),
            Task::HeroReveal => {
                animate::run_hero_reveal(&self.doc, &mut self.scheduler, &self.timing)?
            }
            Task::RevealPass => {
                self.scroll.run_reveal_pass(&mut self.doc, &self.viewport)?;
            }
            Task::DismissNotification { node } => {
                notify::run_dismiss(&mut self.doc, &mut self.scheduler, &self.timing, node)
            }
            Task::RemoveNotification { node } => {
                notify::run_remove(&mut self.doc, &self.scheduler, node)
            }
        }
        Ok(())
    }

    /// Deliver observer records after a scroll, resize or load
    fn check_observers(&mut self) {
        for entry in self.animation_observer.take_records(&self.doc, &self.viewport) {
            self.animations
                .on_entry(&mut self.doc, &mut self.scheduler, &self.timing, &entry);
        }
        self.lazy_images.check(&mut self.doc, &self.viewport);
    }

    fn fault(&mut self, source: &str, error: anyhow::Error) {
        self.faults += 1;
        tracing::error!("An error occurred: {} ({:#})", source, error);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            time_ms: self.now().as_millis(),
            scroll_y: self.viewport.scroll_y,
            viewport: (self.viewport.width, self.viewport.height),
            color_scheme: self.color_scheme_attribute(),
            active_section: self.active_section(),
            notification: self.notification().map(|n| NotificationSnapshot {
                message: n.message.clone(),
                severity: n.severity,
                shown_at_ms: n.created_at.as_millis(),
            }),
            animated: self.animations.animated_count(),
            faults: self.faults,
            interactions: self.interactions().to_vec(),
            document: self.doc.snapshot(),
        }
    }
}

/// Apply a script to a page. Events whose target cannot be resolved are
/// skipped with a warning. Returns the number skipped.
pub fn replay(page: &mut Page, events: &[PageEvent]) -> usize {
    let mut skipped = 0;
    for (i, event) in events.iter().enumerate() {
        if let Err(e) = page.dispatch(event) {
            skipped += 1;
            tracing::warn!("Skipping event {} ({}): {:#}", i + 1, event.kind(), e);
        }
    }
    skipped
}

/// Maps wall-clock time onto the page's virtual clock for live use
pub struct LiveClock {
    started: Instant,
}

impl LiveClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Run everything that has come due since the last sync
    pub fn sync(&self, page: &mut Page) {
        page.advance_to(self.started.elapsed());
    }

    /// Wall-clock instant of the page's next timer
    pub fn next_deadline(&self, page: &Page) -> Option<Instant> {
        page.next_due().map(|due| self.started + due)
    }
}

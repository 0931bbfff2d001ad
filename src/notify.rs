//! Transient notification panel
//!
//! At most one notification is attached at a time. Showing a new one removes
//! any existing `.notification` first. A notification leaves either when its
//! close button is clicked or when the auto-dismiss timer fires; both play a
//! 300 ms exit animation before the element is removed. A removed panel's
//! elements go back to the document once none of its timers are pending.

use crate::config::Timing;
use crate::dom::{Document, NodeId, Selector};
use crate::scheduler::{Scheduler, Task};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const STYLE_ID: &str = "notification-styles";

const STYLESHEET: &str = "\
@keyframes slideInRight {
    from { transform: translateX(100%); opacity: 0; }
    to { transform: translateX(0); opacity: 1; }
}
@keyframes slideOutRight {
    from { transform: translateX(0); opacity: 1; }
    to { transform: translateX(100%); opacity: 0; }
}
.notification-content { display: flex; align-items: center; justify-content: space-between; gap: 1rem; }
.notification-message { flex: 1; line-height: 1.4; }
";

const ENTER_ANIMATION: &str = "slideInRight 0.3s ease";
const EXIT_ANIMATION: &str = "slideOutRight 0.3s ease";

/// Notification severity, which selects the panel colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Parse a severity name, falling back to `Info` for anything unknown
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "success" => Severity::Success,
            "warning" => Severity::Warning,
            "error" => Severity::Error,
            _ => Severity::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    /// CSS background (and border) color
    pub fn background(&self) -> &'static str {
        match self {
            Severity::Info => "var(--color-info)",
            Severity::Success => "var(--color-success)",
            Severity::Warning => "var(--color-warning)",
            Severity::Error => "var(--color-error)",
        }
    }

    /// CSS text color
    pub fn foreground(&self) -> &'static str {
        match self {
            Severity::Success => "var(--color-btn-primary-text)",
            _ => "var(--color-surface)",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The most recently shown notification
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub node: NodeId,
    pub message: String,
    pub severity: Severity,
    /// Virtual time the notification was shown
    pub created_at: Duration,
}

#[derive(Debug, Default)]
pub struct NotificationWidget {
    last: Option<Notification>,
}

impl NotificationWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the keyframes stylesheet into `<head>` unless already present
    pub fn install_styles(doc: &mut Document) {
        if doc.get_element_by_id(STYLE_ID).is_some() {
            return;
        }
        let style = doc.create_element("style");
        doc.element_mut(style).set_attribute("id", STYLE_ID);
        doc.element_mut(style).set_text(STYLESHEET);
        let head = doc.head();
        doc.append_child(head, style);
    }

    /// The visible notification, if one is still attached
    pub fn current(&self, doc: &Document) -> Option<&Notification> {
        self.last
            .as_ref()
            .filter(|n| doc.is_attached(n.node) && doc.element(n.node).has_class("notification"))
    }

    /// Replace any visible notification with a new one and arm its auto-dismiss
    pub fn show(
        &mut self,
        doc: &mut Document,
        scheduler: &mut Scheduler,
        timing: &Timing,
        message: &str,
        severity: Severity,
    ) -> NodeId {
        for existing in doc.query_all(&Selector::class("notification")) {
            doc.remove(existing);
        }

        let panel = doc.create_element("div");
        let content = doc.create_element("div");
        let text = doc.create_element("span");
        let close = doc.create_element("button");

        {
            let el = doc.element_mut(panel);
            el.add_class("notification");
            el.add_class(&format!("notification--{}", severity));
            el.set_style("position", "fixed");
            el.set_style("top", "100px");
            el.set_style("right", "20px");
            el.set_style("background", severity.background());
            el.set_style("border", format!("1px solid {}", severity.background()));
            el.set_style("color", severity.foreground());
            el.set_style("z-index", "3000");
            el.set_style("max-width", "400px");
            el.set_style("animation", ENTER_ANIMATION);
        }
        doc.element_mut(content).add_class("notification-content");
        {
            let el = doc.element_mut(text);
            el.add_class("notification-message");
            el.set_text(message);
        }
        {
            let el = doc.element_mut(close);
            el.add_class("notification-close");
            el.set_attribute("aria-label", "Close notification");
            el.set_text("×");
            el.set_style("opacity", "0.7");
            el.set_style("cursor", "pointer");
        }

        doc.append_child(panel, content);
        doc.append_child(content, text);
        doc.append_child(content, close);
        let body = doc.body();
        doc.append_child(body, panel);

        scheduler.set_timeout(
            timing.notification_duration(),
            Task::DismissNotification { node: panel },
        );

        tracing::debug!("Notification ({}): {}", severity, message);
        self.last = Some(Notification {
            node: panel,
            message: message.to_string(),
            severity,
            created_at: scheduler.now(),
        });
        panel
    }

    /// Handle a click on or inside a close button. Returns whether it was one.
    pub fn on_click(
        &self,
        doc: &mut Document,
        scheduler: &mut Scheduler,
        timing: &Timing,
        target: NodeId,
    ) -> bool {
        let Some(close) = doc.closest(target, &Selector::class("notification-close")) else {
            return false;
        };
        let Some(panel) = doc.closest(close, &Selector::class("notification")) else {
            return false;
        };
        begin_exit(doc, scheduler, timing, panel);
        true
    }

    /// Close-button hover feedback
    pub fn on_hover(doc: &mut Document, target: NodeId, entered: bool) {
        if !doc.element(target).has_class("notification-close") {
            return;
        }
        let opacity = if entered { "1" } else { "0.7" };
        doc.element_mut(target).set_style("opacity", opacity);
    }
}

/// Play the exit animation and schedule removal
fn begin_exit(doc: &mut Document, scheduler: &mut Scheduler, timing: &Timing, panel: NodeId) {
    doc.element_mut(panel).set_style("animation", EXIT_ANIMATION);
    scheduler.set_timeout(
        timing.notification_exit(),
        Task::RemoveNotification { node: panel },
    );
}

/// Auto-dismiss timer fired
pub fn run_dismiss(doc: &mut Document, scheduler: &mut Scheduler, timing: &Timing, panel: NodeId) {
    if doc.is_attached(panel) {
        begin_exit(doc, scheduler, timing, panel);
    } else {
        reclaim(doc, scheduler, panel);
    }
}

/// Exit animation finished
pub fn run_remove(doc: &mut Document, scheduler: &Scheduler, panel: NodeId) {
    if doc.is_attached(panel) {
        doc.remove(panel);
    }
    reclaim(doc, scheduler, panel);
}

/// Release a detached panel once no pending timer still names it
fn reclaim(doc: &mut Document, scheduler: &Scheduler, panel: NodeId) {
    if doc.is_attached(panel) || scheduler.has_pending(|task| task.node() == Some(panel)) {
        return;
    }
    doc.release(panel);
    tracing::trace!("Released notification {:?}", panel);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Harness {
        doc: Document,
        scheduler: Scheduler,
        timing: Timing,
        widget: NotificationWidget,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                doc: Document::new(),
                scheduler: Scheduler::new(),
                timing: Timing::default(),
                widget: NotificationWidget::new(),
            }
        }

        fn show(&mut self, message: &str) -> NodeId {
            self.widget.show(
                &mut self.doc,
                &mut self.scheduler,
                &self.timing,
                message,
                Severity::Info,
            )
        }

        fn advance(&mut self, ms: u64) {
            let until = self.scheduler.now() + Duration::from_millis(ms);
            while let Some(task) = self.scheduler.pop_due(until) {
                match task {
                    Task::DismissNotification { node } => {
                        run_dismiss(&mut self.doc, &mut self.scheduler, &self.timing, node)
                    }
                    Task::RemoveNotification { node } => {
                        run_remove(&mut self.doc, &self.scheduler, node)
                    }
                    other => panic!("unexpected task {:?}", other),
                }
            }
            self.scheduler.set_now(until);
        }

        fn attached(&self) -> Vec<NodeId> {
            self.doc.query_all(&Selector::class("notification"))
        }
    }

    #[test]
    fn test_show_builds_panel() {
        let mut h = Harness::new();
        let node = h.widget.show(
            &mut h.doc,
            &mut h.scheduler,
            &h.timing,
            "Saved",
            Severity::Success,
        );

        let el = h.doc.element(node);
        assert!(el.has_class("notification--success"));
        assert_eq!(el.style("background"), Some("var(--color-success)"));
        assert_eq!(el.style("color"), Some("var(--color-btn-primary-text)"));
        assert_eq!(el.style("animation"), Some(ENTER_ANIMATION));

        let message = h
            .doc
            .find_within(node, &Selector::class("notification-message"))
            .unwrap();
        assert_eq!(h.doc.text_content(message), "Saved");
        let close = h
            .doc
            .find_within(node, &Selector::class("notification-close"))
            .unwrap();
        assert_eq!(
            h.doc.element(close).attribute("aria-label"),
            Some("Close notification")
        );
    }

    #[test]
    fn test_only_latest_notification_remains() {
        let mut h = Harness::new();
        for i in 0..5 {
            h.show(&format!("message {}", i));
        }
        h.show("A");
        let b = h.show("B");
        assert_eq!(h.attached(), vec![b]);
        assert_eq!(h.widget.current(&h.doc).unwrap().message, "B");
    }

    #[test]
    fn test_markup_is_kept_as_text() {
        let mut h = Harness::new();
        let node = h.show("<b>bold</b>");
        assert_eq!(h.doc.text_content(node), "<b>bold</b>×");
        assert!(h.doc.select("b").unwrap().is_empty());
    }

    #[test]
    fn test_auto_dismiss_after_exit_transition() {
        let mut h = Harness::new();
        let node = h.show("hello");

        h.advance(5000);
        assert_eq!(h.attached(), vec![node]);
        assert_eq!(h.doc.element(node).style("animation"), Some(EXIT_ANIMATION));

        h.advance(299);
        assert_eq!(h.attached(), vec![node]);
        h.advance(1);
        assert!(h.attached().is_empty());
        assert!(h.widget.current(&h.doc).is_none());
    }

    #[test]
    fn test_close_click_removes_after_300ms() {
        let mut h = Harness::new();
        let node = h.show("hello");
        let close = h
            .doc
            .find_within(node, &Selector::class("notification-close"))
            .unwrap();

        h.advance(1000);
        assert!(h
            .widget
            .on_click(&mut h.doc, &mut h.scheduler, &h.timing, close));
        h.advance(300);
        assert!(h.attached().is_empty());

        // The stale auto-dismiss timer is a no-op
        h.advance(10_000);
        assert_eq!(h.scheduler.pending(), 0);
    }

    #[test]
    fn test_replaced_notification_timers_do_not_touch_new_one() {
        let mut h = Harness::new();
        h.show("first");
        h.advance(4000);
        let second = h.show("second");

        // First timer fires at 5000 against a detached element
        h.advance(1500);
        assert_eq!(h.attached(), vec![second]);
        assert_eq!(h.doc.element(second).style("animation"), Some(ENTER_ANIMATION));

        h.advance(3800);
        assert!(h.attached().is_empty());
    }

    #[test]
    fn test_expired_notifications_do_not_grow_document() {
        let mut h = Harness::new();
        h.show("warmup");
        h.advance(5300);
        let baseline = h.doc.node_count();

        for i in 0..50 {
            h.show(&format!("message {}", i));
            h.advance(5300);
        }
        assert!(h.attached().is_empty());
        assert_eq!(h.doc.node_count(), baseline);
    }

    #[test]
    fn test_replaced_notifications_are_released_after_their_timers() {
        let mut h = Harness::new();
        for i in 0..10 {
            h.show(&format!("burst {}", i));
        }
        // Replaced panels still have auto-dismiss timers pending
        assert_eq!(h.doc.node_count(), 3 + 10 * 4);

        h.advance(5300);
        assert_eq!(h.doc.node_count(), 3);
        assert_eq!(h.scheduler.pending(), 0);
    }

    #[test]
    fn test_reused_slots_ignore_old_timers() {
        let mut h = Harness::new();
        let first = h.show("first");
        let close = h
            .doc
            .find_within(first, &Selector::class("notification-close"))
            .unwrap();
        assert!(h
            .widget
            .on_click(&mut h.doc, &mut h.scheduler, &h.timing, close));

        // Removed at 300, but its auto-dismiss at 5000 keeps the slots reserved
        h.advance(300);
        let second = h.show("second");
        assert_ne!(second, first);

        // First auto-dismiss fires and releases its slots; the next panel reuses them
        h.advance(4800);
        let third = h.show("third");
        assert!(h.doc.node_count() <= 3 + 2 * 4);

        // Second's stale timer at 5300 leaves the third alone
        h.advance(1000);
        assert_eq!(h.attached(), vec![third]);
        assert_eq!(h.doc.element(third).style("animation"), Some(ENTER_ANIMATION));
        assert_eq!(h.widget.current(&h.doc).unwrap().message, "third");
    }

    #[test]
    fn test_close_hover() {
        let mut h = Harness::new();
        let node = h.show("hover");
        let close = h
            .doc
            .find_within(node, &Selector::class("notification-close"))
            .unwrap();
        NotificationWidget::on_hover(&mut h.doc, close, true);
        assert_eq!(h.doc.element(close).style("opacity"), Some("1"));
        NotificationWidget::on_hover(&mut h.doc, close, false);
        assert_eq!(h.doc.element(close).style("opacity"), Some("0.7"));
    }

    #[test]
    fn test_styles_installed_once() {
        let mut doc = Document::new();
        NotificationWidget::install_styles(&mut doc);
        NotificationWidget::install_styles(&mut doc);
        assert_eq!(doc.select("style#notification-styles").unwrap().len(), 1);
    }

    #[test]
    fn test_severity_parse_falls_back() {
        assert_eq!(Severity::parse("Warning"), Severity::Warning);
        assert_eq!(Severity::parse("critical"), Severity::Info);
        assert_eq!(Severity::default(), Severity::Info);
    }
}

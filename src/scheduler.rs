//! Deferred task queue on a virtual clock
//!
//! The page never blocks: every delay is a task parked here with a due time.
//! Tasks fire in (due time, creation order) order. The clock only moves
//! when the runtime advances it, so behavior is identical under the
//! interactive preview and in tests.

use crate::animate::Counter;
use crate::dom::NodeId;
use std::collections::BTreeMap;
use std::time::Duration;

/// Handle returned by [`Scheduler::set_timeout`], used to cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Work that runs when a timer fires
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Set a progress bar's inline width (`"85%"`)
    SetWidth { node: NodeId, width: String },
    /// Advance a stat counter by one step
    CounterTick(Counter),
    /// Add a class, used by the staggered hero reveal
    AddClass { node: NodeId, class: &'static str },
    /// Start the hero reveal sequence
    HeroReveal,
    /// Debounced scroll-driven reveal check
    RevealPass,
    /// Auto-dismiss a notification (plays the exit transition)
    DismissNotification { node: NodeId },
    /// Remove a notification once its exit transition has played
    RemoveNotification { node: NodeId },
}

impl Task {
    /// Element the task will act on, if any
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Task::SetWidth { node, .. }
            | Task::AddClass { node, .. }
            | Task::DismissNotification { node }
            | Task::RemoveNotification { node } => Some(*node),
            Task::CounterTick(counter) => Some(counter.node),
            Task::HeroReveal | Task::RevealPass => None,
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Task::SetWidth { .. } => "set-width",
            Task::CounterTick(_) => "counter-tick",
            Task::AddClass { .. } => "add-class",
            Task::HeroReveal => "hero-reveal",
            Task::RevealPass => "reveal-pass",
            Task::DismissNotification { .. } => "dismiss-notification",
            Task::RemoveNotification { .. } => "remove-notification",
        }
    }
}

/// Single-threaded timer queue
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    /// Keyed by (due, id) so iteration order is firing order
    timers: BTreeMap<(Duration, TimerId), Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since page load
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Park `task` to run `delay` from now
    pub fn set_timeout(&mut self, delay: Duration, task: Task) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.insert((self.now + delay, id), task);
        id
    }

    /// Cancel a pending timer. Unknown or already-fired ids are ignored.
    pub fn clear_timeout(&mut self, id: TimerId) {
        self.timers.retain(|&(_, timer), _| timer != id);
    }

    /// Due time of the earliest pending task
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.keys().next().map(|&(due, _)| due)
    }

    /// Pop the earliest task due at or before `until`, moving the clock to
    /// its due time. Returns `None` once nothing else is due.
    pub fn pop_due(&mut self, until: Duration) -> Option<Task> {
        let (&key, _) = self.timers.iter().next()?;
        if key.0 > until {
            return None;
        }
        let task = self.timers.remove(&key)?;
        self.now = self.now.max(key.0);
        Some(task)
    }

    /// Move the clock forward without running anything. Never goes back.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Whether any pending task matches `pred`
    pub fn has_pending(&self, pred: impl Fn(&Task) -> bool) -> bool {
        self.timers.values().any(pred)
    }
}

//! LinkedIn call-to-action buttons
//!
//! The page has no real LinkedIn integration; each button explains what it
//! would do through an info notification.

use crate::dom::{Document, NodeId, Selector};

pub const CONNECT_MESSAGE: &str = "Connection request would be sent on the real LinkedIn platform!";
pub const MESSAGE_MESSAGE: &str = "This would open LinkedIn messaging in the real platform!";
pub const GENERIC_MESSAGE: &str = "Additional LinkedIn actions would be available here!";

/// The `.linkedin-btn` a click landed on, if any
pub fn button_for(doc: &Document, target: NodeId) -> Option<NodeId> {
    doc.closest(target, &Selector::class("linkedin-btn"))
}

/// Notification text for a button, chosen by its lower-cased label
pub fn message_for(label: &str) -> &'static str {
    let label = label.to_lowercase();
    if label.contains("connect") {
        CONNECT_MESSAGE
    } else if label.contains("message") {
        MESSAGE_MESSAGE
    } else {
        GENERIC_MESSAGE
    }
}

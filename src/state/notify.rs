/// Notification sink for short user-facing status messages
///
/// Messages are keyed by an operation id: a new message for the same
/// operation replaces the previous one (a "loading" toast turning into
/// a "success" toast, for example).

use std::collections::VecDeque;

use tracing::{error, info};

/// Operation id of classification confirmations
pub const OP_CLASSIFY: &str = "classify";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub op: String,
    pub level: Level,
    pub message: String,
}

/// Anything that can receive fire-and-forget status messages
pub trait Notifier {
    fn notify(&mut self, op: &str, level: Level, message: String);
}

/// Keeps the most recent notifications for display
#[derive(Debug, Default)]
pub struct NotificationCenter {
    entries: VecDeque<Notification>,
}

impl NotificationCenter {
    /// How many toasts stay visible at once
    pub const CAPACITY: usize = 5;

    /// Newest first
    pub fn entries(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.entries.front()
    }

    pub fn dismiss(&mut self, op: &str) {
        self.entries.retain(|entry| entry.op != op);
    }
}

impl Notifier for NotificationCenter {
    fn notify(&mut self, op: &str, level: Level, message: String) {
        match level {
            Level::Error => error!(op, %message, "notification"),
            _ => info!(op, ?level, %message, "notification"),
        }

        self.entries.retain(|entry| entry.op != op);
        self.entries.push_front(Notification {
            op: op.to_string(),
            level,
            message,
        });
        self.entries.truncate(Self::CAPACITY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_op_replaces_previous_message() {
        let mut center = NotificationCenter::default();
        center.notify("pdf-gen", Level::Loading, "Generating...".into());
        center.notify("pdf-gen", Level::Success, "Done".into());

        assert_eq!(center.entries().count(), 1);
        let latest = center.latest().unwrap();
        assert_eq!(latest.level, Level::Success);
        assert_eq!(latest.message, "Done");
    }

    #[test]
    fn test_capacity_keeps_newest() {
        let mut center = NotificationCenter::default();
        for i in 0..8 {
            center.notify(&format!("op-{i}"), Level::Success, format!("message {i}"));
        }

        assert_eq!(center.entries().count(), NotificationCenter::CAPACITY);
        assert_eq!(center.latest().unwrap().op, "op-7");
        assert!(center.entries().all(|n| n.op != "op-0"));
    }

    #[test]
    fn test_dismiss() {
        let mut center = NotificationCenter::default();
        center.notify("a", Level::Success, "one".into());
        center.notify("b", Level::Error, "two".into());

        center.dismiss("b");

        assert_eq!(center.latest().map(|n| n.op.as_str()), Some("a"));
    }
}

use std::time::Duration;

/// How long a notification stays on screen before it expires on its own.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(7);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Loading,
    Info,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub text: String,
}

/// Queue of currently visible notifications.
///
/// The queue is the only writer of its entries; everything else goes through
/// `push` and `dismiss`. Expiry is driven externally (the app schedules a
/// timer per entry) so the queue itself stays synchronous and testable.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    entries: Vec<Notification>,
    next_id: u64,
}

impl NotificationQueue {
    /// Appends a notification and returns its id for later dismissal.
    pub fn push(&mut self, kind: NotificationKind, text: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Notification {
            id,
            kind,
            text: text.into(),
        });
        id
    }

    /// Removes the notification with the given id. Returns whether it was
    /// still visible. Dismissing twice is harmless.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

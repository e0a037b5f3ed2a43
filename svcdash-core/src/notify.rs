//! Transient operator notifications
//!
//! The channel holds at most one notification. Publishing replaces whatever is
//! shown and restarts the auto-dismiss deadline; dismissing clears both.

use std::time::Duration;

use tokio::time::Instant;

pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

#[derive(Debug)]
struct Live {
    notification: Notification,
    deadline: Instant,
}

#[derive(Debug)]
pub struct NotificationChannel {
    ttl: Duration,
    live: Option<Live>,
}

impl NotificationChannel {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, live: None }
    }

    /// Show `notification`, superseding the current one and its deadline.
    pub fn publish(&mut self, notification: Notification, now: Instant) {
        self.live = Some(Live {
            notification,
            deadline: now + self.ttl,
        });
    }

    /// Clear immediately; returns what was shown, if anything.
    pub fn dismiss(&mut self) -> Option<Notification> {
        self.live.take().map(|live| live.notification)
    }

    /// Clear the notification if its deadline has passed.
    pub fn expire(&mut self, now: Instant) -> Option<Notification> {
        match &self.live {
            Some(live) if live.deadline <= now => self.dismiss(),
            _ => None,
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.live.as_ref().map(|live| &live.notification)
    }

    /// Pending auto-dismiss deadline, if a notification is shown
    pub fn deadline(&self) -> Option<Instant> {
        self.live.as_ref().map(|live| live.deadline)
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(NOTIFICATION_TTL)
    }
}

//! Transient notices shown over the widget ("Copied!", copy failures).

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

impl NoticeKind {
    /// CSS modifier class for this kind.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

/// A single notice.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    pub created_at: Instant,
    /// How long the notice stays visible.
    pub duration: Duration,
}

impl Notice {
    pub fn new(message: impl Into<String>, kind: NoticeKind, duration: Duration) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at: Instant::now(),
            duration,
        }
    }

    /// Returns whether the notice has expired at `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.duration
    }
}

/// Active notices, oldest first.
#[derive(Debug)]
pub struct Notifications {
    notices: Vec<Notice>,
    duration: Duration,
    max_visible: usize,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

impl Notifications {
    /// Creates an empty list whose notices last `duration`.
    pub fn new(duration: Duration) -> Self {
        Self {
            notices: Vec::new(),
            duration,
            max_visible: 3,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, kind: NoticeKind) {
        self.notices.push(Notice::new(message, kind, self.duration));
        while self.notices.len() > self.max_visible {
            self.notices.remove(0);
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, NoticeKind::Success);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, NoticeKind::Error);
    }

    /// Drops notices that have expired at `now`.
    pub fn prune_at(&mut self, now: Instant) {
        self.notices.retain(|n| !n.is_expired_at(now));
    }

    pub fn prune(&mut self) {
        self.prune_at(Instant::now());
    }

    pub fn active(&self) -> &[Notice] {
        &self.notices
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }
}

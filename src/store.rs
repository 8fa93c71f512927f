//! Application state container shared by all pages.
//!
//! A single [`Store`] is built in `main` and handed to every controller that
//! needs the global loading indicator or the notification sink. There is no
//! module-level state: cloning a `Store` clones a handle to the same channels.
use std::fmt;
use tokio::sync::{broadcast, watch};

/// Capacity of the notice channel; slow subscribers lose the oldest notices.
const NOTICE_CAPACITY: usize = 64;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A toast-style message for the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Info => write!(f, "{}", self.message),
            NoticeLevel::Error => write!(f, "Hata: {}", self.message),
        }
    }
}

/// Observable application state: in-flight request count and notices.
#[derive(Clone)]
pub struct Store {
    loading: watch::Sender<usize>,
    notices: broadcast::Sender<Notice>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        let (loading, _) = watch::channel(0);
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self { loading, notices }
    }

    /// Mark one operation as in flight until the returned guard is dropped.
    pub fn track_loading(&self) -> LoadingGuard {
        self.loading.send_modify(|n| *n += 1);
        LoadingGuard {
            loading: self.loading.clone(),
        }
    }

    /// True while at least one tracked operation is in flight.
    pub fn is_loading(&self) -> bool {
        *self.loading.borrow() > 0
    }

    /// Receiver for the in-flight count; any value above zero means "show the
    /// global spinner".
    pub fn subscribe_loading(&self) -> watch::Receiver<usize> {
        self.loading.subscribe()
    }

    /// Publish a notice. Dropped silently if nobody is listening.
    pub fn notify(&self, notice: Notice) {
        tracing::debug!(level = ?notice.level, message = %notice.message, "Notice published");
        let _ = self.notices.send(notice);
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }
}

/// Decrements the in-flight count on drop.
pub struct LoadingGuard {
    loading: watch::Sender<usize>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.loading.send_modify(|n| *n = n.saturating_sub(1));
    }
}

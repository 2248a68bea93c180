//! Transient user-facing messages.

use chrono::{DateTime, Utc};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Shows short-lived messages to the end user.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Toasts waiting to be rendered by the UI layer.
#[derive(Default)]
pub struct ToastQueue {
    pending: Mutex<Vec<Toast>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&self, message: &str) {
        self.push(ToastLevel::Info, message);
    }

    /// Take every pending toast, oldest first.
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, level: ToastLevel, message: &str) {
        debug!(
            event_name = "notify.toast",
            event_domain = "notify",
            level = ?level,
            toast = message,
            "queued toast"
        );
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Toast {
                level,
                message: message.to_string(),
                created_at: Utc::now(),
            });
    }
}

impl Notifier for ToastQueue {
    fn error(&self, message: &str) {
        self.push(ToastLevel::Error, message);
    }
}

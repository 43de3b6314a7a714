use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

/// How long a notification stays visible.
pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => f.write_str("success"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
    pub visible: bool,
}

/// Single-slot toast. A new message replaces the current one and restarts
/// the hide window; there is no queue. Visibility is decided when the slot
/// is read, so showing a toast never needs a running executor.
#[derive(Clone)]
pub struct Notifier {
    slot: Arc<Mutex<Option<Shown>>>,
    timeout: Duration,
}

#[derive(Debug, Clone)]
struct Shown {
    notification: Notification,
    hide_at: Instant,
}

impl Shown {
    fn read(&self) -> Notification {
        Notification {
            visible: Instant::now() < self.hide_at,
            ..self.notification.clone()
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_timeout(NOTIFICATION_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            timeout,
        }
    }

    /// Shows `message` until `timeout` has elapsed or another message replaces it.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
            visible: true,
        };
        let id = notification.id;
        tracing::debug!("notify [{}] {}", severity, notification.message);
        *lock(&self.slot) = Some(Shown {
            notification,
            hide_at: Instant::now() + self.timeout,
        });
        id
    }

    /// Last notification shown, hidden or not.
    pub fn current(&self) -> Option<Notification> {
        lock(&self.slot).as_ref().map(Shown::read)
    }

    pub fn visible(&self) -> Option<Notification> {
        self.current().filter(|n| n.visible)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

//! Transient user-visible notifications

use tokio::sync::broadcast::{self, Receiver, Sender};

/// Channel capacity for toast broadcasts
const TOAST_CAPACITY: usize = 20;

/// A failure the user should see briefly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
}

impl Toast {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fan-out of toasts to whatever presentation layer is listening
#[derive(Debug, Clone)]
pub struct ToastBroadcast {
    tx: Sender<Toast>,
}

impl ToastBroadcast {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(TOAST_CAPACITY);
        Self { tx }
    }

    pub fn send(&self, toast: Toast) {
        // Ignore send errors (no receivers)
        let _ = self.tx.send(toast);
    }

    pub fn subscribe(&self) -> Receiver<Toast> {
        self.tx.subscribe()
    }
}

impl Default for ToastBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

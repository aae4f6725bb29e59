//! Toast notifications
//!
//! The host shell renders toasts; this module only carries them there.
//! The notifier is an explicit handle passed to the controller and item
//! views, not an ambient singleton.

use tokio::sync::mpsc;
use tracing::debug;

/// Severity of a toast notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStatus {
    Success,
    Error,
}

/// A user-visible notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub status: ToastStatus,
    pub title: String,
    pub description: Option<String>,
    pub closable: bool,
}

impl Toast {
    pub fn success(title: &str, description: &str) -> Self {
        Self {
            status: ToastStatus::Success,
            title: title.to_string(),
            description: Some(description.to_string()),
            closable: false,
        }
    }

    pub fn error(title: &str, description: &str) -> Self {
        Self {
            status: ToastStatus::Error,
            title: title.to_string(),
            description: Some(description.to_string()),
            closable: true,
        }
    }
}

/// Handle for pushing notifications to the host shell
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Toast>,
}

impl Notifier {
    /// Create a notifier and the receiving end the host renders from
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Toast>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Push a toast; pushes after the host has detached are dropped
    pub fn push(&self, toast: Toast) {
        debug!("Toast [{:?}] {}", toast.status, toast.title);
        let _ = self.tx.send(toast);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pushed_toasts_reach_the_receiver() {
        let (notifier, mut rx) = Notifier::channel();

        notifier.push(Toast::success("Success!", "done"));
        let toast = rx.try_recv().unwrap();
        assert_eq!(toast.status, ToastStatus::Success);
        assert!(!toast.closable);

        notifier.push(Toast::error("Failed", "not done"));
        let toast = rx.try_recv().unwrap();
        assert_eq!(toast.status, ToastStatus::Error);
        assert!(toast.closable);
    }

    #[test]
    fn test_push_after_receiver_dropped_is_silent() {
        let (notifier, rx) = Notifier::channel();
        drop(rx);
        notifier.push(Toast::success("Success!", "nobody listens"));
    }
}

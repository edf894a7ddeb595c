//! User-facing transient notifications.
//!
//! Remote failures are surfaced to the user as toasts rather than retried.
//! The dispatcher is an explicitly constructed service handed to the stores
//! by reference, never a process-wide global; hosts plug in their own
//! implementation to render actual UI.

use std::sync::Arc;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational, e.g. "added to cart".
    Info,
    /// Transient failure the user may want to retry, e.g. a failed fetch.
    Warning,
}

/// Sink for transient user notifications.
pub trait Notifier: Send + Sync {
    /// Deliver a notification to the user.
    fn notify(&self, severity: Severity, message: &str);
}

/// Shared handle to a notifier.
pub type SharedNotifier = Arc<dyn Notifier>;

/// Default notifier that forwards to `tracing`.
///
/// Useful for headless hosts and tests; real apps install a UI-backed one.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => tracing::info!(target: "souq::notify", "{message}"),
            Severity::Warning => tracing::warn!(target: "souq::notify", "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Collects notifications for assertions.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub messages: Mutex<Vec<(Severity, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, severity: Severity, message: &str) {
            self.messages
                .lock()
                .expect("notifier mutex poisoned")
                .push((severity, message.to_string()));
        }
    }

    #[test]
    fn test_recording_notifier_captures() {
        let notifier = RecordingNotifier::default();
        notifier.notify(Severity::Warning, "fetch failed");
        let messages = notifier.messages.lock().expect("notifier mutex poisoned");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].1, "fetch failed");
    }
}

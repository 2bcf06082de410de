//! Notification sender used by the reminder job.

use async_trait::async_trait;
use tracing::info;

/// Delivers a message to a user. Returns whether delivery succeeded.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `body` to `recipient_email` with `subject`.
    async fn send(&self, recipient_email: &str, subject: &str, body: &str) -> bool;
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient_email: &str, subject: &str, body: &str) -> bool {
        info!(to = recipient_email, subject, "{}", body);
        true
    }
}

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// A failed notification delivery.
///
/// Never fatal: the operation that triggered the notification has already
/// committed by the time delivery is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// Opaque outbound notification capability (email in production).
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers a message to `to`.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// A notifier that writes deliveries to the log instead of a wire.
///
/// Used by the console binary; real deployments plug in an SMTP-backed
/// implementation.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        info!(%to, %subject, %body, "outbound notification");
        Ok(())
    }
}

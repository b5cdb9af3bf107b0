//! Push notification dispatch.
//!
//! Notifications are strictly best-effort: a failed dispatch is logged by
//! the caller and never rolls back or fails the owning operation.

pub mod errors;
pub mod gateway;

pub use errors::{NotifyError, NotifyResult};
pub use gateway::{PushConfig, PushGateway};

use async_trait::async_trait;

/// Fire-and-forget notification dispatch capability.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `message` to the devices behind `tokens`.
    async fn send(&self, tokens: &[String], message: &str) -> NotifyResult<()>;
}

/// Notifier that drops every message. Used in tests and when no push
/// gateway is configured.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, _tokens: &[String], _message: &str) -> NotifyResult<()> {
        Ok(())
    }
}

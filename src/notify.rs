//! Notification capability
//!
//! Strategies and the weight engine emit advisory progress messages through
//! an injected [`Notifier`]. The capability is optional by construction:
//! wiring in [`NoopNotifier`] must not change any computed result.

use async_trait::async_trait;
use tracing::info;

/// Advisory message sink
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str);
}

/// Discards every message
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _text: &str) {}
}

/// Forwards messages to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, text: &str) {
        info!(target: "notify", "{}", text);
    }
}

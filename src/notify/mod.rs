// =============================================================================
// Notification Module
// =============================================================================
//
// Delivery is fire-and-forget from the core's point of view: the orchestrator
// logs a failed send and moves on. A lost message never rolls back a stage
// transition — the decision and its notification are not linked.

use anyhow::Result;
use async_trait::async_trait;

pub mod telegram;

pub use telegram::TelegramClient;

/// Outbound channel to the human operator.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a text message (HTML formatting allowed).
    async fn send_text(&self, message: &str) -> Result<()>;

    /// Deliver an image with a caption.
    async fn send_photo(&self, caption: &str, image: Vec<u8>) -> Result<()>;
}

//! Notifier trait and error types
//!
//! This module defines the interface a delivery channel has to provide.
//! Batching and pacing live in the dispatcher, so implementations only
//! need to send one message or one media group at a time.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while delivering a message
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {description}")]
    Api { status: u16, description: String },
}

/// Result type for delivery operations
pub type NotifyResult<T> = Result<T, NotifyError>;

/// A channel that can deliver rendered listings to chats
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends a plain HTML text message
    async fn send_text(&self, chat_id: i64, text: &str) -> NotifyResult<()>;

    /// Sends up to ten images as one group, optionally captioned
    ///
    /// The caption, when present, is shown with the first image.
    async fn send_media_group(
        &self,
        chat_id: i64,
        image_urls: &[String],
        caption: Option<&str>,
    ) -> NotifyResult<()>;
}

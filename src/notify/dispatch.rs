//! Listing delivery: image batching and pacing
//!
//! Telegram accepts at most ten images per media group and limits captions
//! to 1024 characters. The dispatcher splits a listing into as many groups
//! as needed, captions only the first one, and waits between groups so a
//! listing with many photos does not trip the channel's flood control.

use crate::listing::Listing;
use crate::notify::traits::{Notifier, NotifyResult};
use std::slice::Chunks;
use std::sync::Arc;
use std::time::Duration;

/// Largest number of images sent in one group
pub const MAX_MEDIA_GROUP_SIZE: usize = 10;

/// Longest caption, in characters, a media message may carry
pub const MAX_CAPTION_LENGTH: usize = 1024;

/// Splits image URLs into sendable groups, preserving order
pub fn media_batches(image_urls: &[String]) -> Chunks<'_, String> {
    image_urls.chunks(MAX_MEDIA_GROUP_SIZE)
}

/// Removes markup the Bot API rejects in HTML parse mode
pub fn prepare_caption(text: &str) -> String {
    text.replace("<br>", "")
}

/// Delivers rendered listings through a [`Notifier`]
#[derive(Clone)]
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    batch_pause: Duration,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, batch_pause: Duration) -> Self {
        Self {
            notifier,
            batch_pause,
        }
    }

    /// Renders and sends one listing to one chat
    pub async fn deliver(&self, chat_id: i64, listing: &Listing) -> NotifyResult<()> {
        let message = prepare_caption(&listing.to_display_string());
        self.send(chat_id, &message, &listing.image_urls).await
    }

    /// Sends a message with its images, batching and pacing as needed
    ///
    /// Without images the message goes out as text. When it is too long to
    /// be a caption it is sent as text first and the images follow
    /// uncaptioned.
    pub async fn send(
        &self,
        chat_id: i64,
        message: &str,
        image_urls: &[String],
    ) -> NotifyResult<()> {
        if image_urls.is_empty() {
            return self.notifier.send_text(chat_id, message).await;
        }

        let mut caption = Some(message);
        if message.chars().count() > MAX_CAPTION_LENGTH {
            self.notifier.send_text(chat_id, message).await?;
            caption = None;
        }

        for (index, batch) in media_batches(image_urls).enumerate() {
            if index > 0 && !self.batch_pause.is_zero() {
                tokio::time::sleep(self.batch_pause).await;
            }
            self.notifier
                .send_media_group(chat_id, batch, caption.take())
                .await?;
        }

        Ok(())
    }
}

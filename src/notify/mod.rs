//! Notification delivery
//!
//! This module handles:
//! - The [`Notifier`] interface for delivery channels
//! - A Telegram Bot API implementation
//! - Splitting listings into image groups and pacing them

mod dispatch;
mod telegram;
mod traits;

pub use dispatch::{
    media_batches, prepare_caption, Dispatcher, MAX_CAPTION_LENGTH, MAX_MEDIA_GROUP_SIZE,
};
pub use telegram::TelegramNotifier;
pub use traits::{Notifier, NotifyError, NotifyResult};

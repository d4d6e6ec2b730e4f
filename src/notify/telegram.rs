//! Telegram Bot API notifier
//!
//! Uses three Bot API methods, all with `parse_mode = HTML`:
//! - `sendMessage` for listings without images
//! - `sendPhoto` for single-image groups (media groups need 2+ items)
//! - `sendMediaGroup` for everything else

use crate::notify::traits::{Notifier, NotifyError, NotifyResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// [`Notifier`] posting to the Telegram Bot API
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
}

#[derive(Debug, Serialize)]
struct InputMediaPhoto<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    /// Creates a notifier for the bot identified by `token`
    ///
    /// `api_base` is normally `https://api.telegram.org`.
    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> NotifyResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call(&self, method: &str, body: serde_json::Value) -> NotifyResult<()> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let parsed: ApiResponse = response.json().await.unwrap_or_default();

        if status.is_success() && parsed.ok {
            return Ok(());
        }

        Err(NotifyError::Api {
            status: status.as_u16(),
            description: parsed
                .description
                .unwrap_or_else(|| "no description".to_string()),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, chat_id: i64, text: &str) -> NotifyResult<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        });
        self.call("sendMessage", body).await
    }

    async fn send_media_group(
        &self,
        chat_id: i64,
        image_urls: &[String],
        caption: Option<&str>,
    ) -> NotifyResult<()> {
        match image_urls {
            [] => match caption {
                Some(text) => self.send_text(chat_id, text).await,
                None => Ok(()),
            },
            [photo] => {
                let mut body = serde_json::json!({
                    "chat_id": chat_id,
                    "photo": photo,
                });
                if let Some(text) = caption {
                    body["caption"] = text.into();
                    body["parse_mode"] = "HTML".into();
                }
                self.call("sendPhoto", body).await
            }
            _ => {
                let media: Vec<InputMediaPhoto<'_>> = image_urls
                    .iter()
                    .enumerate()
                    .map(|(index, url)| {
                        let caption = if index == 0 { caption } else { None };
                        InputMediaPhoto {
                            kind: "photo",
                            media: url,
                            caption,
                            parse_mode: caption.map(|_| "HTML"),
                        }
                    })
                    .collect();

                let body = serde_json::json!({
                    "chat_id": chat_id,
                    "media": media,
                });
                self.call("sendMediaGroup", body).await
            }
        }
    }
}

//! Telegram Bot API client
//!
//! The remote-control channel: long-polls `getUpdates` for owner commands
//! and pushes status reports with `sendMessage`.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::{Error, Result};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Long-poll timeout passed to getUpdates, in seconds.
const POLL_TIMEOUT_SECS: u64 = 50;

pub struct TelegramClient {
    client: Client,
    token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub text: Option<String>,
    pub chat: Chat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramClient {
    pub fn new(token: String) -> Result<Self> {
        // The HTTP timeout has to outlive the long poll.
        let client = Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 20))
            .build()?;

        Ok(Self { client, token })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", TELEGRAM_API_BASE, self.token, method)
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url("sendMessage"))
            .json(&serde_json::json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await?;

        let body: ApiResponse<serde_json::Value> = response.json().await?;
        if !body.ok {
            return Err(Error::Telegram(
                body.description
                    .unwrap_or_else(|| "sendMessage failed".into()),
            ));
        }
        Ok(())
    }

    /// Long-polls for updates past `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let response = self
            .client
            .get(self.url("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", POLL_TIMEOUT_SECS.to_string()),
            ])
            .send()
            .await?;

        let body: ApiResponse<Vec<Update>> = response.json().await?;
        if !body.ok {
            return Err(Error::Telegram(
                body.description
                    .unwrap_or_else(|| "getUpdates failed".into()),
            ));
        }
        Ok(body.result.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_updates() {
        let json = r#"{
            "ok": true,
            "result": [{
                "update_id": 7001,
                "message": {
                    "message_id": 15,
                    "chat": {"id": 42, "type": "private"},
                    "text": "set_level 12"
                }
            }]
        }"#;

        let body: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        assert!(body.ok);
        let updates = body.result.unwrap();
        assert_eq!(updates[0].update_id, 7001);
        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.text.as_deref(), Some("set_level 12"));
    }

    #[test]
    fn error_response_carries_description() {
        let json = r#"{"ok": false, "description": "Unauthorized"}"#;
        let body: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        assert!(!body.ok);
        assert_eq!(body.description.as_deref(), Some("Unauthorized"));
    }
}

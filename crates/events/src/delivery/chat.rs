//! Slack-compatible incoming-webhook delivery.

use async_trait::async_trait;

use super::{http_client, post_json, ChatSender, DeliveryError, HttpDeliveryError};

/// Posts `{"text": ...}` to an incoming-webhook URL.
pub struct SlackChatSender {
    client: reqwest::Client,
}

impl SlackChatSender {
    pub fn new() -> Result<Self, HttpDeliveryError> {
        Ok(Self {
            client: http_client()?,
        })
    }
}

#[async_trait]
impl ChatSender for SlackChatSender {
    async fn send_chat_message(&self, webhook_url: &str, text: &str) -> Result<(), DeliveryError> {
        post_json(&self.client, webhook_url, &serde_json::json!({ "text": text })).await
    }
}

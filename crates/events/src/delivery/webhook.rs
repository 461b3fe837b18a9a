//! Generic JSON webhook delivery.
//!
//! The dispatcher builds the body (`event`, `rendered_subject`,
//! `rendered_body`); this sender only POSTs it and checks the status.

use async_trait::async_trait;

use super::{http_client, post_json, DeliveryError, HttpDeliveryError, WebhookSender};

pub struct HttpWebhookSender {
    client: reqwest::Client,
}

impl HttpWebhookSender {
    pub fn new() -> Result<Self, HttpDeliveryError> {
        Ok(Self {
            client: http_client()?,
        })
    }
}

#[async_trait]
impl WebhookSender for HttpWebhookSender {
    async fn send_webhook(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<(), DeliveryError> {
        post_json(&self.client, url, payload).await
    }
}

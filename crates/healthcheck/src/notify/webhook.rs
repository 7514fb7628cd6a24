use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;
use tracing::{debug, warn};

use super::{Delivery, Notifier};
use crate::sink::EventSink;
use crate::types::AlertEvent;
use crate::WEBHOOK_TIMEOUT_SECS;

/// Chat webhook channel, posts `{"text": message}`
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
    sink: Arc<EventSink>,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, sink: Arc<EventSink>) -> reqwest::Result<Self> {
        let client =
            reqwest::Client::builder().timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECS)).build()?;

        Ok(Self { url: url.into(), client, sink })
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, alert: &AlertEvent) -> Delivery {
        let payload = json!({ "text": alert.message });

        match self.client.post(&self.url).json(&payload).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                debug!(endpoint = %alert.endpoint, "webhook alert delivered");
                Delivery::Sent
            }
            Ok(response) => {
                let reason = format!("webhook returned status {}", response.status().as_u16());
                warn!(endpoint = %alert.endpoint, "{reason}");
                self.sink.error(format_args!("webhook send failed: {reason}"));
                Delivery::failed(reason)
            }
            Err(e) => {
                let reason = format!("{:#}", anyhow::Error::new(e));
                warn!(endpoint = %alert.endpoint, "webhook alert failed: {reason}");
                self.sink.error(format_args!("webhook send failed: {reason}"));
                Delivery::failed(reason)
            }
        }
    }
}

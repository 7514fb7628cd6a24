use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info};

use crate::config::Config;
use crate::notify::{Delivery, EmailNotifier, Notifier, WebhookNotifier};
use crate::sink::EventSink;
use crate::types::{AlertEvent, CheckResult};

/// Decides whether a result raises an alert and fans it out to every enabled channel
pub struct AlertDispatcher {
    sink: Arc<EventSink>,
    channels: Vec<Arc<dyn Notifier>>,
}

impl AlertDispatcher {
    pub fn new(sink: Arc<EventSink>, channels: Vec<Arc<dyn Notifier>>) -> Self {
        Self { sink, channels }
    }

    /// Enable the webhook channel iff a URL is set and email iff a recipient is set
    pub fn from_config(config: &Config, sink: Arc<EventSink>) -> reqwest::Result<Self> {
        let mut channels: Vec<Arc<dyn Notifier>> = Vec::new();

        if let Some(url) = &config.webhook_url {
            channels.push(Arc::new(WebhookNotifier::new(url.clone(), sink.clone())?));
        }

        if let Some(to) = &config.email.to {
            channels.push(Arc::new(EmailNotifier::new(
                to.clone(),
                config.email.from.clone(),
                config.email.smtp.clone(),
                sink.clone(),
            )));
        }

        info!(
            channels = ?channels.iter().map(|channel| channel.name()).collect::<Vec<_>>(),
            "alert channels configured"
        );

        Ok(Self::new(sink, channels))
    }

    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|channel| channel.name())
    }

    /// Alert on a down result; up results are ignored
    ///
    /// Returns the per-channel outcomes, empty when nothing was dispatched.
    pub async fn dispatch(&self, result: &CheckResult) -> Vec<Delivery> {
        let Some(alert) = AlertEvent::from_result(result) else {
            return Vec::new();
        };

        self.sink.alert(&alert.message);

        let deliveries = join_all(self.channels.iter().map(|channel| channel.send(&alert))).await;

        for (channel, delivery) in self.channels.iter().zip(&deliveries) {
            debug!(
                endpoint = %alert.endpoint,
                channel = channel.name(),
                %delivery,
                "alert dispatched"
            );
        }

        deliveries
    }
}

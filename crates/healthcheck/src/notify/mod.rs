//! Alert notification channels.
//!
//! Each channel reports the outcome of a delivery as a [`Delivery`] value and
//! logs its own failures; nothing is propagated to the dispatcher.

mod email;
mod webhook;

use std::fmt;

pub use email::EmailNotifier;
pub use webhook::WebhookNotifier;

use crate::types::AlertEvent;

/// Outcome of delivering one alert on one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Failed { reason: String },
}

impl Delivery {
    pub fn failed(reason: impl Into<String>) -> Self {
        Delivery::Failed { reason: reason.into() }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delivery::Sent => f.write_str("sent"),
            Delivery::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Alert delivery channel
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name used in diagnostics
    fn name(&self) -> &str;

    /// Deliver the alert once
    async fn send(&self, alert: &AlertEvent) -> Delivery;
}

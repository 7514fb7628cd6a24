use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Address of a checked endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Endpoint {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for Endpoint {
    fn from(url: String) -> Self {
        Self(url)
    }
}

/// Why an endpoint was classified as down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownReason {
    /// The endpoint answered with a status code other than 200
    Code(u16),
    /// The request did not complete within the probe timeout
    Timeout,
    /// Connection, DNS or TLS failure
    Transport(String),
}

impl fmt::Display for DownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownReason::Code(code) => write!(f, "{code}"),
            DownReason::Timeout => f.write_str("timeout"),
            DownReason::Transport(description) => f.write_str(description),
        }
    }
}

/// Outcome of a probe
///
/// Non-200 answers and unreachable endpoints share the `Down` tag; alerting
/// only cares about the up/down binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Up,
    Down(DownReason),
}

impl Status {
    pub fn is_up(&self) -> bool {
        matches!(self, Status::Up)
    }

    pub fn is_down(&self) -> bool {
        !self.is_up()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Up => f.write_str("Up"),
            Status::Down(reason) => write!(f, "Down({reason})"),
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of probing one endpoint once
///
/// Serializes to the check record layout: `{"timestamp", "url", "status"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// When the probe finished
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,

    /// Endpoint that was probed
    #[serde(rename = "url")]
    pub endpoint: Endpoint,

    /// Classification of the probe
    pub status: Status,
}

impl CheckResult {
    pub fn new(endpoint: Endpoint, status: Status) -> Self {
        Self { timestamp: Utc::now(), endpoint, status }
    }

    pub fn up(endpoint: Endpoint) -> Self {
        Self::new(endpoint, Status::Up)
    }

    pub fn down(endpoint: Endpoint, reason: DownReason) -> Self {
        Self::new(endpoint, Status::Down(reason))
    }
}

/// Alert derived from a `Down` result, only built to feed notifier channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEvent {
    pub endpoint: Endpoint,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl AlertEvent {
    /// Build the alert for a result, `None` when the endpoint is up
    pub fn from_result(result: &CheckResult) -> Option<Self> {
        match &result.status {
            Status::Up => None,
            status @ Status::Down(_) => Some(Self {
                endpoint: result.endpoint.clone(),
                message: format!("⚠️ {} is {}", result.endpoint, status),
                timestamp: result.timestamp,
            }),
        }
    }

    /// Subject line used by channels that carry one
    pub fn subject(&self) -> String {
        format!("Health alert: {}", self.endpoint)
    }
}

/// ISO-8601 UTC with microsecond precision
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, false)
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(timestamp))
}

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use tracing::debug;

use crate::types::{CheckResult, DownReason, Endpoint};

/// Reachability check against a single endpoint
///
/// Implementations never fail: every failure path resolves to a `Down` result.
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    /// Probe the endpoint exactly once
    async fn probe(&self, endpoint: &Endpoint) -> CheckResult;
}

/// HTTP GET prober
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("health-checker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Prober for HttpProber {
    async fn probe(&self, endpoint: &Endpoint) -> CheckResult {
        let start = Instant::now();

        let outcome = self.client.get(endpoint.as_str()).send().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(response) if response.status() == StatusCode::OK => {
                debug!(endpoint = %endpoint, latency_ms, "probe succeeded");
                CheckResult::up(endpoint.clone())
            }
            Ok(response) => {
                let code = response.status().as_u16();
                debug!(endpoint = %endpoint, latency_ms, code, "probe got unexpected status");
                CheckResult::down(endpoint.clone(), DownReason::Code(code))
            }
            Err(error) => {
                let reason = classify_error(error);
                debug!(endpoint = %endpoint, latency_ms, %reason, "probe failed");
                CheckResult::down(endpoint.clone(), reason)
            }
        }
    }
}

fn classify_error(error: reqwest::Error) -> DownReason {
    if error.is_timeout() {
        DownReason::Timeout
    } else {
        DownReason::Transport(format!("{:#}", anyhow::Error::new(error)))
    }
}

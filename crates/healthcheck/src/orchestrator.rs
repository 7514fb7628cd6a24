use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::dispatch::AlertDispatcher;
use crate::prober::{HttpProber, Prober};
use crate::sink::EventSink;
use crate::types::{CheckResult, Endpoint};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Runs one pass over a set of endpoints: probe, log, alert
pub struct Orchestrator {
    prober: Arc<dyn Prober>,
    sink: Arc<EventSink>,
    dispatcher: AlertDispatcher,
}

impl Orchestrator {
    pub fn new(prober: Arc<dyn Prober>, sink: Arc<EventSink>, dispatcher: AlertDispatcher) -> Self {
        Self { prober, sink, dispatcher }
    }

    /// HTTP prober, stdout sink and the channels enabled in `config`
    pub fn from_config(config: &Config) -> Result<Self, BuildError> {
        let sink = Arc::new(EventSink::stdout(config.log_file.clone()));
        Self::with_sink(config, sink)
    }

    /// Same as [`Orchestrator::from_config`] with a caller supplied sink
    pub fn with_sink(config: &Config, sink: Arc<EventSink>) -> Result<Self, BuildError> {
        let prober = Arc::new(HttpProber::new(config.probe_timeout)?);
        let dispatcher = AlertDispatcher::from_config(config, sink.clone())?;
        Ok(Self::new(prober, sink, dispatcher))
    }

    /// Check every endpoint once, in order, and return the results in the same order
    pub async fn run_checks(&self, endpoints: &[Endpoint]) -> Vec<CheckResult> {
        let mut results = Vec::with_capacity(endpoints.len());

        for endpoint in endpoints {
            debug!(endpoint = %endpoint, "probing");
            let result = self.prober.probe(endpoint).await;

            self.sink.emit(&result);
            self.dispatcher.dispatch(&result).await;

            results.push(result);
        }

        let down = results.iter().filter(|result| result.status.is_down()).count();
        info!(checked = results.len(), down, "check run completed");

        results
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::sink::SharedBuffer;
    use crate::types::{DownReason, Status};

    struct FixedProber(HashMap<String, Status>);

    #[async_trait::async_trait]
    impl Prober for FixedProber {
        async fn probe(&self, endpoint: &Endpoint) -> CheckResult {
            let status = self.0.get(endpoint.as_str()).cloned().unwrap_or(Status::Up);
            CheckResult::new(endpoint.clone(), status)
        }
    }

    #[tokio::test]
    async fn test_results_follow_input_order_including_duplicates() {
        let prober = FixedProber(HashMap::from([(
            "https://b.test".to_string(),
            Status::Down(DownReason::Code(404)),
        )]));
        let buffer = SharedBuffer::new();
        let sink = Arc::new(EventSink::with_writer(buffer.clone(), None));
        let orchestrator = Orchestrator::new(
            Arc::new(prober),
            sink.clone(),
            AlertDispatcher::new(sink, Vec::new()),
        );

        let endpoints: Vec<Endpoint> = ["https://a.test", "https://b.test", "https://a.test"]
            .into_iter()
            .map(Endpoint::from)
            .collect();
        let results = orchestrator.run_checks(&endpoints).await;

        let urls: Vec<_> = results.iter().map(|result| result.endpoint.as_str()).collect();
        assert_eq!(urls, vec!["https://a.test", "https://b.test", "https://a.test"]);
        assert_eq!(results[1].status, Status::Down(DownReason::Code(404)));

        // check, check, alert, check
        let records = buffer.records();
        assert_eq!(records.len(), 4);
        assert_eq!(records[1]["url"], "https://b.test");
        assert_eq!(records[2]["ALERT"], "⚠️ https://b.test is Down(404)");
        assert_eq!(records[3]["url"], "https://a.test");
    }

    #[tokio::test]
    async fn test_empty_endpoint_list() {
        let buffer = SharedBuffer::new();
        let sink = Arc::new(EventSink::with_writer(buffer.clone(), None));
        let orchestrator = Orchestrator::new(
            Arc::new(FixedProber(HashMap::new())),
            sink.clone(),
            AlertDispatcher::new(sink, Vec::new()),
        );

        assert!(orchestrator.run_checks(&[]).await.is_empty());
        assert!(buffer.contents().is_empty());
    }
}

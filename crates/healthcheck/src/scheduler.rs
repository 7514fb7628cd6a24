use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, warn};

use crate::orchestrator::Orchestrator;
use crate::types::{CheckResult, Endpoint};

/// Shortest accepted interval; shorter ones are raised to it
pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Repeats orchestrator runs on a fixed interval
pub struct Scheduler {
    orchestrator: Arc<Orchestrator>,
    endpoints: Arc<[Endpoint]>,
    interval: Duration,
    report_tx: Option<mpsc::Sender<Vec<CheckResult>>>,
}

impl Scheduler {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        endpoints: impl Into<Arc<[Endpoint]>>,
        interval: Duration,
    ) -> Self {
        if interval < MIN_INTERVAL {
            warn!(?interval, minimum = ?MIN_INTERVAL, "check interval too short, using the minimum");
        }
        let interval = interval.max(MIN_INTERVAL);

        Self { orchestrator, endpoints: endpoints.into(), interval, report_tx: None }
    }

    /// Forward every run's results to `report_tx`; the loop stops once the receiver is dropped
    pub fn with_reports(mut self, report_tx: mpsc::Sender<Vec<CheckResult>>) -> Self {
        self.report_tx = Some(report_tx);
        self
    }

    /// Start the loop; the first run happens immediately
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut timer = interval(self.interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                timer.tick().await;

                let started = Instant::now();
                let results = self.orchestrator.run_checks(&self.endpoints).await;
                let down = results.iter().filter(|result| result.status.is_down()).count();
                info!(
                    up = results.len() - down,
                    down,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "scheduled cycle finished"
                );

                if let Some(report_tx) = &self.report_tx {
                    if let Err(e) = report_tx.send(results).await {
                        error!("Failed to send check results: {}", e);
                        break;
                    }
                }
            }
        })
    }
}

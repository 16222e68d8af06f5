use std::future::Future;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use crate::application::services::poll_orchestrator::PollOrchestrator;
use crate::transport::http_client::HttpTransport;

/// Repeats polling rounds on a fixed interval.
pub struct Scheduler<T: HttpTransport + 'static> {
    orchestrator: PollOrchestrator<T>,
    interval: Duration,
}

impl<T: HttpTransport + 'static> Scheduler<T> {
    pub fn new(orchestrator: PollOrchestrator<T>, interval: Duration) -> Self {
        Self {
            orchestrator,
            interval,
        }
    }

    /// Runs a round immediately and then once per interval until `shutdown`
    /// resolves. Returns the number of completed rounds.
    pub async fn run_until<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut rounds = 0;

        info!(
            "Polling {} searches every {:?}",
            self.orchestrator.tasks().len(),
            self.interval
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Received shutdown signal, terminating gracefully");
                    break;
                }
                _ = interval.tick() => {
                    let report = self.orchestrator.run_once().await;
                    rounds += 1;
                    for (label, error) in report.errors() {
                        warn!("Round {}: search {} failed: {}", rounds, label, error);
                    }
                }
            }
        }

        rounds
    }
}

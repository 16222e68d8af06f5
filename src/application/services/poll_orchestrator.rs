use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::{
    application::models::appointment::SearchQuery,
    application::services::availability_service::AvailabilityClient,
    application::services::notifier::Notifier,
    config::SearchConfig,
    error::AppError,
    presentation::message::format_result_messages,
    transport::http_client::HttpTransport,
};

/// A search plus the label its notifications carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTask {
    pub label: String,
    pub query: SearchQuery,
}

impl SearchTask {
    pub fn new(label: impl Into<String>, query: SearchQuery) -> Self {
        Self {
            label: label.into(),
            query,
        }
    }
}

impl From<SearchConfig> for SearchTask {
    fn from(config: SearchConfig) -> Self {
        Self::new(config.label, config.query)
    }
}

/// What a successful task did during a round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSummary {
    pub terms_found: usize,
    pub notified: usize,
    pub failed_notifications: Vec<AppError>,
}

#[derive(Debug)]
pub struct TaskOutcome {
    pub label: String,
    pub result: Result<TaskSummary, AppError>,
}

/// Per-task results of one round, in task order.
#[derive(Debug, Default)]
pub struct RoundReport {
    pub outcomes: Vec<TaskOutcome>,
    pub notifications_sent: usize,
}

impl RoundReport {
    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn errors(&self) -> Vec<(&str, &AppError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.label.as_str(), e)))
            .collect()
    }

    pub fn failed_notifications(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|s| s.failed_notifications.len())
            .sum()
    }
}

impl fmt::Display for RoundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"tasks\":{},\"succeeded\":{},\"failed\":{},\"notifications_sent\":{},\"notifications_failed\":{}}}",
            self.outcomes.len(),
            self.successes(),
            self.outcomes.len() - self.successes(),
            self.notifications_sent,
            self.failed_notifications()
        )
    }
}

/// Runs every search task concurrently against one shared session.
pub struct PollOrchestrator<T: HttpTransport + 'static> {
    client: Arc<AvailabilityClient<T>>,
    notifier: Arc<dyn Notifier>,
    tasks: Vec<SearchTask>,
}

impl<T: HttpTransport + 'static> PollOrchestrator<T> {
    pub fn new(
        client: Arc<AvailabilityClient<T>>,
        notifier: Arc<dyn Notifier>,
        tasks: Vec<SearchTask>,
    ) -> Self {
        Self {
            client,
            notifier,
            tasks,
        }
    }

    pub fn tasks(&self) -> &[SearchTask] {
        &self.tasks
    }

    /// One polling round. Returns after every task finished; a failing task
    /// never affects its siblings.
    pub async fn run_once(&self) -> RoundReport {
        debug!("Starting round with {} tasks", self.tasks.len());

        let handles: Vec<_> = self
            .tasks
            .iter()
            .cloned()
            .map(|task| {
                let client = self.client.clone();
                let notifier = self.notifier.clone();
                tokio::spawn(async move { run_task(&client, notifier.as_ref(), &task).await })
            })
            .collect();

        let mut report = RoundReport::default();
        for (task, handle) in self.tasks.iter().zip(handles) {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    error!("Task {} aborted: {}", task.label, e);
                    Err(AppError::TaskAborted(e.to_string()))
                }
            };
            if let Ok(summary) = &result {
                report.notifications_sent += summary.notified;
            }
            report.outcomes.push(TaskOutcome {
                label: task.label.clone(),
                result,
            });
        }

        info!("Round finished: {}", report);
        report
    }
}

async fn run_task<T: HttpTransport>(
    client: &AvailabilityClient<T>,
    notifier: &dyn Notifier,
    task: &SearchTask,
) -> Result<TaskSummary, AppError> {
    let result = client.search(&task.query).await.map_err(|e| {
        warn!("Search {} failed: {}", task.label, e);
        e
    })?;

    let messages = format_result_messages(&task.label, &result);
    let mut summary = TaskSummary {
        terms_found: messages.len(),
        ..TaskSummary::default()
    };
    if messages.is_empty() {
        debug!("No terms for {}", task.label);
        return Ok(summary);
    }

    info!("Found {} terms for {}", messages.len(), task.label);
    for message in messages {
        match notifier.send(&message).await {
            Ok(()) => summary.notified += 1,
            Err(e) => {
                warn!("Notification for {} failed: {}", task.label, e);
                summary.failed_notifications.push(e);
            }
        }
    }
    Ok(summary)
}

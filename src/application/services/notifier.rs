use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use crate::constants::{DEFAULT_DEDUP_RETENTION, USER_AGENT};
use crate::error::AppError;

/// Delivery channel for availability messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), AppError>;
}

/// Writes messages to the log only.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &str) -> Result<(), AppError> {
        info!("Appointment available: {}", message);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Posts `{"text": message}` to a webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip(self, message))]
    async fn send(&self, message: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { text: message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Notification(format!(
                "webhook answered {status}"
            )));
        }
        debug!("Webhook accepted notification");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Deliveries {
    delivered: HashMap<String, Instant>,
    in_flight: HashSet<String>,
}

/// Forwards each distinct message once per retention window.
///
/// A message is claimed before delivery so concurrent duplicates are
/// dropped; a failed delivery releases the claim and may be retried.
pub struct DedupNotifier {
    inner: Arc<dyn Notifier>,
    retention: Duration,
    state: Mutex<Deliveries>,
}

impl DedupNotifier {
    pub fn new(inner: Arc<dyn Notifier>) -> Self {
        Self {
            inner,
            retention: Duration::from_secs(DEFAULT_DEDUP_RETENTION),
            state: Mutex::new(Deliveries::default()),
        }
    }

    /// How long a delivered message suppresses its duplicates.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Deliveries> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn claim(&self, message: &str) -> bool {
        let mut state = self.lock();
        let now = Instant::now();
        state
            .delivered
            .retain(|_, at| now.duration_since(*at) < self.retention);
        if state.delivered.contains_key(message) {
            return false;
        }
        state.in_flight.insert(message.to_string())
    }

    fn release(&self, message: &str, delivered: bool) {
        let mut state = self.lock();
        state.in_flight.remove(message);
        if delivered {
            state.delivered.insert(message.to_string(), Instant::now());
        }
    }
}

#[async_trait]
impl Notifier for DedupNotifier {
    async fn send(&self, message: &str) -> Result<(), AppError> {
        if !self.claim(message) {
            debug!("Skipping duplicate notification");
            return Ok(());
        }
        let result = self.inner.send(message).await;
        self.release(message, result.is_ok());
        result
    }
}

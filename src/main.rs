/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/
use anyhow::{bail, Context, Result};
use luxmed_checker::application::services::availability_service::AvailabilityClient;
use luxmed_checker::application::services::notifier::{
    DedupNotifier, LogNotifier, Notifier, WebhookNotifier,
};
use luxmed_checker::application::services::poll_orchestrator::{PollOrchestrator, SearchTask};
use luxmed_checker::application::services::scheduler::Scheduler;
use luxmed_checker::config::{get_env_or_default, Config};
use luxmed_checker::constants::DEFAULT_CONFIG_FILE;
use luxmed_checker::session::manager::SessionManager;
use luxmed_checker::storage::cookie_store::FileCookieStore;
use luxmed_checker::transport::http_client::PortalHttpClient;
use luxmed_checker::utils::logger::setup_logger;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{debug, info, warn};

fn load_config() -> Result<Config> {
    let path: String = get_env_or_default("LUXMED_CONFIG", DEFAULT_CONFIG_FILE.to_string());
    if Path::new(&path).exists() {
        info!("Loading configuration from {}", path);
        Config::from_file(&path)
    } else {
        warn!("{} not found, using environment configuration", path);
        Ok(Config::new())
    }
}

fn build_notifier(cfg: &Config) -> Result<Arc<dyn Notifier>> {
    let timeout = Duration::from_secs(cfg.portal.timeout);
    let notifier: Arc<dyn Notifier> = match &cfg.notifications.webhook {
        Some(url) => Arc::new(
            WebhookNotifier::new(url, timeout).context("Failed to build webhook notifier")?,
        ),
        None => Arc::new(LogNotifier),
    };
    if cfg.notifications.deduplicate {
        return Ok(Arc::new(DedupNotifier::new(notifier)));
    }
    Ok(notifier)
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logger();
    let cfg = load_config()?;
    debug!("Loaded config: {}", cfg);

    if !cfg.credentials.is_configured() {
        bail!("Portal credentials are not configured");
    }

    if cfg.searches.is_empty() {
        warn!("No searches configured, nothing to poll");
        return Ok(());
    }

    let transport = Arc::new(
        PortalHttpClient::new(&cfg.portal.base_url, Duration::from_secs(cfg.portal.timeout))
            .context("Failed to build HTTP client")?,
    );
    let store = Arc::new(FileCookieStore::new(&cfg.portal.cookie_file));
    let session = Arc::new(
        SessionManager::new(transport.clone(), cfg.credentials.clone(), store)
            .with_liveness_probe(cfg.portal.liveness_probe),
    );

    // Fail fast on bad credentials instead of once per search.
    session
        .ensure_authenticated()
        .await
        .context("Initial authentication failed")?;

    let client = Arc::new(AvailabilityClient::new(session, transport));
    let tasks: Vec<SearchTask> = cfg.searches.iter().cloned().map(SearchTask::from).collect();
    let orchestrator = PollOrchestrator::new(client, build_notifier(&cfg)?, tasks);
    let scheduler = Scheduler::new(
        orchestrator,
        Duration::from_secs(cfg.schedule.check_interval),
    );

    let rounds = scheduler
        .run_until(async {
            if let Err(e) = signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("Service shutting down after {} rounds", rounds);
    Ok(())
}

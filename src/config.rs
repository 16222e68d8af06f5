use crate::application::models::appointment::SearchQuery;
use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_CHECK_INTERVAL, DEFAULT_COOKIE_FILE, DEFAULT_REQUEST_TIMEOUT,
};
use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fmt::Debug;
use std::path::Path;
use std::str::FromStr;
use tracing::{error, warn};

const PLACEHOLDER_USERNAME: &str = "default_username";
const PLACEHOLDER_PASSWORD: &str = "default_password";

#[derive(Debug, Deserialize, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// False while either value is empty or still the built-in placeholder.
    pub fn is_configured(&self) -> bool {
        !self.username.trim().is_empty()
            && !self.password.is_empty()
            && self.username != PLACEHOLDER_USERNAME
            && self.password != PLACEHOLDER_PASSWORD
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PortalConfig {
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout: u64,
    pub cookie_file: String,
    /// Probe the current user endpoint before trusting a cached token.
    pub liveness_probe: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds between polling rounds.
    pub check_interval: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct NotificationConfig {
    pub webhook: Option<String>,
    pub deduplicate: bool,
}

/// One labelled search, the label is what ends up in notifications.
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub label: String,
    #[serde(flatten)]
    pub query: SearchQuery,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub credentials: Credentials,
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub searches: Vec<SearchConfig>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            cookie_file: DEFAULT_COOKIE_FILE.to_string(),
            liveness_probe: true,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"username\":\"{}\",\"password\":\"[REDACTED]\"}}",
            self.username
        )
    }
}

impl fmt::Display for PortalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"base_url\":\"{}\",\"timeout\":{},\"cookie_file\":\"{}\",\"liveness_probe\":{}}}",
            self.base_url, self.timeout, self.cookie_file, self.liveness_probe
        )
    }
}

impl fmt::Display for ScheduleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"check_interval\":{}}}", self.check_interval)
    }
}

impl fmt::Display for NotificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"webhook\":{},\"deduplicate\":{}}}",
            self.webhook
                .as_ref()
                .map_or("null".to_string(), |_| "\"[REDACTED]\"".to_string()),
            self.deduplicate
        )
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.searches.iter().map(|s| s.label.as_str()).collect();
        write!(
            f,
            "{{\"credentials\":{},\"portal\":{},\"schedule\":{},\"notifications\":{},\"searches\":{}}}",
            self.credentials,
            self.portal,
            self.schedule,
            self.notifications,
            serde_json::to_string(&labels).map_err(|_| fmt::Error)?
        )
    }
}

pub fn get_env_or_default<T: FromStr>(env_var: &str, default: T) -> T
where
    <T as FromStr>::Err: Debug,
{
    match env::var(env_var) {
        Ok(val) => val.parse::<T>().unwrap_or_else(|_| {
            error!("Failed to parse {}: {}, using default", env_var, val);
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    /// Builds a configuration from `LUXMED_*` environment variables.
    ///
    /// Searches cannot be expressed through the environment, so the returned
    /// config has none; use [`Config::from_file`] for a runnable setup.
    pub fn new() -> Self {
        let webhook: String = get_env_or_default("LUXMED_WEBHOOK_URL", String::new());
        let credentials = Credentials {
            username: get_env_or_default("LUXMED_USERNAME", PLACEHOLDER_USERNAME.to_string()),
            password: get_env_or_default("LUXMED_PASSWORD", PLACEHOLDER_PASSWORD.to_string()),
        };
        if !credentials.is_configured() {
            warn!("LUXMED_USERNAME or LUXMED_PASSWORD is not set, login will fail");
        }
        Config {
            credentials,
            portal: PortalConfig {
                base_url: get_env_or_default("LUXMED_BASE_URL", DEFAULT_BASE_URL.to_string()),
                timeout: get_env_or_default("LUXMED_TIMEOUT", DEFAULT_REQUEST_TIMEOUT),
                cookie_file: get_env_or_default(
                    "LUXMED_COOKIE_FILE",
                    DEFAULT_COOKIE_FILE.to_string(),
                ),
                liveness_probe: get_env_or_default("LUXMED_LIVENESS_PROBE", true),
            },
            schedule: ScheduleConfig {
                check_interval: get_env_or_default("LUXMED_CHECK_INTERVAL", DEFAULT_CHECK_INTERVAL),
            },
            notifications: NotificationConfig {
                webhook: if webhook.is_empty() { None } else { Some(webhook) },
                deduplicate: get_env_or_default("LUXMED_DEDUPLICATE", false),
            },
            searches: Vec::new(),
        }
    }

    /// Loads a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&data).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(data: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(data).context("Failed to parse YAML configuration")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

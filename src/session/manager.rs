use crate::config::Credentials;
use crate::constants::{DEFAULT_PROBE_GRACE, LOGIN_PATH, USER_PROFILE_PATH};
use crate::error::AppError;
use crate::session::auth::{LoginRequest, LoginResponse};
use crate::session::cookies::CookieJar;
use crate::session::interface::{AuthToken, SessionState};
use crate::session::session::Session;
use crate::storage::cookie_store::CookieStore;
use crate::transport::headers::SecurityHeaders;
use crate::transport::http_client::HttpTransport;
use crate::transport::model::HttpRequest;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Owns the single authenticated portal session.
///
/// Every state change happens while holding `session`. A login runs with the
/// lock held, so concurrent callers queue behind it instead of starting their
/// own, and `completed_logins` lets them tell that an attempt finished while
/// they were waiting so they can take its outcome as their own.
pub struct SessionManager<T: HttpTransport> {
    transport: Arc<T>,
    credentials: Credentials,
    store: Arc<dyn CookieStore>,
    liveness_probe: bool,
    probe_grace: Duration,
    session: Mutex<Session>,
    completed_logins: AtomicU64,
}

enum Liveness {
    /// 2xx, the token is good for another grace period.
    Verified,
    /// Any other non-401 answer; the token is kept but not re-verified.
    Unverified,
    Expired,
}

impl<T: HttpTransport> SessionManager<T> {
    /// Creates a manager and restores the persisted cookie set, if any.
    pub fn new(transport: Arc<T>, credentials: Credentials, store: Arc<dyn CookieStore>) -> Self {
        let cookies = match store.load() {
            Ok(Some(blob)) => CookieJar::from_blob(&blob),
            Ok(None) => CookieJar::new(),
            Err(e) => {
                warn!("Failed to load persisted cookies: {}", e);
                CookieJar::new()
            }
        };
        debug!("Restored {} cookies", cookies.len());

        Self {
            transport,
            credentials,
            store,
            liveness_probe: true,
            probe_grace: Duration::from_secs(DEFAULT_PROBE_GRACE),
            session: Mutex::new(Session::new(cookies)),
            completed_logins: AtomicU64::new(0),
        }
    }

    pub fn with_liveness_probe(mut self, enabled: bool) -> Self {
        self.liveness_probe = enabled;
        self
    }

    /// A token verified less than `grace` ago is trusted without probing.
    pub fn with_probe_grace(mut self, grace: Duration) -> Self {
        self.probe_grace = grace;
        self
    }

    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state
    }

    pub async fn generation(&self) -> u64 {
        self.session.lock().await.generation
    }

    /// Number of finished login exchanges, successful or not.
    pub fn login_attempts(&self) -> u64 {
        self.completed_logins.load(Ordering::SeqCst)
    }

    /// Performs a login exchange regardless of the current state.
    #[instrument(skip(self))]
    pub async fn authenticate(&self) -> Result<AuthToken, AppError> {
        let mut session = self.session.lock().await;
        self.login(&mut session).await
    }

    /// Returns a usable token, logging in or re-validating as needed.
    #[instrument(skip(self))]
    pub async fn ensure_authenticated(&self) -> Result<AuthToken, AppError> {
        let seen = self.completed_logins.load(Ordering::SeqCst);
        let mut session = self.session.lock().await;

        if self.completed_logins.load(Ordering::SeqCst) != seen {
            // A login finished while we were queued.
            match (session.state, session.token(), session.last_error.clone()) {
                (SessionState::Authenticated, Some(token), _) => return Ok(token),
                (SessionState::Failed, _, Some(error)) => return Err(error),
                _ => {}
            }
        }

        if session.state != SessionState::Authenticated {
            debug!("Session is {}, authenticating", session.state);
            return self.login(&mut session).await;
        }

        if self.needs_probe(&session) {
            match self.probe(&session).await? {
                Liveness::Verified => session.verified_at = Some(Instant::now()),
                Liveness::Unverified => {}
                Liveness::Expired => {
                    info!("Token expired, re-authenticating");
                    session.reset();
                    return self.login(&mut session).await;
                }
            }
        }

        session.token().ok_or(AppError::NotAuthenticated)
    }

    /// The current token; fails unless the session is authenticated.
    pub async fn current_token(&self) -> Result<AuthToken, AppError> {
        self.session
            .lock()
            .await
            .token()
            .ok_or(AppError::NotAuthenticated)
    }

    /// Drops the session after the portal rejected a token of `generation`.
    ///
    /// Returns `false` and changes nothing when a newer login already
    /// replaced that token or the session is not authenticated.
    pub async fn invalidate(&self, generation: u64) -> bool {
        let mut session = self.session.lock().await;
        if session.state != SessionState::Authenticated || session.generation != generation {
            debug!(
                "Ignoring invalidation of generation {} (current {}, {})",
                generation, session.generation, session.state
            );
            return false;
        }
        info!("Invalidating session generation {}", generation);
        session.reset();
        true
    }

    fn needs_probe(&self, session: &Session) -> bool {
        self.liveness_probe
            && session
                .verified_at
                .map_or(true, |at| at.elapsed() >= self.probe_grace)
    }

    async fn probe(&self, session: &Session) -> Result<Liveness, AppError> {
        let token = session.token().ok_or(AppError::NotAuthenticated)?;
        let request = SecurityHeaders::new(Some(&token.value), token.cookie_header)
            .apply(HttpRequest::get(USER_PROFILE_PATH));

        let response = self.transport.execute(request).await?;
        if response.is_unauthorized() {
            return Ok(Liveness::Expired);
        }
        if !response.is_success() {
            warn!("Liveness probe answered {}, keeping token", response.status);
            return Ok(Liveness::Unverified);
        }
        Ok(Liveness::Verified)
    }

    async fn login(&self, session: &mut Session) -> Result<AuthToken, AppError> {
        debug!("Authenticating user: {}", self.credentials.username);
        session.begin_login();

        let result = match self.exchange(&session.cookies).await {
            Ok((token, set_cookies)) => {
                let token = session.complete_login(token, set_cookies.as_slice());
                self.persist_cookies(&session.cookies).await;
                info!("Authenticated successfully (generation {})", token.generation);
                Ok(token)
            }
            Err(e) => {
                warn!("Authentication failed: {}", e);
                session.fail_login(e.clone());
                Err(e)
            }
        };

        self.completed_logins.fetch_add(1, Ordering::SeqCst);
        result
    }

    async fn exchange(&self, cookies: &CookieJar) -> Result<(String, Vec<String>), AppError> {
        let request = HttpRequest::post(LOGIN_PATH, &LoginRequest::new(&self.credentials))?;
        let request = SecurityHeaders::new(None, cookies.header_value()).apply(request);

        let response = self.transport.execute(request).await?;
        let token = LoginResponse::token_from(&response)?;
        Ok((token, response.set_cookies))
    }

    async fn persist_cookies(&self, cookies: &CookieJar) {
        let blob = match cookies.to_blob() {
            Ok(blob) => blob,
            Err(e) => {
                warn!("Failed to serialize cookies: {}", e);
                return;
            }
        };
        let store = self.store.clone();
        let saved = tokio::task::spawn_blocking(move || store.save(&blob))
            .await
            .map_err(|e| AppError::TaskAborted(e.to_string()))
            .and_then(|saved| saved);
        if let Err(e) = saved {
            warn!("Failed to persist cookies: {}", e);
        }
    }
}

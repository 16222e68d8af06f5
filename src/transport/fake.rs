//! Scripted in-memory transport used by the unit tests.

use crate::constants::{LOGIN_PATH, TERMS_SEARCH_PATH, USER_PROFILE_PATH};
use crate::error::TransportError;
use crate::transport::http_client::HttpTransport;
use crate::transport::model::{HttpRequest, HttpResponse};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

type SearchHandler =
    Box<dyn Fn(&HttpRequest, usize) -> Result<HttpResponse, TransportError> + Send + Sync>;

pub(crate) struct FakeTransport {
    login_tokens: Vec<String>,
    login_status: StatusCode,
    login_delay: Duration,
    login_failure: Option<TransportError>,
    probe_status: Mutex<StatusCode>,
    search: SearchHandler,
    logins: AtomicUsize,
    probes: AtomicUsize,
    searches: AtomicUsize,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self {
            login_tokens: vec!["token-1".to_string()],
            login_status: StatusCode::OK,
            login_delay: Duration::ZERO,
            login_failure: None,
            probe_status: Mutex::new(StatusCode::OK),
            search: Box::new(|_, _| Ok(HttpResponse::new(StatusCode::OK, empty_terms_body()))),
            logins: AtomicUsize::new(0),
            probes: AtomicUsize::new(0),
            searches: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Tokens handed out by successive logins; the last one repeats.
    pub(crate) fn with_login_tokens(mut self, tokens: &[&str]) -> Self {
        self.login_tokens = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    pub(crate) fn with_login_status(mut self, status: StatusCode) -> Self {
        self.login_status = status;
        self
    }

    pub(crate) fn with_login_delay(mut self, delay: Duration) -> Self {
        self.login_delay = delay;
        self
    }

    /// Every login fails at the network level with `error`.
    pub(crate) fn with_login_failure(mut self, error: TransportError) -> Self {
        self.login_failure = Some(error);
        self
    }

    /// `handler` receives the request and the zero-based index of the search call.
    pub(crate) fn with_search<F>(mut self, handler: F) -> Self
    where
        F: Fn(&HttpRequest, usize) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        self.search = Box::new(handler);
        self
    }

    pub(crate) fn set_probe_status(&self, status: StatusCode) {
        *self.probe_status.lock().unwrap() = status;
    }

    pub(crate) fn login_count(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub(crate) fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub(crate) fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        match request.path.as_str() {
            LOGIN_PATH => {
                let n = self.logins.fetch_add(1, Ordering::SeqCst);
                if !self.login_delay.is_zero() {
                    tokio::time::sleep(self.login_delay).await;
                }
                if let Some(error) = &self.login_failure {
                    return Err(error.clone());
                }
                if !self.login_status.is_success() {
                    return Ok(HttpResponse::new(self.login_status, "Unauthorized"));
                }
                let token = self
                    .login_tokens
                    .get(n)
                    .or_else(|| self.login_tokens.last())
                    .cloned()
                    .unwrap_or_default();
                Ok(HttpResponse::new(
                    StatusCode::OK,
                    json!({"succeeded": true, "token": token, "errorMessage": null}).to_string(),
                )
                .with_set_cookie(format!("ASP.NET_SessionId=session-{}; path=/; HttpOnly", n + 1)))
            }
            USER_PROFILE_PATH => {
                self.probes.fetch_add(1, Ordering::SeqCst);
                let status = *self.probe_status.lock().unwrap();
                Ok(HttpResponse::new(status, "{}"))
            }
            TERMS_SEARCH_PATH => {
                let n = self.searches.fetch_add(1, Ordering::SeqCst);
                (self.search)(&request, n)
            }
            _ => Ok(HttpResponse::new(StatusCode::NOT_FOUND, "")),
        }
    }
}

pub(crate) fn empty_terms_body() -> String {
    json!({
        "correlationId": "empty",
        "success": true,
        "termsForService": {"serviceVariantId": 4480, "termsForDays": []}
    })
    .to_string()
}

/// One day with the given `(from, to, first name, last name, clinic)` terms.
pub(crate) fn terms_body(day: &str, terms: &[(&str, &str, &str, &str, &str)]) -> String {
    let terms: Vec<serde_json::Value> = terms
        .iter()
        .map(|(from, to, first, last, clinic)| {
            json!({
                "dateTimeFrom": from,
                "dateTimeTo": to,
                "doctor": {"academicTitle": "lek.", "firstName": first, "lastName": last},
                "clinicId": 1,
                "clinic": clinic,
                "clinicGroup": "Warszawa",
                "isTelemedicine": false
            })
        })
        .collect();
    json!({
        "correlationId": "c-1",
        "success": true,
        "termsForService": {
            "serviceVariantId": 4480,
            "termsForDays": [{"day": day, "terms": terms}]
        }
    })
    .to_string()
}

pub(crate) fn bearer_of(request: &HttpRequest) -> Option<String> {
    request
        .header("authorization")
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(String::from)
}

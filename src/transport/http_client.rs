use crate::constants::USER_AGENT;
use crate::error::{AppError, TransportError};
use crate::transport::model::{HttpRequest, HttpResponse};
use async_trait::async_trait;
use reqwest::{header, Client};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Executes portal requests. Implementations must not interpret status codes.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// reqwest-backed transport for the patient portal.
#[derive(Debug, Clone)]
pub struct PortalHttpClient {
    client: Client,
    base_url: String,
}

impl PortalHttpClient {
    /// Creates a new instance of the PortalHttpClient.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The portal root every request path is appended to.
    /// * `timeout` - Upper bound for each individual request.
    ///
    /// # Returns
    ///
    /// A Result containing the PortalHttpClient instance or an error.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HttpTransport for PortalHttpClient {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!("Sending {} request to {}", request.method, url);

        let mut builder = self.client.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!("Failed to send {} request: {:?}", request.method, e);
            TransportError::from(e)
        })?;

        let status = response.status();
        let set_cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(String::from)
            .collect();
        let body = response.text().await?;

        debug!("Response Status: {}", status);
        Ok(HttpResponse {
            status,
            set_cookies,
            body,
        })
    }
}

impl fmt::Display for PortalHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"base_url\":\"{}\"}}", self.base_url)
    }
}

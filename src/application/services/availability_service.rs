use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::models::appointment::{SearchQuery, SearchResult, TermsResponse},
    constants::TERMS_SEARCH_PATH,
    error::{AppError, AuthError},
    session::interface::AuthToken,
    session::manager::SessionManager,
    transport::headers::SecurityHeaders,
    transport::http_client::HttpTransport,
    transport::model::{HttpRequest, HttpResponse},
};

/// Searches the portal for free terms using the shared session.
pub struct AvailabilityClient<T: HttpTransport> {
    session: Arc<SessionManager<T>>,
    transport: Arc<T>,
}

impl<T: HttpTransport> AvailabilityClient<T> {
    pub fn new(session: Arc<SessionManager<T>>, transport: Arc<T>) -> Self {
        Self { session, transport }
    }

    pub fn session(&self) -> &Arc<SessionManager<T>> {
        &self.session
    }

    /// Runs one search. An unauthorized answer is recovered once by
    /// re-authenticating; a second one is reported as an authentication error.
    #[instrument(skip(self, query), fields(service = query.service_variant_id, city = %query.city_name))]
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResult, AppError> {
        let token = self.session.ensure_authenticated().await?;
        let mut response = self.send(query, &token).await?;

        if response.is_unauthorized() {
            info!("Search rejected token generation {}, re-authenticating", token.generation);
            self.session.invalidate(token.generation).await;
            let token = self.session.ensure_authenticated().await?;
            response = self.send(query, &token).await?;

            if response.is_unauthorized() {
                warn!("Search still unauthorized after re-authentication");
                return Err(AuthError::Unauthorized.into());
            }
        }

        if !response.is_success() {
            return Err(AppError::Request(response.status));
        }

        let decoded: TermsResponse = serde_json::from_str(&response.body)?;
        let result = SearchResult::from(decoded);
        debug!(
            "Search returned {} days, success={}",
            result.days.len(),
            result.success
        );
        Ok(result)
    }

    async fn send(&self, query: &SearchQuery, token: &AuthToken) -> Result<HttpResponse, AppError> {
        let request = HttpRequest::get(TERMS_SEARCH_PATH).with_query(query.to_query_params());
        let request =
            SecurityHeaders::new(Some(&token.value), token.cookie_header.clone()).apply(request);
        Ok(self.transport.execute(request).await?)
    }
}

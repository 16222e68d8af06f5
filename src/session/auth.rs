use crate::config::Credentials;
use crate::error::{AppError, AuthError};
use crate::transport::model::HttpResponse;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest {
    login: String,
    password: String,
}

impl LoginRequest {
    pub(crate) fn new(credentials: &Credentials) -> Self {
        Self {
            login: credentials.username.clone(),
            password: credentials.password.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub(crate) succeeded: bool,
    #[serde(default)]
    pub(crate) token: Option<String>,
    #[serde(rename = "errorMessage", default)]
    pub(crate) error_message: Option<String>,
}

impl LoginResponse {
    /// Interprets a login reply.
    ///
    /// Only the token decides: a non-empty token is accepted even when
    /// `succeeded` is false, an empty or missing token is always a failure.
    pub(crate) fn token_from(response: &HttpResponse) -> Result<String, AppError> {
        if !response.is_success() {
            return Err(AuthError::Rejected(response.status).into());
        }
        let login: LoginResponse = serde_json::from_str(&response.body)?;
        match login.token.filter(|t| !t.trim().is_empty()) {
            Some(token) => {
                if !login.succeeded {
                    warn!(
                        "Portal reported an unsuccessful login but issued a token: {}",
                        login.error_message.as_deref().unwrap_or("no message")
                    );
                }
                Ok(token)
            }
            None => {
                let message = login.error_message.filter(|m| !m.is_empty());
                Err(AuthError::EmptyToken(message).into())
            }
        }
    }
}

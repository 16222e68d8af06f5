/******************************************************************************
    Author: Joaquín Béjar García
    Email: jb@taunais.com
    Date: 19/10/26
 ******************************************************************************/

use crate::transport::model::HttpRequest;
use std::fmt;
use std::fmt::Display;

pub(crate) const AUTHORIZATION: &str = "Authorization";
pub(crate) const COOKIE: &str = "Cookie";

/// Headers that carry the session to the portal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SecurityHeaders {
    pub(crate) authorization: Option<String>,
    pub(crate) cookie: Option<String>,
}

impl SecurityHeaders {
    pub(crate) fn new(token: Option<&str>, cookie: Option<String>) -> Self {
        Self {
            authorization: token.map(|t| format!("Bearer {t}")),
            cookie: cookie.filter(|c| !c.is_empty()),
        }
    }

    /// Attaches every present header to the request.
    pub(crate) fn apply(&self, mut request: HttpRequest) -> HttpRequest {
        if let Some(authorization) = &self.authorization {
            request = request.with_header(AUTHORIZATION, authorization.clone());
        }
        if let Some(cookie) = &self.cookie {
            request = request.with_header(COOKIE, cookie.clone());
        }
        request
    }
}

trait Redacted {
    fn redacted(&self) -> String;
}

impl Redacted for Option<String> {
    fn redacted(&self) -> String {
        match self {
            Some(_) => "\"[REDACTED]\"".to_string(),
            None => "null".to_string(),
        }
    }
}

impl Display for SecurityHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"authorization\":{},\"cookie\":{}}}",
            self.authorization.redacted(),
            self.cookie.redacted()
        )
    }
}

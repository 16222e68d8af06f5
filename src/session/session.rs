/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/
use crate::error::AppError;
use crate::session::cookies::CookieJar;
use crate::session::interface::{AuthToken, SessionState};
use std::fmt;
use tokio::time::Instant;

/// Mutable session data. Only ever touched through the manager's lock.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) state: SessionState,
    token: Option<String>,
    pub(crate) cookies: CookieJar,
    pub(crate) generation: u64,
    pub(crate) last_error: Option<AppError>,
    pub(crate) verified_at: Option<Instant>,
}

impl Session {
    pub(crate) fn new(cookies: CookieJar) -> Self {
        Self {
            state: SessionState::Unauthenticated,
            token: None,
            cookies,
            generation: 0,
            last_error: None,
            verified_at: None,
        }
    }

    /// The usable token, only while authenticated.
    pub(crate) fn token(&self) -> Option<AuthToken> {
        if self.state != SessionState::Authenticated {
            return None;
        }
        self.token.as_ref().map(|value| AuthToken {
            value: value.clone(),
            cookie_header: self.cookies.header_value(),
            generation: self.generation,
        })
    }

    pub(crate) fn begin_login(&mut self) {
        self.state = SessionState::Authenticating;
        self.token = None;
    }

    pub(crate) fn complete_login<S: AsRef<str>>(
        &mut self,
        token: String,
        set_cookies: &[S],
    ) -> AuthToken {
        self.cookies.absorb(set_cookies);
        self.token = Some(token.clone());
        self.generation += 1;
        self.state = SessionState::Authenticated;
        self.last_error = None;
        self.verified_at = Some(Instant::now());
        AuthToken {
            value: token,
            cookie_header: self.cookies.header_value(),
            generation: self.generation,
        }
    }

    pub(crate) fn fail_login(&mut self, error: AppError) {
        self.state = SessionState::Failed;
        self.token = None;
        self.verified_at = None;
        self.last_error = Some(error);
    }

    pub(crate) fn reset(&mut self) {
        self.state = SessionState::Unauthenticated;
        self.token = None;
        self.verified_at = None;
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"state\":\"{}\",\"generation\":{},\"token\":{},\"cookies\":{}}}",
            self.state,
            self.generation,
            self.token
                .as_ref()
                .map_or("null".to_string(), |_| "\"[REDACTED]\"".to_string()),
            self.cookies.len()
        )
    }
}

#[cfg(test)]
mod tests_session {
    use super::*;
    use crate::error::AuthError;
    use assert_json_diff::assert_json_eq;
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn test_token_only_when_authenticated() {
        let mut session = Session::new(CookieJar::new());
        assert!(session.token().is_none());

        session.begin_login();
        assert_eq!(session.state, SessionState::Authenticating);
        assert!(session.token().is_none());

        let token = session.complete_login("abc".to_string(), &["sid=1; path=/"]);
        assert_eq!(token.generation, 1);
        assert_eq!(token.cookie_header.as_deref(), Some("sid=1"));
        assert_eq!(session.token(), Some(token));

        session.reset();
        assert!(session.token().is_none());
        assert_eq!(session.generation, 1);
    }

    #[test]
    fn test_failed_login_keeps_generation() {
        let mut session = Session::new(CookieJar::new());
        session.begin_login();
        session.complete_login("abc".to_string(), &[] as &[&str]);
        session.begin_login();
        session.fail_login(AuthError::Rejected(StatusCode::UNAUTHORIZED).into());

        assert_eq!(session.state, SessionState::Failed);
        assert_eq!(session.generation, 1);
        assert_eq!(
            session.last_error,
            Some(AppError::Authentication(AuthError::Rejected(
                StatusCode::UNAUTHORIZED
            )))
        );
    }

    #[test]
    fn test_session_display() {
        let mut session = Session::new(CookieJar::new());
        session.begin_login();
        session.complete_login("secret".to_string(), &["a=1", "b=2"]);

        let expected = json!({
            "state": "authenticated",
            "generation": 1,
            "token": "[REDACTED]",
            "cookies": 2
        });
        assert_json_eq!(
            serde_json::from_str::<serde_json::Value>(&session.to_string()).unwrap(),
            expected
        );
    }
}

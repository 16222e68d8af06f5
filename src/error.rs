/******************************************************************************
    Author: Joaquín Béjar García
    Email: jb@taunais.com
    Date: 19/10/26
 ******************************************************************************/
use reqwest::StatusCode;
use std::fmt::{Display, Formatter};
use std::{fmt, io};

/// Network-level failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connection,
    Other,
}

impl Display for TransportErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::Timeout => write!(f, "timeout"),
            TransportErrorKind::Connection => write!(f, "connection"),
            TransportErrorKind::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Connection, message)
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportErrorKind::Timeout
        } else if e.is_connect() {
            TransportErrorKind::Connection
        } else {
            TransportErrorKind::Other
        };
        TransportError::new(kind, e.to_string())
    }
}

/// The portal refused to hand out or honour a token.
///
/// Network and decoding failures during a login are reported as
/// [`AppError::Transport`] and [`AppError::Decode`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The portal answered the login with a non-2xx status.
    Rejected(StatusCode),
    /// The portal answered 2xx but handed out no token.
    EmptyToken(Option<String>),
    /// A request was still unauthorized right after a fresh login.
    Unauthorized,
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Rejected(s) => write!(f, "login rejected with http status: {s}"),
            AuthError::EmptyToken(Some(msg)) => write!(f, "empty token: {msg}"),
            AuthError::EmptyToken(None) => write!(f, "empty token"),
            AuthError::Unauthorized => write!(f, "unauthorized after re-authentication"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Cloneable so that every caller waiting on the same login attempt can
/// receive its own copy of the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    Authentication(AuthError),
    NotAuthenticated,
    Request(StatusCode),
    Decode(String),
    Transport(TransportError),
    Io(String),
    Notification(String),
    TaskAborted(String),
}

impl AppError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, AppError::Authentication(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, AppError::Transport(_))
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Authentication(e) => write!(f, "authentication error: {e}"),
            AppError::NotAuthenticated => write!(f, "not authenticated"),
            AppError::Request(s) => write!(f, "unexpected http status: {s}"),
            AppError::Decode(msg) => write!(f, "decode error: {msg}"),
            AppError::Transport(e) => write!(f, "transport error: {e}"),
            AppError::Io(msg) => write!(f, "io error: {msg}"),
            AppError::Notification(msg) => write!(f, "notification error: {msg}"),
            AppError::TaskAborted(msg) => write!(f, "task aborted: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Authentication(e)
    }
}
impl From<TransportError> for AppError {
    fn from(e: TransportError) -> Self {
        AppError::Transport(e)
    }
}
impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Transport(e.into())
    }
}
impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Decode(e.to_string())
    }
}
impl From<io::Error> for AppError {
    fn from(e: io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

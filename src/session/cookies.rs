use chrono::{DateTime, Duration, Utc};
use cookie::Cookie;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredCookie {
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl StoredCookie {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Cookies the portal handed out for this session.
///
/// Every cookie belongs to the single portal host, so `Domain` and `Path`
/// are not tracked. Expiry is, both while running and across restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookieJar {
    cookies: BTreeMap<String, StoredCookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a jar from a persisted blob, dropping cookies that expired in
    /// the meantime. An unreadable blob yields an empty jar.
    pub fn from_blob(blob: &str) -> Self {
        let mut jar: Self = serde_json::from_str(blob).unwrap_or_else(|e| {
            debug!("Ignoring unreadable cookie blob: {}", e);
            Self::default()
        });
        jar.purge_expired(Utc::now());
        jar
    }

    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Applies `Set-Cookie` header values.
    pub fn absorb<S: AsRef<str>>(&mut self, set_cookies: &[S]) {
        self.absorb_at(set_cookies, Utc::now());
    }

    /// Applies `Set-Cookie` header values as of `now`. An empty value, a
    /// non-positive `Max-Age` or an `Expires` in the past removes the cookie.
    pub(crate) fn absorb_at<S: AsRef<str>>(&mut self, set_cookies: &[S], now: DateTime<Utc>) {
        for header in set_cookies {
            let parsed = match Cookie::parse(header.as_ref()) {
                Ok(parsed) => parsed,
                Err(e) => {
                    debug!("Skipping malformed Set-Cookie header: {}", e);
                    continue;
                }
            };
            let name = parsed.name().trim();
            if name.is_empty() {
                continue;
            }

            let stored = StoredCookie {
                value: parsed.value().trim().to_string(),
                expires_at: expiry(&parsed, now),
            };
            if stored.value.is_empty() || !stored.is_live(now) {
                debug!("Portal removed cookie {}", name);
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), stored);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let now = Utc::now();
        self.cookies
            .get(name)
            .filter(|c| c.is_live(now))
            .map(|c| c.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Value for a `Cookie` request header, `None` when no cookie is live.
    pub fn header_value(&self) -> Option<String> {
        self.header_value_at(Utc::now())
    }

    pub(crate) fn header_value_at(&self, now: DateTime<Utc>) -> Option<String> {
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|(_, c)| c.is_live(now))
            .map(|(name, c)| format!("{name}={}", c.value))
            .collect();
        if pairs.is_empty() {
            return None;
        }
        Some(pairs.join("; "))
    }

    fn purge_expired(&mut self, now: DateTime<Utc>) {
        self.cookies.retain(|_, c| c.is_live(now));
    }
}

/// `Max-Age` wins over `Expires`; neither means a session cookie.
fn expiry(cookie: &Cookie<'_>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if let Some(max_age) = cookie.max_age() {
        let seconds = max_age.whole_seconds();
        if seconds <= 0 {
            return Some(now);
        }
        return Duration::try_seconds(seconds).and_then(|d| now.checked_add_signed(d));
    }
    cookie
        .expires_datetime()
        .and_then(|at| DateTime::from_timestamp(at.unix_timestamp(), 0))
}

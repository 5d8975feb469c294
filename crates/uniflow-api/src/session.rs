// Session login
//
// One `POST {origin}/api/login` per batch. The controller answers with one
// or more `set-cookie` headers; their name=value parts become the opaque
// token sent back as `Cookie` on every later request.

use std::fmt;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, SET_COOKIE};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::{ControllerClient, body_preview};
use crate::error::Error;

/// An authenticated controller session.
///
/// Holds the cookie header value captured at login. Cloning is cheap enough
/// for per-batch sharing; the token is never printed by `Debug`.
#[derive(Clone)]
pub struct Session {
    cookie: SecretString,
}

impl Session {
    /// Wrap an already-extracted cookie header value.
    pub fn from_cookie(cookie: impl Into<String>) -> Self {
        Self {
            cookie: SecretString::from(cookie.into()),
        }
    }

    /// Build a session from login response headers, if they carry a cookie.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        extract_session_cookie(headers).map(Self::from_cookie)
    }

    /// The value for the `Cookie` request header.
    pub fn cookie_header(&self) -> &str {
        self.cookie.expose_secret()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("cookie", &"[REDACTED]").finish()
    }
}

/// Reduce every `set-cookie` header to its `name=value` part and join them
/// with `"; "`. Returns `None` when nothing usable is present.
pub fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    let parts: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

impl ControllerClient {
    /// Authenticate with username/password and capture the session cookie.
    ///
    /// Every failure here is an authentication failure: transport errors,
    /// a 4xx/5xx answer, or a response without a usable `set-cookie`.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<Session, Error> {
        if username.is_empty() || password.expose_secret().is_empty() {
            return Err(Error::Authentication {
                message: "missing username or password in credentials".into(),
            });
        }

        let url = self.endpoints().login_url()?;
        debug!("logging in at {}", url);

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp = self
            .login_http()
            .post(url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Authentication {
                message: format!("login request failed: {e}"),
            })?;

        let status = resp.status();
        if !(status.is_success() || status.is_redirection()) {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", body_preview(&body)),
            });
        }

        let session = Session::from_headers(resp.headers()).ok_or_else(|| Error::Authentication {
            message: "no session cookie received".into(),
        })?;

        debug!("login successful");
        Ok(session)
    }
}

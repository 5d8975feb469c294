// Controller HTTP client
//
// Wraps `reqwest::Client` with origin routing, the JSON headers every
// call needs, the session cookie, and failure classification. Login lives
// in `session.rs` as a separate inherent impl.

use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::endpoints::Endpoints;
use crate::error::Error;
use crate::session::Session;
use crate::transport::TransportConfig;

/// A fully resolved request: nothing left to substitute.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to whichever origin [`Endpoints::route`] picks.
    pub path: String,
    pub body: Option<Value>,
}

/// Error bodies seen in the wild: `{"message": ...}` from the v2 API and
/// the legacy `{"meta": {"rc": "error", "msg": ...}}` envelope.
#[derive(Deserialize)]
struct UpstreamError {
    message: Option<String>,
    meta: Option<UpstreamMeta>,
}

#[derive(Deserialize)]
struct UpstreamMeta {
    msg: Option<String>,
}

/// Raw HTTP client for one controller.
pub struct ControllerClient {
    http: reqwest::Client,
    login_http: reqwest::Client,
    endpoints: Endpoints,
}

impl ControllerClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(endpoints: Endpoints, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            login_http: transport.build_login_client()?,
            endpoints,
        })
    }

    /// The non-redirecting client login requests go through.
    pub(crate) fn login_http(&self) -> &reqwest::Client {
        &self.login_http
    }

    /// The derived controller origins.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Send one resolved request with the session cookie attached.
    ///
    /// Returns the decoded body: JSON when it parses, a JSON string when it
    /// does not, `null` when empty. Non-2xx answers are classified: 401 is
    /// an authentication failure, 403 is forbidden, anything else is an
    /// API error carrying the upstream message.
    pub async fn execute(&self, request: &ApiRequest, session: &Session) -> Result<Value, Error> {
        let url = self.endpoints.url_for(&request.path)?;
        debug!("{} {}", request.method, url);

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(COOKIE, session.cookie_header());
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text)))
    }
}

fn classify_failure(status: StatusCode, body: &str) -> Error {
    match status {
        StatusCode::UNAUTHORIZED => Error::Authentication {
            message: upstream_message(body)
                .unwrap_or_else(|| "session expired or invalid credentials".into()),
        },
        StatusCode::FORBIDDEN => Error::Forbidden {
            message: upstream_message(body).unwrap_or_else(|| "insufficient permissions".into()),
        },
        _ => Error::Api {
            status: status.as_u16(),
            message: upstream_message(body).unwrap_or_else(|| {
                let preview = body_preview(body);
                if preview.is_empty() {
                    status.canonical_reason().unwrap_or("request failed").into()
                } else {
                    preview
                }
            }),
        },
    }
}

/// Pull a human-readable message out of an error body, if it has one.
fn upstream_message(body: &str) -> Option<String> {
    let parsed: UpstreamError = serde_json::from_str(body).ok()?;
    parsed
        .message
        .or_else(|| parsed.meta.and_then(|m| m.msg))
        .filter(|m| !m.is_empty())
}

/// First 200 characters of a response body, for error messages.
pub(crate) fn body_preview(body: &str) -> String {
    body.trim().chars().take(200).collect()
}

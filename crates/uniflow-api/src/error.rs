use thiserror::Error;

/// Top-level error type for the `uniflow-api` crate.
///
/// Failures are already classified by the time they leave this crate:
/// rejected credentials, rejected permissions, and everything else the
/// controller (or the network) refused. `uniflow-core` maps these onto its
/// batch-level taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed, no session cookie was issued, or a request came back 401.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The session is valid but lacks permission for the request (HTTP 403).
    #[error("Access forbidden: {message}")]
    Forbidden { message: String },

    // ── Controller ──────────────────────────────────────────────────
    /// Any other non-success HTTP status, with the best upstream message.
    #[error("Controller API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),
}

impl Error {
    /// HTTP status attached to this error, if the controller answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } | Self::InvalidUrl(_) | Self::Tls(_) => None,
            Self::Forbidden { .. } => Some(403),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

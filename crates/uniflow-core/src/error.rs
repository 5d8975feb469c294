// ── Core error types ──
//
// The batch-level taxonomy hosts react to. Transport details from
// `uniflow-api` are folded into these four outcomes plus configuration
// and catalog errors that surface before any request is made.

use std::fmt;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::shaper::OutputRecord;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Routing ─────────────────────────────────────────────────────
    #[error("Unknown operation '{operation}' for resource '{resource}'")]
    UnknownOperation { resource: String, operation: String },

    // ── Controller outcomes ─────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Access forbidden: {message}")]
    AccessForbidden { message: String },

    #[error("UniFi API error: {message}")]
    OperationFailed {
        message: String,
        /// HTTP status, when the controller answered at all.
        status: Option<u16>,
    },

    // ── Setup ───────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl CoreError {
    /// `true` when no HTTP response was received (connection, DNS, TLS, timeout).
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::OperationFailed { status: None, .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<uniflow_api::Error> for CoreError {
    fn from(err: uniflow_api::Error) -> Self {
        match err {
            uniflow_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            uniflow_api::Error::Forbidden { message } => CoreError::AccessForbidden { message },
            uniflow_api::Error::Api { status, message } => CoreError::OperationFailed {
                message,
                status: Some(status),
            },
            uniflow_api::Error::Transport(e) => CoreError::OperationFailed {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
            uniflow_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            uniflow_api::Error::Tls(message) => CoreError::OperationFailed {
                message: format!("TLS error: {message}"),
                status: None,
            },
        }
    }
}

// ── Batch failures ───────────────────────────────────────────────────

/// A batch that stopped early.
///
/// `item_index` is `None` when the batch never got past authentication.
/// `partial` holds the records produced by items before the failing one.
#[derive(Debug)]
pub struct BatchError {
    pub item_index: Option<usize>,
    pub error: CoreError,
    pub partial: Vec<OutputRecord>,
}

impl BatchError {
    pub(crate) fn before_items(error: CoreError) -> Self {
        Self {
            item_index: None,
            error,
            partial: Vec::new(),
        }
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.item_index {
            Some(index) => write!(f, "item {index}: {}", self.error),
            None => self.error.fmt(f),
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

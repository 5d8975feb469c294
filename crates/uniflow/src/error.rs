//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and distinct exit codes.

use miette::Diagnostic;
use thiserror::Error;

use uniflow_config::ConfigError;
use uniflow_core::{BatchError, CoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the controller: {reason}")]
    #[diagnostic(
        code(uniflow::connection_failed),
        help(
            "Check that the controller is running and that server_url is the\n\
             versioned API base (e.g. https://unifi.local:8443/v2/api).\n\
             Self-signed certificate? Try --insecure (-k) or set ca_cert."
        )
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(uniflow::auth_failed),
        help(
            "Please check your username and password.\n\
             Run: uniflow config set-password --profile {profile}"
        )
    )]
    AuthFailed { message: String, profile: String },

    #[error("Access forbidden: {message}")]
    #[diagnostic(
        code(uniflow::forbidden),
        help("Check your credentials and permissions for this operation.")
    )]
    Forbidden { message: String },

    #[error("No {what} configured for profile '{profile}'")]
    #[diagnostic(
        code(uniflow::no_credentials),
        help(
            "Configure credentials with: uniflow config init\n\
             Or set UNIFLOW_USERNAME / UNIFLOW_PASSWORD."
        )
    )]
    NoCredentials { profile: String, what: String },

    // ── Operations ───────────────────────────────────────────────────
    #[error("Unknown operation '{operation}' for resource '{resource}'")]
    #[diagnostic(
        code(uniflow::unknown_operation),
        help("Run: uniflow catalog {resource}")
    )]
    UnknownOperation { resource: String, operation: String },

    #[error("UniFi API error: {message}")]
    #[diagnostic(code(uniflow::api_error))]
    ApiError { message: String },

    #[error("Batch stopped at item {index}")]
    #[diagnostic(code(uniflow::batch_failed))]
    BatchItem {
        index: usize,
        #[source]
        source: Box<CliError>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(uniflow::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(uniflow::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: uniflow config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(uniflow::no_config),
        help(
            "Create a profile with: uniflow config init --server-url <URL> --username <USER>\n\
             Or pass --server-url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(uniflow::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(uniflow::json), help("Check the file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML: {0}")]
    #[diagnostic(code(uniflow::yaml), help("Check the file contents and try again."))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::Validation { .. }
            | Self::UnknownOperation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            Self::BatchItem { source, .. } => source.exit_code(),
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the active profile name to authentication failures.
    pub fn for_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                message,
                profile: name.into(),
            },
            Self::BatchItem { index, source } => Self::BatchItem {
                index,
                source: Box::new(source.for_profile(name)),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        if err.is_connection_failure() {
            return CliError::ConnectionFailed {
                reason: err.to_string(),
            };
        }
        match err {
            CoreError::UnknownOperation {
                resource,
                operation,
            } => CliError::UnknownOperation {
                resource,
                operation,
            },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                message,
                profile: "default".into(),
            },
            CoreError::AccessForbidden { message } => CliError::Forbidden { message },
            CoreError::OperationFailed { message, .. } => CliError::ApiError { message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Catalog(e) => CliError::Validation {
                field: "catalog".into(),
                reason: e.to_string(),
            },
        }
    }
}

impl From<BatchError> for CliError {
    fn from(err: BatchError) -> Self {
        let inner = CliError::from(err.error);
        match err.item_index {
            Some(index) => CliError::BatchItem {
                index,
                source: Box::new(inner),
            },
            None => inner,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile, what } => CliError::NoCredentials {
                profile,
                what: what.into(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { profile, available } => CliError::ProfileNotFound {
                name: profile,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_distinguish_failure_kinds() {
        let auth = CliError::from(CoreError::AuthenticationFailed {
            message: "bad".into(),
        });
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let forbidden = CliError::from(CoreError::AccessForbidden {
            message: "no".into(),
        });
        assert_eq!(forbidden.exit_code(), exit_code::PERMISSION);

        let offline = CliError::from(CoreError::OperationFailed {
            message: "connection refused".into(),
            status: None,
        });
        assert_eq!(offline.exit_code(), exit_code::CONNECTION);

        let api = CliError::from(CoreError::OperationFailed {
            message: "api.err.Invalid".into(),
            status: Some(400),
        });
        assert_eq!(api.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn unknown_profile_lists_the_configured_ones() {
        let err = CliError::from(ConfigError::UnknownProfile {
            profile: "lab".into(),
            available: vec!["home".into(), "office".into()],
        });
        match err {
            CliError::ProfileNotFound {
                ref name,
                ref available,
            } => {
                assert_eq!(name, "lab");
                assert_eq!(available, "home, office");
            }
            ref other => panic!("expected ProfileNotFound, got: {other:?}"),
        }
        assert_eq!(err.exit_code(), exit_code::USAGE);

        let none = CliError::from(ConfigError::UnknownProfile {
            profile: "lab".into(),
            available: Vec::new(),
        });
        assert!(matches!(
            none,
            CliError::ProfileNotFound { ref available, .. } if available == "(none)"
        ));
    }

    #[test]
    fn batch_failures_keep_the_inner_exit_code() {
        let err = CliError::from(BatchError {
            item_index: Some(3),
            error: CoreError::AccessForbidden {
                message: "no".into(),
            },
            partial: Vec::new(),
        });
        assert!(matches!(err, CliError::BatchItem { index: 3, .. }));
        assert_eq!(err.exit_code(), exit_code::PERMISSION);
    }
}

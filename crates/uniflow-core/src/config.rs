// ── Runtime connection configuration ──
//
// These types describe *how* to reach a controller. They carry credential
// data and transport tuning, but never touch disk. Hosts (the CLI, tests)
// construct a `ControllerConfig` and hand it to the engine.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;
use uniflow_api::{TlsMode, TransportConfig};

/// The credential record: versioned API base plus login pair.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Versioned API base, e.g. `https://unifi.example.com:8443/v2/api`.
    pub server_url: Url,
    pub username: String,
    pub password: SecretString,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs). Default for local controllers.
    #[default]
    DangerAcceptInvalid,
}

/// Everything needed to run batches against a single controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub credentials: Credentials,
    pub tls: TlsVerification,
    /// Per-request timeout; bounds a hung call.
    pub timeout: Duration,
}

impl ControllerConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}

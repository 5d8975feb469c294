//! Profile configuration for uniflow.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `uniflow_core::ControllerConfig`. The binary layers
//! its command-line overrides on top of what this crate resolves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use uniflow_core::{ControllerConfig, Credentials, TlsVerification};

/// Keyring service name; entries are keyed `{profile}/password`.
pub const KEYRING_SERVICE: &str = "uniflow";

/// Fallback env vars for the login pair.
pub const USERNAME_ENV: &str = "UNIFLOW_USERNAME";
pub const PASSWORD_ENV: &str = "UNIFLOW_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found in config")]
    UnknownProfile {
        profile: String,
        available: Vec<String>,
    },

    #[error("no {what} configured for profile '{profile}'")]
    NoCredentials { profile: String, what: &'static str },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "json".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named controller profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Versioned API base (e.g., "https://unifi.example.com:8443/v2/api").
    pub server_url: String,

    pub username: Option<String>,

    /// Password (plaintext; prefer keyring or `password_env`).
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

impl Profile {
    /// The server URL, parsed. Empty or malformed URLs are validation errors.
    pub fn parsed_server_url(&self) -> Result<url::Url, ConfigError> {
        self.server_url
            .trim()
            .parse()
            .map_err(|e: url::ParseError| ConfigError::Validation {
                field: "server_url".into(),
                reason: format!("invalid URL '{}': {e}", self.server_url),
            })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "uniflow", "uniflow").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("uniflow");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, then `UNIFLOW_` environment overrides.
///
/// Nested keys use a double underscore: `UNIFLOW_DEFAULTS__TIMEOUT=60`.
/// A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("UNIFLOW_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`. Passwords are skipped.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile selection ───────────────────────────────────────────────

impl Config {
    /// Explicit name, else `default_profile`, else `"default"`.
    pub fn profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles.get(name).ok_or_else(|| ConfigError::UnknownProfile {
            profile: name.into(),
            available: self.profiles.keys().cloned().collect(),
        })
    }
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_account(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

/// Store a password in the system keyring for `profile_name`.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_account(profile_name))?;
    entry.set_password(password)?;
    Ok(())
}

fn keyring_password(profile_name: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &keyring_account(profile_name))
        .and_then(|entry| entry.get_password())
        .ok()
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Username from the profile, else `UNIFLOW_USERNAME`.
pub fn resolve_username(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    resolve_username_with(profile, profile_name, env_var)
}

/// Password: `password_env` var, `UNIFLOW_PASSWORD`, keyring, then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_password_with(profile, profile_name, env_var, keyring_password)
}

fn resolve_username_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    profile
        .username
        .clone()
        .filter(|u| !u.is_empty())
        .or_else(|| env(USERNAME_ENV))
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
            what: "username",
        })
}

fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(pw) = profile.password_env.as_deref().and_then(&env) {
        return Ok(SecretString::from(pw));
    }

    // 2. Global env var
    if let Some(pw) = env(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    // 3. System keyring
    if let Some(pw) = keyring(profile_name) {
        return Ok(SecretString::from(pw));
    }

    // 4. Plaintext in config
    profile
        .password
        .clone()
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
            what: "password",
        })
}

// ── Translation to core ─────────────────────────────────────────────

/// Assemble a `ControllerConfig` from already-resolved credentials.
pub fn build_controller_config(
    profile: &Profile,
    defaults: &Defaults,
    username: String,
    password: SecretString,
) -> Result<ControllerConfig, ConfigError> {
    let server_url = profile.parsed_server_url()?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = ControllerConfig::new(Credentials {
        server_url,
        username,
        password,
    });
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn profile() -> Profile {
        Profile {
            server_url: "https://unifi.example.com:8443/v2/api".into(),
            username: Some("admin".into()),
            ..Profile::default()
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "home"

[defaults]
timeout = 10

[profiles.home]
server_url = "https://10.0.0.1:8443/v2/api"
username = "admin"
password_env = "HOME_UNIFI_PW"
insecure = true
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.profile_name(None), "home");
        assert_eq!(config.profile_name(Some("lab")), "lab");
        assert_eq!(config.defaults.timeout, 10);
        assert_eq!(config.defaults.output, "json");

        let home = config.profile("home").unwrap();
        assert_eq!(home.password_env.as_deref(), Some("HOME_UNIFI_PW"));
        assert_eq!(home.insecure, Some(true));
        match config.profile("lab") {
            Err(ConfigError::UnknownProfile { profile, available }) => {
                assert_eq!(profile, "lab");
                assert_eq!(available, vec!["home".to_string()]);
            }
            other => panic!("expected UnknownProfile, got: {other:?}"),
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(config.profiles.is_empty());
        assert_eq!(config.default_profile.as_deref(), Some("default"));
    }

    #[test]
    fn saved_config_never_contains_passwords() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        let mut p = profile();
        p.password = Some("hunter2".into());
        config.profiles.insert("default".into(), p);
        save_config_to(&config, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("server_url"));
        assert!(!written.contains("hunter2"));
    }

    #[test]
    fn password_resolution_order() {
        let mut p = profile();
        p.password = Some("plain".into());
        p.password_env = Some("SITE_PW".into());

        let env = |name: &str| (name == "SITE_PW").then(|| "from-env".to_string());
        let keyring = |_: &str| Some("from-keyring".to_string());

        let pw = resolve_password_with(&p, "default", env, keyring).unwrap();
        assert_eq!(pw.expose_secret(), "from-env");

        let pw = resolve_password_with(&p, "default", no_env, keyring).unwrap();
        assert_eq!(pw.expose_secret(), "from-keyring");

        let pw = resolve_password_with(&p, "default", no_env, no_env).unwrap();
        assert_eq!(pw.expose_secret(), "plain");

        p.password = None;
        let err = resolve_password_with(&p, "default", no_env, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { what: "password", .. }));
    }

    #[test]
    fn username_falls_back_to_env() {
        let mut p = profile();
        p.username = None;
        let env = |name: &str| (name == USERNAME_ENV).then(|| "ops".to_string());
        assert_eq!(resolve_username_with(&p, "default", env).unwrap(), "ops");
        assert!(resolve_username_with(&p, "default", no_env).is_err());
    }

    #[test]
    fn tls_and_timeout_follow_profile_then_defaults() {
        let defaults = Defaults::default();
        let secret = || SecretString::from("pw".to_string());

        let cfg = build_controller_config(&profile(), &defaults, "admin".into(), secret()).unwrap();
        assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
        assert_eq!(cfg.timeout, Duration::from_secs(30));

        let mut p = profile();
        p.ca_cert = Some("/etc/unifi/ca.pem".into());
        p.timeout = Some(5);
        let cfg = build_controller_config(&p, &defaults, "admin".into(), secret()).unwrap();
        assert_eq!(cfg.tls, TlsVerification::CustomCa("/etc/unifi/ca.pem".into()));
        assert_eq!(cfg.timeout, Duration::from_secs(5));

        p.insecure = Some(true);
        let cfg = build_controller_config(&p, &defaults, "admin".into(), secret()).unwrap();
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn bad_server_url_is_a_validation_error() {
        let mut p = profile();
        p.server_url = "not a url".into();
        let err = build_controller_config(
            &p,
            &Defaults::default(),
            "admin".into(),
            SecretString::from("pw".to_string()),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }), "{err}");
    }
}

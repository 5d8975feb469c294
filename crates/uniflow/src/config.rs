//! CLI configuration: a thin layer over `uniflow_config`.
//!
//! Applies `GlobalOpts` flag overrides (--server-url, --username, ...) to
//! the selected profile and builds the engine the commands run on.

use std::path::Path;
use std::sync::Arc;

use clap::ValueEnum;
use secrecy::SecretString;

use uniflow_config::{Config, Profile};
use uniflow_core::{Catalog, ControllerConfig, CoreError, Engine, OperationSpec};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Loading ─────────────────────────────────────────────────────────

pub fn load() -> Result<Config, CliError> {
    Ok(uniflow_config::load_config()?)
}

/// `--output`, else the config default, else JSON.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&config.defaults.output, true).unwrap_or(OutputFormat::Json)
    })
}

/// The built-in catalog, or the one named by `--catalog`.
pub fn load_catalog(global: &GlobalOpts) -> Result<Catalog, CliError> {
    let catalog = match &global.catalog {
        Some(path) => Catalog::from_specs(read_specs(path)?),
        None => Catalog::unifi(),
    };
    catalog.map_err(|e| CliError::from(CoreError::from(e)))
}

fn read_specs(path: &Path) -> Result<Vec<OperationSpec>, CliError> {
    let text = std::fs::read_to_string(path)?;
    if path.extension().is_some_and(|ext| ext == "json") {
        Ok(serde_json::from_str(&text)?)
    } else {
        Ok(serde_yaml::from_str(&text)?)
    }
}

// ── Profile resolution ──────────────────────────────────────────────

/// Select the active profile and apply flag overrides to it.
fn effective_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = config.profile_name(global.profile.as_deref());

    let mut profile = match config.profile(&name) {
        Ok(profile) => profile.clone(),
        Err(_) if global.server_url.is_some() => Profile::default(),
        Err(err) if global.profile.is_some() => return Err(err.into()),
        Err(_) => {
            return Err(CliError::NoConfig {
                path: uniflow_config::config_path().display().to_string(),
            });
        }
    };

    if let Some(url) = &global.server_url {
        profile.server_url.clone_from(url);
    }
    if let Some(user) = &global.username {
        profile.username = Some(user.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    Ok((name, profile))
}

/// Translate profile + flags into a `ControllerConfig`.
pub fn controller_config(
    global: &GlobalOpts,
    config: &Config,
) -> Result<(String, ControllerConfig), CliError> {
    let (name, profile) = effective_profile(global, config)?;

    let username = uniflow_config::resolve_username(&profile, &name)?;
    let password = if global.ask_password {
        SecretString::from(rpassword::prompt_password("Password: ")?)
    } else {
        uniflow_config::resolve_password(&profile, &name)?
    };

    let controller =
        uniflow_config::build_controller_config(&profile, &config.defaults, username, password)?;
    Ok((name, controller))
}

/// Everything a controller-bound command needs.
pub fn engine(global: &GlobalOpts, config: &Config) -> Result<(String, Engine), CliError> {
    let catalog = load_catalog(global)?;
    let (name, controller) = controller_config(global, config)?;
    let engine = Engine::new(&controller, Arc::new(catalog))?;
    Ok((name, engine))
}

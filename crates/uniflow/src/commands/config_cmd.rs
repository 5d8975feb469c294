//! Config subcommand handlers.

use uniflow_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

fn prompt_and_store(profile_name: &str) -> Result<(), CliError> {
    let password = rpassword::prompt_password(format!("Password for '{profile_name}': "))?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    uniflow_config::store_password(profile_name, &password)?;
    eprintln!("✓ Password stored in system keyring");
    Ok(())
}

fn required(value: Option<&String>, flag: &str) -> Result<String, CliError> {
    value.cloned().ok_or_else(|| CliError::Validation {
        field: flag.into(),
        reason: "required for `config init`".into(),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init {
            password_env,
            keyring,
            default,
        } => {
            let server_url = required(global.server_url.as_ref(), "--server-url")?;
            let username = required(global.username.as_ref(), "--username")?;

            let path = uniflow_config::config_path();
            let mut cfg = uniflow_config::load_config_from(&path)?;
            let profile_name = global.profile.clone().unwrap_or_else(|| "default".into());

            let profile = Profile {
                server_url,
                username: Some(username),
                password_env,
                insecure: global.insecure.then_some(true),
                timeout: global.timeout,
                ..Profile::default()
            };
            profile.parsed_server_url()?;

            cfg.profiles.insert(profile_name.clone(), profile);
            if default || cfg.profiles.len() == 1 {
                cfg.default_profile = Some(profile_name.clone());
            }

            if keyring {
                prompt_and_store(&profile_name)?;
            }

            uniflow_config::save_config_to(&cfg, &path)?;
            if !global.quiet {
                eprintln!("✓ Profile '{profile_name}' written to {}", path.display());
                eprintln!("  Test it: uniflow check --profile {profile_name}");
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg: Config = config::load()?;
            let format = config::output_format(global, &cfg);
            output::print_output(&output::render_single(format, &cfg)?, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", uniflow_config::config_path().display());
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword => {
            let cfg = config::load()?;
            let profile_name = cfg.profile_name(global.profile.as_deref());
            prompt_and_store(&profile_name)
        }
    }
}

//! `uniflow check`: login only, nothing else is sent.

use uniflow_config::Config;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;

pub async fn handle(global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let (profile, engine) = config::engine(global, cfg)?;
    engine
        .check_credentials()
        .await
        .map_err(|e| CliError::from(e).for_profile(&profile))?;

    if !global.quiet {
        eprintln!("✓ Credentials accepted (profile '{profile}')");
    }
    Ok(())
}

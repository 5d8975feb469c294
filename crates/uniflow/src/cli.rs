//! Clap derive structures for the `uniflow` CLI.
//!
//! Defines the command tree, global flags, and shared value types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// uniflow -- run UniFi controller operations as workflow steps
#[derive(Debug, Parser)]
#[command(
    name = "uniflow",
    version,
    about = "Run UniFi controller operations as workflow steps",
    long_about = "Executes catalog operations (sites, clients, devices, networks,\n\
        access control, RADIUS users, monitoring) against a UniFi controller.\n\n\
        One login per batch; every record is printed in input order.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "UNIFLOW_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Versioned API base URL, e.g. https://unifi.local:8443/v2/api (overrides profile)
    #[arg(long, env = "UNIFLOW_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    /// Login username (overrides profile)
    #[arg(long, short = 'u', global = true)]
    pub username: Option<String>,

    /// Prompt for the password instead of resolving it from config
    #[arg(long, global = true)]
    pub ask_password: bool,

    /// Operation catalog file (YAML or JSON) replacing the built-in one
    #[arg(long, env = "UNIFLOW_CATALOG", global = true)]
    pub catalog: Option<PathBuf>,

    /// Output format [default: from config, else json]
    #[arg(long, short = 'o', env = "UNIFLOW_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "UNIFLOW_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "UNIFLOW_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// One compact JSON document per line
    Ndjson,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a single operation
    #[command(alias = "r")]
    Run(RunArgs),

    /// Run a batch of invocations from a JSON or YAML file
    #[command(alias = "b")]
    Batch(BatchArgs),

    /// List available resources and operations
    #[command(alias = "ops")]
    Catalog(CatalogArgs),

    /// Verify credentials with a login-only request
    Check,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Run / Batch ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Resource name (e.g. client, device, sitesAndMonitoring)
    pub resource: String,

    /// Operation name (e.g. listActiveClients)
    pub operation: String,

    /// Parameter as NAME=VALUE (string) or NAME:=JSON (number, bool, object...)
    #[arg(long = "param", short = 'P', value_parser = parse_param)]
    pub params: Vec<(String, Value)>,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Batch file (`-` for stdin): a list of {resource, operation, parameters}
    pub file: PathBuf,
}

/// Parse `NAME=VALUE` as a string, or `NAME:=JSON` as a typed value.
///
/// `macAddress=001122334455` stays a string; `tunnelType:=13` is a number.
pub fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE or NAME:=JSON, got '{raw}'"))?;

    let (name, value) = match name.strip_suffix(':') {
        Some(name) => {
            let json = serde_json::from_str(value)
                .map_err(|e| format!("invalid JSON for '{name}': {e}"))?;
            (name, json)
        }
        None => (name, Value::String(value.into())),
    };

    if name.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }
    Ok((name.into(), value))
}

// ── Catalog ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Only list operations for this resource
    pub resource: Option<String>,

    /// Print the full operation specs (templates and fields) instead of a summary
    #[arg(long)]
    pub specs: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a profile from --server-url and --username to the config file
    Init {
        /// Environment variable to read the password from
        #[arg(long)]
        password_env: Option<String>,

        /// Prompt for the password and store it in the system keyring
        #[arg(long)]
        keyring: bool,

        /// Make this profile the default
        #[arg(long)]
        default: bool,
    },

    /// Display the loaded configuration (passwords omitted)
    Show,

    /// Print the config file path
    Path,

    /// Store a password in the system keyring
    SetPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use clap::CommandFactory;
    use serde_json::json;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn params_are_strings_unless_marked_json() {
        assert_eq!(parse_param("siteId=default").unwrap(), ("siteId".into(), json!("default")));
        assert_eq!(parse_param("siteId=0042").unwrap(), ("siteId".into(), json!("0042")));
        assert_eq!(
            parse_param("macAddress=001122334455").unwrap(),
            ("macAddress".into(), json!("001122334455"))
        );
        assert_eq!(parse_param("vlan=").unwrap(), ("vlan".into(), json!("")));
        assert_eq!(parse_param("x=a=b").unwrap(), ("x".into(), json!("a=b")));
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=1").is_err());
    }

    #[test]
    fn json_params_keep_their_type() {
        assert_eq!(parse_param("tunnelType:=13").unwrap(), ("tunnelType".into(), json!(13)));
        assert_eq!(parse_param("enabled:=false").unwrap(), ("enabled".into(), json!(false)));
        assert_eq!(
            parse_param("limits:={\"up\":10}").unwrap(),
            ("limits".into(), json!({ "up": 10 }))
        );
        assert!(parse_param("tunnelType:=thirteen").is_err());
        assert!(parse_param(":=1").is_err());
    }
}

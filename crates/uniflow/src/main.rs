mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.quiet);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, quiet: bool) {
    let filter = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a controller
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "uniflow", &mut std::io::stdout());
            Ok(())
        }

        Command::Catalog(args) => {
            let cfg = config::load()?;
            commands::catalog::handle(&args, &cli.global, &cfg)
        }

        // Everything else talks to the controller
        Command::Run(args) => {
            let cfg = config::load()?;
            commands::run::handle(args, &cli.global, &cfg).await
        }
        Command::Batch(args) => {
            let cfg = config::load()?;
            commands::batch::handle(args, &cli.global, &cfg).await
        }
        Command::Check => {
            let cfg = config::load()?;
            commands::check::handle(&cli.global, &cfg).await
        }
    }
}

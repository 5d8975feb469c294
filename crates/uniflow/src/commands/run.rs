//! `uniflow run <resource> <operation> [-P NAME=VALUE]...`

use uniflow_config::Config;
use uniflow_core::Invocation;

use crate::cli::{GlobalOpts, RunArgs};
use crate::error::CliError;

pub async fn handle(args: RunArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let mut invocation = Invocation::new(&args.resource, &args.operation);
    invocation.parameters.extend(args.params);

    super::batch::execute(&[invocation], global, cfg).await
}

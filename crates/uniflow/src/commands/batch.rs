//! `uniflow batch <file>`: many invocations under one login.

use std::io::Read;
use std::path::Path;

use tracing::debug;
use uniflow_config::Config;
use uniflow_core::Invocation;

use crate::cli::{BatchArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: BatchArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let invocations = read_invocations(&args.file)?;
    debug!(items = invocations.len(), file = %args.file.display(), "loaded batch");
    execute(&invocations, global, cfg).await
}

/// Run `invocations` and print every record produced, including those
/// from items before a failure.
pub async fn execute(
    invocations: &[Invocation],
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(), CliError> {
    let format = config::output_format(global, cfg);
    let (profile, engine) = config::engine(global, cfg)?;

    match engine.run_batch(invocations).await {
        Ok(records) => {
            output::print_output(&output::render_records(format, &records)?, global.quiet);
            Ok(())
        }
        Err(err) => {
            output::print_output(&output::render_records(format, &err.partial)?, global.quiet);
            Err(CliError::from(err).for_profile(&profile))
        }
    }
}

/// JSON or YAML list of invocations; `-` reads stdin.
fn read_invocations(path: &Path) -> Result<Vec<Invocation>, CliError> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };

    if path.extension().is_some_and(|ext| ext == "json") {
        Ok(serde_json::from_str(&text)?)
    } else {
        Ok(serde_yaml::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn reads_yaml_and_json_batches() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("batch.yaml");
        std::fs::write(
            &yaml,
            "- resource: client\n  operation: listActiveClients\n  parameters:\n    siteId: default\n",
        )
        .unwrap();
        let items = read_invocations(&yaml).unwrap();
        assert_eq!(items[0].parameters["siteId"], json!("default"));

        let json_path = dir.path().join("batch.json");
        std::fs::write(
            &json_path,
            r#"[{"resource":"site","operation":"getMany"},{"resource":"device","operation":"listAllDevices","parameters":{"siteId":"hq"}}]"#,
        )
        .unwrap();
        let items = read_invocations(&json_path).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].operation, "listAllDevices");
    }
}

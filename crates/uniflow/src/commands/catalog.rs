//! `uniflow catalog [resource]`: list what can be run.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;
use uniflow_config::Config;
use uniflow_core::{Catalog, OperationDescriptor, Resource, unifi_specs};

use crate::cli::{CatalogArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Clone, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct OperationRow {
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Operation")]
    operation: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Description")]
    display_name: String,
}

impl From<&OperationDescriptor> for OperationRow {
    fn from(d: &OperationDescriptor) -> Self {
        Self {
            resource: d.resource.to_string(),
            operation: d.operation.clone(),
            method: d.method.to_string(),
            path: d.url.to_string(),
            display_name: d.display_name.clone(),
        }
    }
}

pub fn handle(args: &CatalogArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let format = config::output_format(global, cfg);
    let resource = args.resource.as_deref().map(parse_resource).transpose()?;

    let out = if args.specs {
        if global.catalog.is_some() {
            return Err(CliError::Validation {
                field: "--specs".into(),
                reason: "specs are only available for the built-in catalog".into(),
            });
        }
        let specs: Vec<_> = unifi_specs()
            .into_iter()
            .filter(|s| resource.is_none_or(|r| s.resource == r))
            .collect();
        output::render_single(format, &specs)?
    } else {
        let catalog = config::load_catalog(global)?;
        let rows = rows(&catalog, resource);
        output::render_list(format, &rows, OperationRow::clone)?
    };

    output::print_output(&out, global.quiet);
    Ok(())
}

fn rows(catalog: &Catalog, resource: Option<Resource>) -> Vec<OperationRow> {
    match resource {
        Some(r) => catalog.operations(r).map(OperationRow::from).collect(),
        None => catalog.iter().map(OperationRow::from).collect(),
    }
}

fn parse_resource(name: &str) -> Result<Resource, CliError> {
    name.parse().map_err(|_| CliError::Validation {
        field: "resource".into(),
        reason: format!(
            "unknown resource '{name}'. Valid resources: {}",
            valid_resources()
        ),
    })
}

fn valid_resources() -> String {
    Resource::iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

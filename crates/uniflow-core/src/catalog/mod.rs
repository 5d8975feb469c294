// ── Operation catalog ──
//
// Maps `(resource, operation)` to a fully parsed `OperationDescriptor`.
// Specs are plain data (serde-friendly, written in the textual template
// format); `CatalogBuilder::build` parses and validates them once, so a
// typo in a template or a duplicate operation name fails at startup.

mod unifi;

pub use unifi::unifi_specs;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::error::CoreError;
use crate::template::{TemplateError, TemplateValue, UrlTemplate};

// ── Errors ──────────────────────────────────────────────────────────

/// A catalog that failed construction-time validation.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate operation '{operation}' for resource '{resource}'")]
    DuplicateOperation { resource: Resource, operation: String },

    #[error("invalid URL template for {resource}.{operation}: {source}")]
    InvalidTemplate {
        resource: Resource,
        operation: String,
        #[source]
        source: TemplateError,
    },

    #[error("{resource}.{operation} references undeclared parameter '{parameter}'")]
    UndeclaredParameter {
        resource: Resource,
        operation: String,
        parameter: String,
    },
}

// ── Vocabulary ──────────────────────────────────────────────────────

/// Resource groups exposed by the controller node.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Site,
    Client,
    Device,
    Network,
    InternetAccessControl,
    User,
    SitesAndMonitoring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl From<HttpMethod> for uniflow_api::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
        }
    }
}

/// A parameter an operation reads, with the host-side default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn required(name: &str) -> Self {
        Self {
            name: name.into(),
            default: None,
            required: true,
        }
    }

    pub fn optional(name: &str, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
            required: false,
        }
    }

    /// Mark this field required while keeping its default.
    pub fn and_required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Response post-processing: split the array at `split_field` into records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputShaping {
    pub split_field: String,
}

// ── Specs (unparsed) ────────────────────────────────────────────────

/// Declarative, unvalidated operation definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSpec {
    pub resource: Resource,
    pub operation: String,
    #[serde(default)]
    pub display_name: String,
    pub method: HttpMethod,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_field: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl OperationSpec {
    pub fn new(
        resource: Resource,
        operation: &str,
        display_name: &str,
        method: HttpMethod,
        url: &str,
    ) -> Self {
        Self {
            resource,
            operation: operation.into(),
            display_name: display_name.into(),
            method,
            url: url.into(),
            body: None,
            split_field: None,
            fields: Vec::new(),
        }
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn split_field(mut self, field: &str) -> Self {
        self.split_field = Some(field.into());
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    fn parse(self) -> Result<OperationDescriptor, CatalogError> {
        let url = UrlTemplate::parse(&self.url).map_err(|source| CatalogError::InvalidTemplate {
            resource: self.resource,
            operation: self.operation.clone(),
            source,
        })?;
        let body = self.body.as_ref().map(TemplateValue::parse);

        let referenced = url
            .parameters()
            .chain(body.iter().flat_map(TemplateValue::parameters));
        for parameter in referenced {
            if !self.fields.iter().any(|f| f.name == parameter) {
                return Err(CatalogError::UndeclaredParameter {
                    resource: self.resource,
                    operation: self.operation,
                    parameter: parameter.to_owned(),
                });
            }
        }

        Ok(OperationDescriptor {
            resource: self.resource,
            operation: self.operation,
            display_name: self.display_name,
            method: self.method,
            url,
            body,
            shaping: self.split_field.map(|split_field| OutputShaping { split_field }),
            fields: self.fields,
        })
    }
}

// ── Descriptors (parsed) ────────────────────────────────────────────

/// A validated, immutable operation: request template plus shaping.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    pub resource: Resource,
    pub operation: String,
    pub display_name: String,
    pub method: HttpMethod,
    pub url: UrlTemplate,
    pub body: Option<TemplateValue>,
    pub shaping: Option<OutputShaping>,
    pub fields: Vec<FieldSpec>,
}

impl OperationDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// ── Catalog ─────────────────────────────────────────────────────────

/// Read-only `(resource, operation)` table, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    resources: IndexMap<Resource, IndexMap<String, OperationDescriptor>>,
}

#[derive(Debug, Default)]
pub struct CatalogBuilder {
    specs: Vec<OperationSpec>,
}

impl CatalogBuilder {
    pub fn operation(mut self, spec: OperationSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn operations(mut self, specs: impl IntoIterator<Item = OperationSpec>) -> Self {
        self.specs.extend(specs);
        self
    }

    /// Parse every template and reject duplicates or undeclared parameters.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let mut resources: IndexMap<Resource, IndexMap<String, OperationDescriptor>> =
            IndexMap::new();

        for spec in self.specs {
            let descriptor = spec.parse()?;
            let ops = resources.entry(descriptor.resource).or_default();
            if ops.contains_key(&descriptor.operation) {
                return Err(CatalogError::DuplicateOperation {
                    resource: descriptor.resource,
                    operation: descriptor.operation,
                });
            }
            ops.insert(descriptor.operation.clone(), descriptor);
        }

        Ok(Catalog { resources })
    }
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Build a catalog from externally supplied specs (e.g. a YAML file).
    pub fn from_specs(specs: Vec<OperationSpec>) -> Result<Self, CatalogError> {
        Self::builder().operations(specs).build()
    }

    /// Look up by wire names. Unknown resource or operation is an error.
    pub fn lookup(&self, resource: &str, operation: &str) -> Result<&OperationDescriptor, CoreError> {
        resource
            .parse::<Resource>()
            .ok()
            .and_then(|r| self.get(r, operation))
            .ok_or_else(|| CoreError::UnknownOperation {
                resource: resource.into(),
                operation: operation.into(),
            })
    }

    pub fn get(&self, resource: Resource, operation: &str) -> Option<&OperationDescriptor> {
        self.resources.get(&resource)?.get(operation)
    }

    pub fn operations(&self, resource: Resource) -> impl Iterator<Item = &OperationDescriptor> {
        self.resources
            .get(&resource)
            .into_iter()
            .flat_map(IndexMap::values)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.resources.values().flat_map(IndexMap::values)
    }

    pub fn len(&self) -> usize {
        self.resources.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    fn spec(op: &str, url: &str) -> OperationSpec {
        OperationSpec::new(Resource::Client, op, op, HttpMethod::Get, url)
            .field(FieldSpec::required("siteId"))
    }

    #[test]
    fn lookup_by_wire_names() {
        let catalog = Catalog::builder()
            .operation(spec("listActiveClients", "=/api/s/{{ $parameter.siteId }}/stat/sta"))
            .build()
            .unwrap();

        let d = catalog.lookup("client", "listActiveClients").unwrap();
        assert_eq!(d.method, HttpMethod::Get);
        assert_eq!(d.resource, Resource::Client);
    }

    #[test]
    fn unknown_pairs_are_errors() {
        let catalog = Catalog::builder()
            .operation(spec("listActiveClients", "/api/s/default/stat/sta"))
            .build()
            .unwrap();

        for (r, o) in [("client", "nope"), ("gadget", "listActiveClients"), ("device", "listActiveClients")] {
            match catalog.lookup(r, o) {
                Err(CoreError::UnknownOperation { resource, operation }) => {
                    assert_eq!(resource, r);
                    assert_eq!(operation, o);
                }
                other => panic!("expected UnknownOperation, got: {other:?}"),
            }
        }
    }

    #[test]
    fn duplicates_are_rejected() {
        let err = Catalog::builder()
            .operation(spec("a", "/x"))
            .operation(spec("a", "/y"))
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateOperation { .. }), "{err}");
    }

    #[test]
    fn same_operation_name_under_different_resources_is_fine() {
        let catalog = Catalog::builder()
            .operation(spec("getMany", "/x"))
            .operation(OperationSpec::new(Resource::Site, "getMany", "List", HttpMethod::Get, "/y"))
            .build()
            .unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn bad_url_template_is_rejected() {
        let err = Catalog::builder()
            .operation(spec("broken", "=/api/s/{{ $parameter.siteId"))
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidTemplate { .. }), "{err}");
    }

    #[test]
    fn undeclared_parameters_are_rejected() {
        let err = Catalog::builder()
            .operation(
                spec("block", "=/api/s/{{ $parameter.siteId }}/cmd/stamgr")
                    .body(json!({ "cmd": "block-sta", "mac": "={{ $parameter.macAdress }}" })),
            )
            .build()
            .unwrap_err();
        match err {
            CatalogError::UndeclaredParameter { parameter, .. } => assert_eq!(parameter, "macAdress"),
            other => panic!("expected UndeclaredParameter, got: {other:?}"),
        }
    }

    #[test]
    fn specs_deserialize_from_yaml() {
        let yaml = r#"
- resource: device
  operation: restartDevice
  displayName: Restart Device
  method: POST
  url: "=/api/s/{{ $parameter.siteId }}/cmd/devmgr"
  body:
    cmd: restart
    mac: "={{ $parameter.macAddress }}"
  fields:
    - name: siteId
      required: true
    - name: macAddress
      required: true
"#;
        let specs: Vec<OperationSpec> = serde_yaml::from_str(yaml).unwrap();
        let catalog = Catalog::from_specs(specs).unwrap();
        let d = catalog.lookup("device", "restartDevice").unwrap();
        assert_eq!(d.display_name, "Restart Device");
        assert_eq!(d.method, HttpMethod::Post);
        assert!(d.field("macAddress").unwrap().required);
    }

    #[test]
    fn resource_wire_names_round_trip() {
        assert_eq!(Resource::InternetAccessControl.to_string(), "internetAccessControl");
        assert_eq!(
            "sitesAndMonitoring".parse::<Resource>().unwrap(),
            Resource::SitesAndMonitoring
        );
    }
}

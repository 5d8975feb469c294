// uniflow-core: Operation routing and batch execution between hosts and uniflow-api.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod params;
pub mod shaper;
pub mod template;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::{
    Catalog, CatalogBuilder, CatalogError, FieldSpec, HttpMethod, OperationDescriptor,
    OperationSpec, OutputShaping, Resource, unifi_specs,
};
pub use config::{ControllerConfig, Credentials, TlsVerification};
pub use engine::{Engine, PreparedRequest};
pub use error::{BatchError, CoreError};
pub use params::{Invocation, ItemParams, ParameterSource, SPLIT_PARAM};
pub use shaper::{OutputRecord, shape};
pub use template::{ParamLookup, Placeholder, TemplateError, TemplateValue, UrlTemplate};

// ── Parameter sources ──
//
// The host-facing side of template resolution. A batch is any
// `ParameterSource`; each item is resolved through the descriptor's field
// specs so field defaults apply before a placeholder's own `||` default.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::OperationDescriptor;
use crate::template::{ParamLookup, value_to_text};

/// Selects the resource for an item.
pub const RESOURCE_PARAM: &str = "resource";
/// Selects the operation for an item.
pub const OPERATION_PARAM: &str = "operation";
/// Per-item toggle: boolean `true` splits the shaped array into records.
pub const SPLIT_PARAM: &str = "splitIntoItems";

/// Per-item parameter values supplied by the host.
pub trait ParameterSource {
    fn item_count(&self) -> usize;

    /// The host-bound value of `name` for item `item_index`, if any.
    fn parameter(&self, item_index: usize, name: &str) -> Option<Value>;
}

/// One invocation as it appears in a batch file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    pub resource: String,
    pub operation: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl Invocation {
    pub fn new(resource: &str, operation: &str) -> Self {
        Self {
            resource: resource.into(),
            operation: operation.into(),
            parameters: Map::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

impl ParameterSource for [Invocation] {
    fn item_count(&self) -> usize {
        self.len()
    }

    fn parameter(&self, item_index: usize, name: &str) -> Option<Value> {
        let item = self.get(item_index)?;
        match name {
            RESOURCE_PARAM => Some(Value::String(item.resource.clone())),
            OPERATION_PARAM => Some(Value::String(item.operation.clone())),
            _ => item.parameters.get(name).cloned(),
        }
    }
}

/// The selector string for an item (`resource` or `operation`).
pub(crate) fn selector<S: ParameterSource + ?Sized>(
    source: &S,
    item_index: usize,
    name: &str,
) -> String {
    source
        .parameter(item_index, name)
        .map(|v| value_to_text(&v))
        .unwrap_or_default()
}

/// Parameter view of one item, bound to the operation it invokes.
pub struct ItemParams<'a, S: ?Sized> {
    source: &'a S,
    item_index: usize,
    descriptor: &'a OperationDescriptor,
}

impl<'a, S: ParameterSource + ?Sized> ItemParams<'a, S> {
    pub fn new(source: &'a S, item_index: usize, descriptor: &'a OperationDescriptor) -> Self {
        Self {
            source,
            item_index,
            descriptor,
        }
    }

    /// Host value, else the field default. `null` counts as unbound.
    pub fn value(&self, name: &str) -> Option<Value> {
        self.source
            .parameter(self.item_index, name)
            .filter(|v| !v.is_null())
            .or_else(|| self.descriptor.field(name)?.default.clone())
    }

    pub fn split_requested(&self) -> bool {
        matches!(self.value(SPLIT_PARAM), Some(Value::Bool(true)))
    }

    /// Required fields with neither a host value nor a default.
    pub fn missing_required(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.descriptor
            .fields
            .iter()
            .filter(|f| f.required && self.value(&f.name).is_none())
            .map(|f| f.name.as_str())
    }
}

impl<S: ParameterSource + ?Sized> ParamLookup for ItemParams<'_, S> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.value(name)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;
    use crate::catalog::Catalog;

    fn batch() -> Vec<Invocation> {
        vec![
            Invocation::new("site", "createRadiusUser")
                .param("siteId", "default")
                .param("name", "alice")
                .param("tunnelType", 13),
            Invocation::new("client", "listActiveClients")
                .param("siteId", "hq")
                .param(SPLIT_PARAM, false),
        ]
    }

    #[test]
    fn selectors_come_from_the_invocation() {
        let items = batch();
        assert_eq!(items.item_count(), 2);
        assert_eq!(selector(items.as_slice(), 0, RESOURCE_PARAM), "site");
        assert_eq!(selector(items.as_slice(), 1, OPERATION_PARAM), "listActiveClients");
        assert_eq!(selector(items.as_slice(), 5, RESOURCE_PARAM), "");
    }

    #[test]
    fn host_values_win_over_field_defaults() {
        let catalog = Catalog::unifi().unwrap();
        let items = batch();
        let d = catalog.lookup("site", "createRadiusUser").unwrap();
        let params = ItemParams::new(items.as_slice(), 0, d);

        assert_eq!(params.value("tunnelType"), Some(json!(13)));
        assert_eq!(params.value("tunnelMediumType"), Some(json!(1)));
        assert_eq!(params.value("vlan"), Some(json!("")));
        assert_eq!(params.value("nonexistent"), None);
    }

    #[test]
    fn missing_required_fields_are_reported() {
        let catalog = Catalog::unifi().unwrap();
        let items = batch();
        let d = catalog.lookup("site", "createRadiusUser").unwrap();
        let params = ItemParams::new(items.as_slice(), 0, d);

        let missing: Vec<_> = params.missing_required().collect();
        assert_eq!(missing, vec!["password"]);
    }

    #[test]
    fn split_defaults_on_and_can_be_disabled() {
        let catalog = Catalog::unifi().unwrap();
        let d = catalog.lookup("client", "listActiveClients").unwrap();

        let on = vec![Invocation::new("client", "listActiveClients").param("siteId", "x")];
        assert!(ItemParams::new(on.as_slice(), 0, d).split_requested());

        let off = batch();
        assert!(!ItemParams::new(off.as_slice(), 1, d).split_requested());
    }

    #[test]
    fn invocations_deserialize_without_parameters() {
        let items: Vec<Invocation> =
            serde_json::from_value(json!([{ "resource": "site", "operation": "getMany" }])).unwrap();
        assert_eq!(items[0], Invocation::new("site", "getMany"));
    }
}

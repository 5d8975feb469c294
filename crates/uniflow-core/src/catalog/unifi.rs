// Built-in operation table for UniFi controllers.
//
// `/api/...` paths hit the management API on the controller origin; the
// `/site/...` RADIUS paths hit the versioned API base.

use serde_json::json;

use super::{Catalog, CatalogError, FieldSpec, HttpMethod, OperationSpec, Resource};

const SPLIT: &str = "splitIntoItems";

fn site_id() -> FieldSpec {
    FieldSpec::required("siteId")
}

fn mac() -> FieldSpec {
    FieldSpec::required("macAddress")
}

fn split() -> FieldSpec {
    FieldSpec::optional(SPLIT, true)
}

/// A site-scoped GET whose `data` array can be split into records.
fn site_list(resource: Resource, operation: &str, display: &str, url: &str) -> OperationSpec {
    OperationSpec::new(resource, operation, display, HttpMethod::Get, url)
        .field(site_id())
        .field(split())
        .split_field("data")
}

fn stamgr(operation: &str, display: &str, cmd: &str) -> OperationSpec {
    OperationSpec::new(
        Resource::Client,
        operation,
        display,
        HttpMethod::Post,
        "=/api/s/{{ $parameter.siteId }}/cmd/stamgr",
    )
    .body(json!({ "cmd": cmd, "mac": "={{ $parameter.macAddress }}" }))
    .field(site_id())
    .field(mac())
}

fn wifi_body() -> serde_json::Value {
    json!({
        "name": "={{ $parameter.name }}",
        "x_passphrase": "={{ $parameter.password }}",
        "security": "={{ $parameter.security }}",
        "wpa_mode": "={{ $parameter.wpaMode }}",
        "enabled": "={{ $parameter.enabled }}",
        "is_guest": "={{ $parameter.isGuest }}",
        "vlan_enabled": "={{ $parameter.vlanEnabled }}",
    })
}

fn wifi_fields(spec: OperationSpec) -> OperationSpec {
    spec.field(FieldSpec::required("name"))
        .field(FieldSpec::required("password"))
        .field(FieldSpec::optional("security", "wpapsk").and_required())
        .field(FieldSpec::optional("wpaMode", "wpa2").and_required())
        .field(FieldSpec::optional("enabled", true).and_required())
        .field(FieldSpec::optional("isGuest", false))
        .field(FieldSpec::optional("vlanEnabled", false).and_required())
}

fn site_ops() -> Vec<OperationSpec> {
    vec![
        OperationSpec::new(
            Resource::Site,
            "createRadiusUser",
            "Create RADIUS User",
            HttpMethod::Post,
            "=/site/{{ $parameter.siteId }}/radius/users/batch_add",
        )
        .body(json!([{
            "name": "={{ $parameter.name }}",
            "x_password": "={{ $parameter.password }}",
            "vlan": "={{ $parameter.vlan || \"\" }}",
            "tunnel_type": "={{ $parameter.tunnelType || 3 }}",
            "tunnel_medium_type": "={{ $parameter.tunnelMediumType || 1 }}",
        }]))
        .field(site_id())
        .field(FieldSpec::required("name"))
        .field(FieldSpec::required("password"))
        .field(FieldSpec::optional("vlan", ""))
        .field(FieldSpec::optional("tunnelType", 3))
        .field(FieldSpec::optional("tunnelMediumType", 1)),
        OperationSpec::new(
            Resource::Site,
            "createSite",
            "Create Site",
            HttpMethod::Post,
            "/api/s/default/cmd/sitemgr",
        )
        .body(json!({ "cmd": "add-site", "desc": "={{ $parameter.name }}" }))
        .field(FieldSpec::required("name")),
        OperationSpec::new(
            Resource::Site,
            "deleteSite",
            "Delete Site",
            HttpMethod::Post,
            "/api/s/default/cmd/sitemgr",
        )
        .body(json!({ "cmd": "delete-site", "site": "={{ $parameter.longSiteId }}" }))
        .field(FieldSpec::required("longSiteId")),
        OperationSpec::new(
            Resource::Site,
            "getRadiusUsers",
            "Get RADIUS Users",
            HttpMethod::Get,
            "=/site/{{ $parameter.siteId }}/radius/users",
        )
        .field(site_id()),
        site_list(
            Resource::Site,
            "getSiteHealth",
            "Get Site Health",
            "=/api/s/{{ $parameter.siteId }}/stat/health",
        ),
        OperationSpec::new(Resource::Site, "getMany", "List Sites", HttpMethod::Get, "/api/self/sites")
            .field(split())
            .split_field("data"),
    ]
}

fn client_ops() -> Vec<OperationSpec> {
    vec![
        stamgr("blockClient", "Block Client", "block-sta"),
        stamgr("disconnectClient", "Disconnect Client", "disconnect-sta"),
        site_list(
            Resource::Client,
            "listActiveClients",
            "List Active Clients",
            "=/api/s/{{ $parameter.siteId }}/stat/sta",
        ),
        site_list(
            Resource::Client,
            "listAllClients",
            "List All Clients",
            "=/api/s/{{ $parameter.siteId }}/stat/alluser",
        ),
        site_list(
            Resource::Client,
            "getClientDetails",
            "List Client Details",
            "=/api/s/{{ $parameter.siteId }}/stat/user/{{ $parameter.macAddress }}",
        )
        .field(mac()),
        stamgr("unblockClient", "Unblock Client", "unblock-sta"),
    ]
}

fn device_ops() -> Vec<OperationSpec> {
    let devmgr = "=/api/s/{{ $parameter.siteId }}/cmd/devmgr";
    vec![
        site_list(
            Resource::Device,
            "listAllDevices",
            "List All Devices",
            "=/api/s/{{ $parameter.siteId }}/stat/device",
        ),
        site_list(
            Resource::Device,
            "getDeviceInfo",
            "List Device Info",
            "=/api/s/{{ $parameter.siteId }}/stat/device/{{ $parameter.macAddress }}",
        )
        .field(mac()),
        site_list(
            Resource::Device,
            "getDeviceStats",
            "List Device Stats",
            "=/api/s/{{ $parameter.siteId }}/stat/device/{{ $parameter.macAddress }}/stats",
        )
        .field(mac()),
        OperationSpec::new(Resource::Device, "restartDevice", "Restart Device", HttpMethod::Post, devmgr)
            .body(json!({
                "cmd": "restart",
                "mac": "={{ $parameter.macAddress }}",
                "reboot_type": "soft",
            }))
            .field(site_id())
            .field(mac()),
        OperationSpec::new(
            Resource::Device,
            "upgradeDeviceFirmware",
            "Upgrade Device Firmware",
            HttpMethod::Post,
            devmgr,
        )
        .body(json!({ "cmd": "upgrade", "mac": "={{ $parameter.macAddress }}" }))
        .field(site_id())
        .field(mac()),
    ]
}

fn network_ops() -> Vec<OperationSpec> {
    let collection = "=/api/s/{{ $parameter.siteId }}/rest/networkconf";
    let item = "=/api/s/{{ $parameter.siteId }}/rest/networkconf/{{ $parameter.networkId }}";
    vec![
        wifi_fields(
            OperationSpec::new(Resource::Network, "createNetwork", "Create Network", HttpMethod::Post, collection)
                .body(wifi_body())
                .field(site_id()),
        ),
        OperationSpec::new(
            Resource::Network,
            "deleteWiFiNetwork",
            "Delete WiFi Network",
            HttpMethod::Delete,
            item,
        )
        .field(site_id())
        .field(FieldSpec::required("networkId")),
        site_list(Resource::Network, "listNetworks", "List Networks", collection),
        wifi_fields(
            OperationSpec::new(
                Resource::Network,
                "updateWiFiNetwork",
                "Update WiFi Network",
                HttpMethod::Put,
                item,
            )
            .body(wifi_body())
            .field(site_id())
            .field(FieldSpec::required("networkId")),
        ),
    ]
}

fn access_control_ops() -> Vec<OperationSpec> {
    vec![
        OperationSpec::new(
            Resource::InternetAccessControl,
            "bandwidthLimits",
            "Bandwidth Limits",
            HttpMethod::Post,
            "=/api/s/{{ $parameter.siteId }}/rest/user/trafficrule",
        )
        .field(site_id()),
        OperationSpec::new(
            Resource::InternetAccessControl,
            "setAccess",
            "Set Access",
            HttpMethod::Post,
            "=/api/s/{{ $parameter.siteId }}/rest/user/{{ $parameter.clientId }}",
        )
        .body(json!({
            "use_fixed_ip": "={{ $parameter.useFixedIp }}",
            "network_access": "={{ $parameter.networkAccess }}",
            "fixed_ip": "={{ $parameter.fixedIp }}",
            "usergroup_id": "={{ $parameter.usergroupId }}",
        }))
        .field(site_id())
        .field(FieldSpec::required("clientId"))
        .field(FieldSpec::optional("useFixedIp", false).and_required())
        .field(FieldSpec::required("networkAccess"))
        .field(FieldSpec::required("fixedIp"))
        .field(FieldSpec::required("usergroupId")),
    ]
}

fn user_ops() -> Vec<OperationSpec> {
    vec![
        OperationSpec::new(
            Resource::User,
            "getUsers",
            "Get Users",
            HttpMethod::Get,
            "=/api/s/{{ $parameter.siteId }}/stat/widget/warnings",
        )
        .field(site_id()),
    ]
}

fn monitoring_ops() -> Vec<OperationSpec> {
    [
        ("getClientDPI", "Client DPI", "stadpi"),
        ("getDPIStats", "DPI Stats", "dpi"),
        ("getGatewayStats", "Gateway Stats", "gateway"),
        ("getHistoricalStats", "Historical Stats", "report/daily.site"),
    ]
    .into_iter()
    .map(|(operation, display, stat)| {
        site_list(
            Resource::SitesAndMonitoring,
            operation,
            display,
            &format!("=/api/s/{{{{ $parameter.siteId }}}}/stat/{stat}"),
        )
    })
    .collect()
}

/// Every built-in operation spec, grouped by resource.
pub fn unifi_specs() -> Vec<OperationSpec> {
    [
        site_ops(),
        client_ops(),
        device_ops(),
        network_ops(),
        access_control_ops(),
        user_ops(),
        monitoring_ops(),
    ]
    .into_iter()
    .flatten()
    .collect()
}

impl Catalog {
    /// The built-in UniFi controller catalog.
    pub fn unifi() -> Result<Self, CatalogError> {
        Self::from_specs(unifi_specs())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::template::ParamLookup;

    fn lookup(pairs: serde_json::Value) -> impl ParamLookup {
        move |name: &str| pairs.get(name).cloned()
    }

    #[test]
    fn builtin_catalog_validates() {
        let catalog = Catalog::unifi().unwrap();
        assert_eq!(catalog.len(), unifi_specs().len());
        for resource in Resource::iter() {
            assert!(
                catalog.operations(resource).next().is_some(),
                "no operations for {resource}"
            );
        }
    }

    #[test]
    fn every_builtin_pair_resolves() {
        let catalog = Catalog::unifi().unwrap();
        for spec in unifi_specs() {
            let d = catalog
                .lookup(&spec.resource.to_string(), &spec.operation)
                .unwrap();
            assert_eq!(d.operation, spec.operation);
        }
    }

    #[test]
    fn radius_batch_body_applies_defaults() {
        let catalog = Catalog::unifi().unwrap();
        let d = catalog.lookup("site", "createRadiusUser").unwrap();

        let params = lookup(json!({ "siteId": "default", "name": "alice", "password": "pw" }));
        assert_eq!(d.url.resolve(&params), "/site/default/radius/users/batch_add");
        assert_eq!(
            d.body.as_ref().unwrap().resolve(&params),
            json!([{
                "name": "alice",
                "x_password": "pw",
                "vlan": "",
                "tunnel_type": 3,
                "tunnel_medium_type": 1,
            }])
        );
    }

    #[test]
    fn monitoring_urls_are_site_scoped() {
        let catalog = Catalog::unifi().unwrap();
        let d = catalog.lookup("sitesAndMonitoring", "getHistoricalStats").unwrap();
        let params = lookup(json!({ "siteId": "hq" }));
        assert_eq!(d.url.resolve(&params), "/api/s/hq/stat/report/daily.site");
    }

    #[test]
    fn list_operations_split_data() {
        let catalog = Catalog::unifi().unwrap();
        let d = catalog.lookup("client", "listActiveClients").unwrap();
        assert_eq!(d.shaping.as_ref().unwrap().split_field, "data");
        assert_eq!(d.field(SPLIT).unwrap().default, Some(json!(true)));

        let block = catalog.lookup("client", "blockClient").unwrap();
        assert!(block.shaping.is_none());
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data-transfer types for the Rancher v2-beta API.
//!
//! Field names follow the wire format (camelCase).  Only the fields the
//! lifecycle handlers touch are modeled; the API returns plenty more.

use chrono::DateTime;
use chrono::Utc;
use rancher_common::state::ResourceState;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;

/// Envelope wrapping every collection endpoint response.
#[derive(Clone, Debug, Deserialize)]
pub struct Collection<T> {
    pub data: Vec<T>,
}

/// A registered host: the platform's view of a node able to run workloads.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// May be absent while a driver-provisioned host is still coming up.
    #[serde(default)]
    pub hostname: String,
    pub state: ResourceState,
    /// Environment (project) that owns this host.
    pub account_id: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub driver: Option<String>,
    /// Set once the host has been removed.
    #[serde(default)]
    pub removed: Option<DateTime<Utc>>,
}

/// A machine: a driver-provisioned node, which registers a host once up.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub state: ResourceState,
    /// Environment (project) that owns this machine.
    pub account_id: String,
    #[serde(default)]
    pub driver: Option<String>,
    /// Set once the machine has been removed.
    #[serde(default)]
    pub removed: Option<DateTime<Utc>>,
}

/// Create-time parameters for a [`Host`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostCreate {
    pub hostname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    #[serde(flatten)]
    pub driver_config: Option<DriverConfig>,
}

/// Updateable properties of a [`Host`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub labels: HashMap<String, String>,
}

/// Create-time parameters for a [`Machine`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub driver_config: Option<DriverConfig>,
}

/// Updateable properties of a [`Machine`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Driver-specific provisioning payload
///
/// Externally tagged with the field name the API expects, so flattening a
/// value into a create payload produces `"<driver>Config": { ... }`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum DriverConfig {
    #[serde(rename = "digitaloceanConfig")]
    Digitalocean(DigitaloceanConfig),
    #[serde(rename = "vmwarevsphereConfig")]
    Vmwarevsphere(VmwarevsphereConfig),
    #[serde(rename = "amazonec2Config")]
    Amazonec2(Amazonec2Config),
    #[serde(rename = "azureConfig")]
    Azure(AzureConfig),
}

/// Provisioning settings for the DigitalOcean driver.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DigitaloceanConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub size: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ssh_user: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub userdata: String,
}

/// Provisioning settings for the VMware vSphere driver.
///
/// The platform transports the sizing fields as strings.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VmwarevsphereConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vcenter: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub datacenter: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub datastore: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cpu_count: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub memory_size: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub disk_size: String,
}

/// Provisioning settings for the Amazon EC2 driver.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Amazonec2Config {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub access_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ami: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub zone: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vpc_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subnet_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instance_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ssh_user: String,
}

/// Provisioning settings for the Azure driver.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AzureConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_secret: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subscription_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub size: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ssh_user: String,
}

#[cfg(test)]
mod test {
    use super::*;
    use rancher_common::state::ResourceState;

    #[test]
    fn test_host_deserializes_from_api_response() {
        let body = r#"{
            "id": "1h7",
            "type": "host",
            "name": "worker-0",
            "hostname": "worker-0.internal",
            "state": "provisioning",
            "accountId": "1a5",
            "labels": {
                "io.rancher.host.docker_version": "1.12",
                "role": "worker"
            },
            "driver": "digitalocean",
            "removed": null
        }"#;
        let host: Host = serde_json::from_str(body).unwrap();
        assert_eq!(host.id, "1h7");
        assert_eq!(host.state, ResourceState::Provisioning);
        assert_eq!(host.account_id, "1a5");
        assert_eq!(host.labels["role"], "worker");
        assert!(host.removed.is_none());
    }

    #[test]
    fn test_collection_envelope_deserializes() {
        let body = r#"{"data": [
            {"id": "1s1", "state": "active", "accountId": "1a5"},
            {"id": "1s2", "state": "removing", "accountId": "1a5"}
        ]}"#;
        let machines: Collection<Machine> = serde_json::from_str(body).unwrap();
        assert_eq!(machines.data.len(), 2);
        assert_eq!(machines.data[1].state, ResourceState::Removing);
    }

    #[test]
    fn test_create_payload_carries_tagged_driver_config() {
        let params = MachineCreate {
            name: "worker-0".to_string(),
            description: None,
            driver_config: Some(DriverConfig::Digitalocean(
                DigitaloceanConfig {
                    access_token: "t0k3n".to_string(),
                    region: "sfo2".to_string(),
                    size: "2gb".to_string(),
                    ..Default::default()
                },
            )),
        };
        let body = serde_json::to_value(&params).unwrap();
        assert_eq!(body["name"], "worker-0");
        assert_eq!(body["digitaloceanConfig"]["accessToken"], "t0k3n");
        assert_eq!(body["digitaloceanConfig"]["region"], "sfo2");
        // Unset fields stay off the wire entirely.
        assert!(body["digitaloceanConfig"].get("image").is_none());
        assert!(body.get("description").is_none());
    }
}

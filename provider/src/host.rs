// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host lifecycle operations

use crate::driver::decode_driver_config;
use crate::Error;
use crate::Provider;
use crate::WAIT_DELAY;
use crate::WAIT_INTERVAL;
use crate::WAIT_TIMEOUT;
use rancher_client::types::Host;
use rancher_client::types::HostCreate;
use rancher_client::types::HostUpdate;
use rancher_client::Client;
use rancher_common::id::ResourceType;
use rancher_common::poll::wait_for_state;
use rancher_common::poll::WaitConfig;
use rancher_common::state::ResourceState;
use serde_json::Map;
use serde_json::Value;
use slog::debug;
use slog::info;
use std::collections::HashMap;

/// Labels maintained by the platform itself.  They show up on every host
/// but are not settable through a resource definition.
const RESERVED_LABELS: &[&str] = &[
    "io.rancher.host.agent_image",
    "io.rancher.host.docker_version",
    "io.rancher.host.kvm",
    "io.rancher.host.linux_kernel_version",
];

/// Declarative definition of a host, as supplied by the orchestrator.
#[derive(Clone, Debug)]
pub struct HostParams {
    pub hostname: String,
    pub description: Option<String>,
    pub labels: HashMap<String, String>,
    /// Provisioning driver name (see [`crate::driver`]).
    pub driver: String,
    /// Driver settings, still in generic key-value form.
    pub driver_config: Map<String, Value>,
}

/// Updateable properties of a host.
#[derive(Clone, Debug, Default)]
pub struct HostUpdateParams {
    pub name: Option<String>,
    pub description: Option<String>,
    pub labels: HashMap<String, String>,
}

/// Readable fields of a host, as returned to the orchestrator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HostView {
    pub id: String,
    pub name: Option<String>,
    pub hostname: String,
    pub description: Option<String>,
    pub environment_id: String,
    /// Host labels, with the platform-reserved labels removed.
    pub labels: HashMap<String, String>,
}

impl From<Host> for HostView {
    fn from(host: Host) -> HostView {
        HostView {
            labels: strip_reserved_labels(&host.labels),
            id: host.id,
            name: host.name,
            hostname: host.hostname,
            description: host.description,
            environment_id: host.account_id,
        }
    }
}

/// Returns a copy of `labels` without the platform-reserved labels.
fn strip_reserved_labels(
    labels: &HashMap<String, String>,
) -> HashMap<String, String> {
    labels
        .iter()
        .filter(|(key, _)| !RESERVED_LABELS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Returns a copy of `labels` with the platform-reserved labels carried
/// over from `current`, so that an update never strips them.
fn merge_reserved_labels(
    labels: &HashMap<String, String>,
    current: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = labels.clone();
    for &key in RESERVED_LABELS {
        if let Some(value) = current.get(key) {
            merged.insert(key.to_string(), value.clone());
        }
    }
    merged
}

/// One read of a host's current snapshot and state, for the poll loop.
async fn refresh_host(
    client: &Client,
    id: &str,
) -> Result<(Host, ResourceState), rancher_client::Error> {
    let host = client.host(id).await?;
    let state = host.state;
    Ok((host, state))
}

impl Provider {
    /// Create a host and wait for it to come up active.
    pub async fn create_host(
        &self,
        environment_id: &str,
        params: &HostParams,
    ) -> Result<HostView, Error> {
        info!(self.log, "creating host";
            "hostname" => &params.hostname,
            "environment_id" => environment_id,
        );
        let driver_config =
            decode_driver_config(&params.driver, &params.driver_config)?;
        let client = self.environment_client(environment_id);

        let host = client
            .create_host(&HostCreate {
                hostname: params.hostname.clone(),
                description: params.description.clone(),
                labels: params.labels.clone(),
                driver_config: Some(driver_config),
            })
            .await?;

        let host = wait_for_state(
            &WaitConfig {
                pending: &[
                    ResourceState::Creating,
                    ResourceState::Registering,
                    ResourceState::Provisioning,
                    ResourceState::Bootstrapping,
                    ResourceState::Activating,
                ],
                target: &[ResourceState::Active],
                timeout: WAIT_TIMEOUT,
                delay: WAIT_DELAY,
                min_interval: WAIT_INTERVAL,
            },
            || refresh_host(&client, &host.id),
        )
        .await
        .map_err(|e| {
            Error::wait_failed(ResourceType::Host, &host.id, "created", e)
        })?;

        info!(self.log, "created host"; "id" => &host.id);
        Ok(HostView::from(host))
    }

    /// Fetch a host's readable fields.
    ///
    /// Returns `None` if the host no longer exists, whether deleted out of
    /// band or already in a terminal state.
    pub async fn host(
        &self,
        environment_id: &str,
        id: &str,
    ) -> Result<Option<HostView>, Error> {
        debug!(self.log, "refreshing host"; "id" => id);
        let client = self.environment_client(environment_id);
        let host = match client.host(id).await {
            Ok(host) => host,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if host.state.is_gone() {
            info!(self.log, "host is gone";
                "id" => id, "removed" => ?host.removed);
            return Ok(None);
        }
        Ok(Some(HostView::from(host)))
    }

    /// Update a host's name, description and labels.
    ///
    /// The platform-reserved labels currently on the host are merged back
    /// into the submitted label map before the update is sent.
    pub async fn update_host(
        &self,
        environment_id: &str,
        id: &str,
        params: &HostUpdateParams,
    ) -> Result<HostView, Error> {
        info!(self.log, "updating host"; "id" => id);
        let client = self.environment_client(environment_id);

        let current = client.host(id).await?;
        let labels = merge_reserved_labels(&params.labels, &current.labels);

        let host = client
            .update_host(
                id,
                &HostUpdate {
                    name: params.name.clone(),
                    description: params.description.clone(),
                    labels,
                },
            )
            .await?;
        Ok(HostView::from(host))
    }

    /// Deactivate and then delete a host, waiting out both transitions.
    pub async fn delete_host(
        &self,
        environment_id: &str,
        id: &str,
    ) -> Result<(), Error> {
        info!(self.log, "deleting host"; "id" => id);
        let client = self.environment_client(environment_id);

        client.deactivate_host(id).await?;
        debug!(self.log, "waiting for host to deactivate"; "id" => id);
        wait_for_state(
            &WaitConfig {
                pending: &[ResourceState::Active, ResourceState::Deactivating],
                target: &[ResourceState::Inactive],
                timeout: WAIT_TIMEOUT,
                delay: WAIT_DELAY,
                min_interval: WAIT_INTERVAL,
            },
            || refresh_host(&client, id),
        )
        .await
        .map_err(|e| {
            Error::wait_failed(ResourceType::Host, id, "deactivated", e)
        })?;

        client.delete_host(id).await?;
        debug!(self.log, "waiting for host to be removed"; "id" => id);
        wait_for_state(
            &WaitConfig {
                pending: &[
                    ResourceState::Active,
                    ResourceState::Inactive,
                    ResourceState::Removing,
                ],
                target: &[ResourceState::Removed, ResourceState::Purged],
                timeout: WAIT_TIMEOUT,
                delay: WAIT_DELAY,
                min_interval: WAIT_INTERVAL,
            },
            || refresh_host(&client, id),
        )
        .await
        .map_err(|e| {
            Error::wait_failed(ResourceType::Host, id, "removed", e)
        })?;

        info!(self.log, "deleted host"; "id" => id);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::merge_reserved_labels;
    use super::strip_reserved_labels;
    use std::collections::HashMap;

    fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_strip_reserved_labels() {
        let reported = labels(&[
            ("io.rancher.host.docker_version", "1.12"),
            ("io.rancher.host.kvm", "true"),
            ("role", "worker"),
        ]);
        let stripped = strip_reserved_labels(&reported);
        assert_eq!(stripped, labels(&[("role", "worker")]));
        // The source map is untouched.
        assert_eq!(reported.len(), 3);
    }

    #[test]
    fn test_merge_reserved_labels() {
        let submitted = labels(&[("role", "worker")]);
        let current = labels(&[
            ("io.rancher.host.docker_version", "1.12"),
            ("role", "database"),
        ]);
        let merged = merge_reserved_labels(&submitted, &current);
        assert_eq!(
            merged,
            labels(&[
                ("io.rancher.host.docker_version", "1.12"),
                ("role", "worker"),
            ])
        );
    }
}

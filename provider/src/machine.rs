// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Machine lifecycle operations

use crate::driver::decode_driver_config;
use crate::Error;
use crate::Provider;
use crate::WAIT_DELAY;
use crate::WAIT_INTERVAL;
use crate::WAIT_TIMEOUT;
use rancher_client::types::Machine;
use rancher_client::types::MachineCreate;
use rancher_client::types::MachineUpdate;
use rancher_client::Client;
use rancher_common::id::split_id;
use rancher_common::id::ResourceType;
use rancher_common::poll::wait_for_state;
use rancher_common::poll::WaitConfig;
use rancher_common::state::ResourceState;
use serde_json::Map;
use serde_json::Value;
use slog::debug;
use slog::info;

/// Declarative definition of a machine, as supplied by the orchestrator.
#[derive(Clone, Debug)]
pub struct MachineParams {
    pub name: String,
    pub description: Option<String>,
    /// Provisioning driver name (see [`crate::driver`]).
    pub driver: String,
    /// Driver settings, still in generic key-value form.
    pub driver_config: Map<String, Value>,
}

/// Updateable properties of a machine.
#[derive(Clone, Debug, Default)]
pub struct MachineUpdateParams {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Readable fields of a machine, as returned to the orchestrator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MachineView {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub environment_id: String,
}

impl From<Machine> for MachineView {
    fn from(machine: Machine) -> MachineView {
        MachineView {
            id: machine.id,
            name: machine.name,
            description: machine.description,
            environment_id: machine.account_id,
        }
    }
}

/// One read of a machine's current snapshot and state, for the poll loop.
async fn refresh_machine(
    client: &Client,
    id: &str,
) -> Result<(Machine, ResourceState), rancher_client::Error> {
    let machine = client.machine(id).await?;
    let state = machine.state;
    Ok((machine, state))
}

impl Provider {
    /// Create a machine and wait for it to come up active.
    pub async fn create_machine(
        &self,
        environment_id: &str,
        params: &MachineParams,
    ) -> Result<MachineView, Error> {
        info!(self.log, "creating machine";
            "name" => &params.name,
            "environment_id" => environment_id,
        );
        let driver_config =
            decode_driver_config(&params.driver, &params.driver_config)?;
        let client = self.environment_client(environment_id);

        let machine = client
            .create_machine(&MachineCreate {
                name: params.name.clone(),
                description: params.description.clone(),
                driver_config: Some(driver_config),
            })
            .await?;

        let machine = wait_for_state(
            &WaitConfig {
                pending: &[
                    ResourceState::Creating,
                    ResourceState::Provisioning,
                    ResourceState::Bootstrapping,
                ],
                target: &[ResourceState::Active],
                timeout: WAIT_TIMEOUT,
                delay: WAIT_DELAY,
                min_interval: WAIT_INTERVAL,
            },
            || refresh_machine(&client, &machine.id),
        )
        .await
        .map_err(|e| {
            Error::wait_failed(ResourceType::Machine, &machine.id, "created", e)
        })?;

        info!(self.log, "created machine"; "id" => &machine.id);
        Ok(MachineView::from(machine))
    }

    /// Fetch a machine's readable fields.
    ///
    /// Returns `None` if the machine no longer exists, whether deleted out
    /// of band or already in a terminal state.
    pub async fn machine(
        &self,
        environment_id: &str,
        id: &str,
    ) -> Result<Option<MachineView>, Error> {
        debug!(self.log, "refreshing machine"; "id" => id);
        let client = self.environment_client(environment_id);
        let machine = match client.machine(id).await {
            Ok(machine) => machine,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if machine.state.is_gone() {
            info!(self.log, "machine is gone";
                "id" => id, "removed" => ?machine.removed);
            return Ok(None);
        }
        Ok(Some(MachineView::from(machine)))
    }

    /// Update a machine's name and description.
    pub async fn update_machine(
        &self,
        environment_id: &str,
        id: &str,
        params: &MachineUpdateParams,
    ) -> Result<MachineView, Error> {
        info!(self.log, "updating machine"; "id" => id);
        let client = self.environment_client(environment_id);
        let machine = client
            .update_machine(
                id,
                &MachineUpdate {
                    name: params.name.clone(),
                    description: params.description.clone(),
                },
            )
            .await?;
        Ok(MachineView::from(machine))
    }

    /// Remove a machine and wait for the removal to conclude.
    pub async fn delete_machine(
        &self,
        environment_id: &str,
        id: &str,
    ) -> Result<(), Error> {
        info!(self.log, "deleting machine"; "id" => id);
        let client = self.environment_client(environment_id);

        client.remove_machine(id).await?;
        debug!(self.log, "waiting for machine to be removed"; "id" => id);
        wait_for_state(
            &WaitConfig {
                pending: &[ResourceState::Active, ResourceState::Removing],
                target: &[ResourceState::Removed, ResourceState::Purged],
                timeout: WAIT_TIMEOUT,
                delay: WAIT_DELAY,
                min_interval: WAIT_INTERVAL,
            },
            || refresh_machine(&client, id),
        )
        .await
        .map_err(|e| {
            Error::wait_failed(ResourceType::Machine, id, "removed", e)
        })?;

        info!(self.log, "deleted machine"; "id" => id);
        Ok(())
    }

    /// Resolve an import identifier into (environment id, machine id).
    ///
    /// The identifier is either `<environment>/<machine>` or a bare machine
    /// identifier; the bare form resolves the owning environment by reading
    /// the machine through the global API.
    pub async fn import_machine(
        &self,
        composite_id: &str,
    ) -> Result<(String, String), Error> {
        let (environment_id, machine_id) = split_id(composite_id);
        if !environment_id.is_empty() {
            return Ok((environment_id.to_string(), machine_id.to_string()));
        }
        let machine = self.global_client().machine(machine_id).await?;
        Ok((machine.account_id, machine_id.to_string()))
    }
}

#[cfg(test)]
mod test {
    use crate::Config;
    use crate::Provider;
    use slog::o;
    use slog::Logger;

    fn test_provider() -> Provider {
        let config = Config {
            api_url: "http://127.0.0.1:1/v2-beta".to_string(),
            access_key: "access".to_string(),
            secret_key: "secret".to_string(),
        };
        Provider::new(config, &Logger::root(slog::Discard, o!()))
    }

    #[tokio::test]
    async fn test_import_with_environment_scope_needs_no_lookup() {
        // A scoped identifier resolves locally; nothing listens on the
        // configured address, so reaching for the API would fail loudly.
        let provider = test_provider();
        let (environment_id, machine_id) =
            provider.import_machine("1a05/1s234").await.unwrap();
        assert_eq!(environment_id, "1a05");
        assert_eq!(machine_id, "1s234");
    }
}

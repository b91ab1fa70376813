// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Provider plugin mapping declarative Rancher resource definitions to API
//! calls.
//!
//! The orchestrator invokes lifecycle operations (create, read, update,
//! delete, import) against a [`Provider`] and persists the identifiers and
//! readable fields they return.  Mutations against the platform are
//! asynchronous: each mutating operation issues the remote call and then
//! waits for the resource to converge on its expected state before
//! returning (see [`rancher_common::poll`]).

pub mod config;
pub mod driver;
mod host;
mod machine;

pub use config::Config;
pub use config::ConfigError;
pub use host::HostParams;
pub use host::HostUpdateParams;
pub use host::HostView;
pub use machine::MachineParams;
pub use machine::MachineUpdateParams;
pub use machine::MachineView;

use rancher_client::Client;
use rancher_common::id::ResourceType;
use rancher_common::poll::WaitError;
use slog::o;
use slog::Logger;
use std::fmt;
use std::time::Duration;

/// How long to wait for a resource state transition before giving up.
const WAIT_TIMEOUT: Duration = Duration::from_secs(10 * 60);
/// Delay before the first poll of a freshly-issued mutation.
const WAIT_DELAY: Duration = Duration::from_secs(1);
/// Spacing between polls.
const WAIT_INTERVAL: Duration = Duration::from_secs(3);

/// An error produced by a lifecycle operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An API call failed; the client error is surfaced unchanged.
    #[error(transparent)]
    Client(#[from] rancher_client::Error),

    /// The resource definition named a driver this provider does not know.
    #[error("invalid driver specified: \"{0}\"")]
    InvalidDriver(String),

    /// The driver config map did not decode into the named driver's
    /// settings.
    #[error("decoding \"{driver}\" driver config")]
    DriverConfig {
        driver: String,
        #[source]
        source: serde_json::Error,
    },

    /// A state-convergence wait ended in failure.  `message` carries the
    /// poller's account: the last observed state and elapsed time, or the
    /// underlying read error.
    #[error("waiting for {type_name} ({id}) to be {operation}: {message}")]
    WaitFailed {
        type_name: ResourceType,
        id: String,
        operation: &'static str,
        message: String,
    },
}

impl Error {
    fn wait_failed<T, E>(
        type_name: ResourceType,
        id: &str,
        operation: &'static str,
        error: WaitError<T, E>,
    ) -> Error
    where
        WaitError<T, E>: fmt::Display,
    {
        Error::WaitFailed {
            type_name,
            id: id.to_string(),
            operation,
            message: error.to_string(),
        }
    }
}

/// Entry point for lifecycle operations against one Rancher installation.
///
/// One `Provider` serves any number of concurrent operations; each
/// operation builds its own API client scoped to the environment named by
/// the resource definition.  The lifecycle handlers themselves live in the
/// per-resource modules (`host`, `machine`).
pub struct Provider {
    config: Config,
    log: Logger,
}

impl Provider {
    pub fn new(config: Config, log: &Logger) -> Provider {
        Provider {
            config,
            log: log.new(o!("component" => "rancher-provider")),
        }
    }

    /// Client for endpoints that are not scoped to one environment.
    fn global_client(&self) -> Client {
        self.config.global_client(&self.log)
    }

    /// Client scoped to the environment (project) that owns a resource.
    fn environment_client(&self, environment_id: &str) -> Client {
        self.config.environment_client(environment_id, &self.log)
    }
}

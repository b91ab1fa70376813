// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rust client to the Rancher v2-beta REST API
//!
//! This covers only the slice of the API the lifecycle handlers use: reads
//! by identifier, create/update calls, collection listings, and the
//! deactivate/remove resource actions.  A `Client` is scoped to one API
//! root: either the global API or one environment
//! (`<api_url>/projects/<id>`); the caller picks the scope at construction
//! time.

pub mod types;

use crate::types::Collection;
use crate::types::Host;
use crate::types::HostCreate;
use crate::types::HostUpdate;
use crate::types::Machine;
use crate::types::MachineCreate;
use crate::types::MachineUpdate;
use rancher_common::id::ResourceType;
use serde::de::DeserializeOwned;
use serde::Serialize;
use slog::debug;
use slog::o;
use slog::Logger;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// An error returned by one API call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be completed at the transport level.  The
    /// underlying cause is surfaced unchanged.
    #[error(transparent)]
    CommunicationError(#[from] reqwest::Error),

    /// The API reported that the resource does not exist.
    #[error("{type_name} \"{id}\" not found")]
    NotFound { type_name: ResourceType, id: String },

    /// The API answered with a non-success status.
    #[error("unexpected response from the API ({status}): {message}")]
    ErrorResponse { status: reqwest::StatusCode, message: String },
}

impl Error {
    /// Returns true if the error indicates the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Narrows a 404 response into [`Error::NotFound`] for the resource the
    /// caller was addressing.
    fn for_resource(self, type_name: ResourceType, id: &str) -> Error {
        match self {
            Error::ErrorResponse { status, .. }
                if status == reqwest::StatusCode::NOT_FOUND =>
            {
                Error::NotFound { type_name, id: id.to_string() }
            }
            other => other,
        }
    }
}

/// A `Client` to one Rancher API scope.
#[derive(Clone, Debug)]
pub struct Client {
    log: Logger,
    base_url: String,
    access_key: String,
    secret_key: String,
    client: reqwest::Client,
    request_timeout: Duration,
}

impl Client {
    /// Construct a new client for the API rooted at `base_url`,
    /// authenticating with an API key pair.
    pub fn new(
        base_url: &str,
        access_key: &str,
        secret_key: &str,
        log: &Logger,
    ) -> Self {
        let log = log.new(o!("component" => "rancher-client"));
        Self {
            log,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
            client: reqwest::Client::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Return the API root this client addresses.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one host by identifier.
    pub async fn host(&self, id: &str) -> Result<Host, Error> {
        self.get(&format!("hosts/{}", id))
            .await
            .map_err(|e| e.for_resource(ResourceType::Host, id))
    }

    /// List every host in this client's scope.
    pub async fn hosts(&self) -> Result<Vec<Host>, Error> {
        let collection: Collection<Host> = self.get("hosts").await?;
        Ok(collection.data)
    }

    /// Register a new host.  The returned snapshot reflects the host as
    /// initially accepted; it will still be working through the
    /// provisioning states.
    pub async fn create_host(&self, params: &HostCreate) -> Result<Host, Error> {
        self.post("hosts", params).await
    }

    /// Update a host's mutable fields.
    pub async fn update_host(
        &self,
        id: &str,
        params: &HostUpdate,
    ) -> Result<Host, Error> {
        self.put(&format!("hosts/{}", id), params)
            .await
            .map_err(|e| e.for_resource(ResourceType::Host, id))
    }

    /// Ask the platform to deactivate a host.  Deactivation is
    /// asynchronous; the host transitions through `deactivating`.
    pub async fn deactivate_host(&self, id: &str) -> Result<Host, Error> {
        self.action(&format!("hosts/{}", id), "deactivate")
            .await
            .map_err(|e| e.for_resource(ResourceType::Host, id))
    }

    /// Delete a host.  The host must be inactive; removal is asynchronous.
    pub async fn delete_host(&self, id: &str) -> Result<(), Error> {
        self.delete(&format!("hosts/{}", id))
            .await
            .map_err(|e| e.for_resource(ResourceType::Host, id))
    }

    /// Fetch one machine by identifier.
    pub async fn machine(&self, id: &str) -> Result<Machine, Error> {
        self.get(&format!("machines/{}", id))
            .await
            .map_err(|e| e.for_resource(ResourceType::Machine, id))
    }

    /// List every machine in this client's scope.
    pub async fn machines(&self) -> Result<Vec<Machine>, Error> {
        let collection: Collection<Machine> = self.get("machines").await?;
        Ok(collection.data)
    }

    /// Create a new machine.
    pub async fn create_machine(
        &self,
        params: &MachineCreate,
    ) -> Result<Machine, Error> {
        self.post("machines", params).await
    }

    /// Update a machine's mutable fields.
    pub async fn update_machine(
        &self,
        id: &str,
        params: &MachineUpdate,
    ) -> Result<Machine, Error> {
        self.put(&format!("machines/{}", id), params)
            .await
            .map_err(|e| e.for_resource(ResourceType::Machine, id))
    }

    /// Ask the platform to remove a machine.  Removal is asynchronous; the
    /// machine transitions through `removing`.
    pub async fn remove_machine(&self, id: &str) -> Result<Machine, Error> {
        self.action(&format!("machines/{}", id), "remove")
            .await
            .map_err(|e| e.for_resource(ResourceType::Machine, id))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send a request, mapping any non-success response to an error.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, Error> {
        let response = request
            .basic_auth(&self.access_key, Some(&self.secret_key))
            .timeout(self.request_timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::ErrorResponse { status, message });
        }
        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path);
        debug!(self.log, "client request"; "method" => "GET", "uri" => &url);
        let response = self.execute(self.client.get(&url)).await?;
        Ok(response.json().await?)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!(self.log, "client request"; "method" => "POST", "uri" => &url);
        let response =
            self.execute(self.client.post(&url).json(body)).await?;
        Ok(response.json().await?)
    }

    async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!(self.log, "client request"; "method" => "PUT", "uri" => &url);
        let response = self.execute(self.client.put(&url).json(body)).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path);
        debug!(self.log, "client request"; "method" => "DELETE", "uri" => &url);
        self.execute(self.client.delete(&url)).await?;
        Ok(())
    }

    /// Invoke one of the API's resource actions (`?action=<name>`).
    async fn action<T: DeserializeOwned>(
        &self,
        path: &str,
        name: &str,
    ) -> Result<T, Error> {
        let url = format!("{}?action={}", self.url(path), name);
        debug!(self.log, "client request";
            "method" => "POST", "uri" => &url, "action" => name);
        let response = self.execute(self.client.post(&url)).await?;
        Ok(response.json().await?)
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interfaces for working with provider configuration

use rancher_client::Client;
use serde::Deserialize;
use slog::Logger;
use std::path::Path;
use std::path::PathBuf;

/// Connection configuration for one Rancher installation
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Base URL of the API, including the version prefix
    /// (e.g. `https://rancher.internal:8080/v2-beta`).
    pub api_url: String,
    /// API key pair used as basic-auth credentials.
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config from {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("Failed to parse config from {path}: {err}")]
    Parse {
        path: PathBuf,
        #[source]
        err: toml::de::Error,
    },
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Io { path: path.into(), err })?;
        let config = toml::from_str(&contents)
            .map_err(|err| ConfigError::Parse { path: path.into(), err })?;
        Ok(config)
    }

    /// Client for endpoints that are not scoped to one environment.
    pub fn global_client(&self, log: &Logger) -> Client {
        Client::new(&self.api_url, &self.access_key, &self.secret_key, log)
    }

    /// Client scoped to the environment (project) that owns a resource.
    pub fn environment_client(
        &self,
        environment_id: &str,
        log: &Logger,
    ) -> Client {
        let base_url = format!(
            "{}/projects/{}",
            self.api_url.trim_end_matches('/'),
            environment_id
        );
        Client::new(&base_url, &self.access_key, &self.secret_key, log)
    }
}

#[cfg(test)]
mod test {
    use super::Config;
    use slog::o;
    use slog::Logger;

    #[test]
    fn test_config_parses_minimal_toml() {
        let config: Config = toml::from_str(
            r#"
            api_url = "http://rancher.internal:8080/v2-beta/"
            access_key = "access"
            secret_key = "secret"
            "#,
        )
        .unwrap();
        assert_eq!(config.api_url, "http://rancher.internal:8080/v2-beta/");

        let log = Logger::root(slog::Discard, o!());
        let global = config.global_client(&log);
        assert_eq!(global.base_url(), "http://rancher.internal:8080/v2-beta");
        let scoped = config.environment_client("1a5", &log);
        assert_eq!(
            scoped.base_url(),
            "http://rancher.internal:8080/v2-beta/projects/1a5"
        );
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoding driver-specific provisioning settings from declarative input.
//!
//! A resource definition names its provisioning driver with a `driver`
//! discriminator and carries the driver's settings as a generic key-value
//! map (keys in the wire format, camelCase).  Decoding selects the typed
//! payload for the named driver; an unknown driver or a malformed map is an
//! explicit error rather than a half-empty payload sent to the API.

use crate::Error;
use rancher_client::types::Amazonec2Config;
use rancher_client::types::AzureConfig;
use rancher_client::types::DigitaloceanConfig;
use rancher_client::types::DriverConfig;
use rancher_client::types::VmwarevsphereConfig;
use serde_json::Map;
use serde_json::Value;

/// Decode the settings map for the named driver.
///
/// `aws` selects the platform's Amazon EC2 payload; the other drivers go by
/// their platform names.
pub fn decode_driver_config(
    driver: &str,
    config: &Map<String, Value>,
) -> Result<DriverConfig, Error> {
    let value = Value::Object(config.clone());
    let decode_error = |source| Error::DriverConfig {
        driver: driver.to_string(),
        source,
    };
    match driver {
        "digitalocean" => Ok(DriverConfig::Digitalocean(
            serde_json::from_value::<DigitaloceanConfig>(value)
                .map_err(decode_error)?,
        )),
        "vmwarevsphere" => Ok(DriverConfig::Vmwarevsphere(
            serde_json::from_value::<VmwarevsphereConfig>(value)
                .map_err(decode_error)?,
        )),
        "aws" => Ok(DriverConfig::Amazonec2(
            serde_json::from_value::<Amazonec2Config>(value)
                .map_err(decode_error)?,
        )),
        "azure" => Ok(DriverConfig::Azure(
            serde_json::from_value::<AzureConfig>(value)
                .map_err(decode_error)?,
        )),
        _ => Err(Error::InvalidDriver(driver.to_string())),
    }
}

#[cfg(test)]
mod test {
    use super::decode_driver_config;
    use crate::Error;
    use rancher_client::types::DriverConfig;
    use serde_json::json;
    use serde_json::Map;
    use serde_json::Value;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    #[test]
    fn test_decode_selects_typed_config() {
        let config = map(json!({
            "accessToken": "t0k3n",
            "region": "sfo2",
            "size": "2gb",
        }));
        match decode_driver_config("digitalocean", &config).unwrap() {
            DriverConfig::Digitalocean(c) => {
                assert_eq!(c.access_token, "t0k3n");
                assert_eq!(c.region, "sfo2");
                assert_eq!(c.size, "2gb");
                assert_eq!(c.image, "");
            }
            other => panic!("decoded the wrong driver: {:?}", other),
        }
    }

    #[test]
    fn test_decode_aws_selects_amazonec2() {
        let config = map(json!({
            "accessKey": "AK",
            "secretKey": "SK",
            "region": "us-west-2",
        }));
        match decode_driver_config("aws", &config).unwrap() {
            DriverConfig::Amazonec2(c) => {
                assert_eq!(c.region, "us-west-2");
            }
            other => panic!("decoded the wrong driver: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_driver_is_an_error() {
        let result = decode_driver_config("openstack", &Map::new());
        match result {
            Err(Error::InvalidDriver(driver)) => {
                assert_eq!(driver, "openstack")
            }
            other => panic!("expected an invalid-driver error: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        // Wrong value type.
        let config = map(json!({ "accessToken": true }));
        let result = decode_driver_config("digitalocean", &config);
        assert!(matches!(result, Err(Error::DriverConfig { .. })));

        // Key the driver does not define.
        let config = map(json!({ "flavor": "m1.large" }));
        let result = decode_driver_config("digitalocean", &config);
        assert!(matches!(result, Err(Error::DriverConfig { .. })));
    }
}

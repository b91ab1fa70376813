// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resource state labels reported by the remote platform.

use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/// Lifecycle state of a remote resource.
///
/// The platform reports state as a lowercase label on every resource
/// snapshot.  Hosts and machines share one vocabulary; a resource moves
/// through the provisioning states on creation and through the removal
/// states on deletion, with `removed` and `purged` both terminal.
#[derive(
    Copy, Clone, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ResourceState {
    Creating,
    Registering,
    Provisioning,
    Bootstrapping,
    Activating,
    Active,
    Deactivating,
    Inactive,
    Removing,
    Removed,
    Purged,
    Error,
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl TryFrom<&str> for ResourceState {
    type Error = String;

    fn try_from(variant: &str) -> Result<Self, String> {
        let r = match variant {
            "creating" => ResourceState::Creating,
            "registering" => ResourceState::Registering,
            "provisioning" => ResourceState::Provisioning,
            "bootstrapping" => ResourceState::Bootstrapping,
            "activating" => ResourceState::Activating,
            "active" => ResourceState::Active,
            "deactivating" => ResourceState::Deactivating,
            "inactive" => ResourceState::Inactive,
            "removing" => ResourceState::Removing,
            "removed" => ResourceState::Removed,
            "purged" => ResourceState::Purged,
            "error" => ResourceState::Error,
            _ => return Err(format!("Unexpected state label {:?}", variant)),
        };
        Ok(r)
    }
}

impl ResourceState {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceState::Creating => "creating",
            ResourceState::Registering => "registering",
            ResourceState::Provisioning => "provisioning",
            ResourceState::Bootstrapping => "bootstrapping",
            ResourceState::Activating => "activating",
            ResourceState::Active => "active",
            ResourceState::Deactivating => "deactivating",
            ResourceState::Inactive => "inactive",
            ResourceState::Removing => "removing",
            ResourceState::Removed => "removed",
            ResourceState::Purged => "purged",
            ResourceState::Error => "error",
        }
    }

    /// Returns true if the resource has been removed from the platform.
    ///
    /// The two terminal labels are equivalent for every caller here: a
    /// resource in either state no longer exists for the orchestrator's
    /// purposes, and reads of it should be short-circuited rather than
    /// surfaced as live state.
    pub fn is_gone(&self) -> bool {
        matches!(self, ResourceState::Removed | ResourceState::Purged)
    }
}

#[cfg(test)]
mod test {
    use super::ResourceState;

    #[test]
    fn test_state_labels_round_trip() {
        let states = [
            ResourceState::Creating,
            ResourceState::Registering,
            ResourceState::Provisioning,
            ResourceState::Bootstrapping,
            ResourceState::Activating,
            ResourceState::Active,
            ResourceState::Deactivating,
            ResourceState::Inactive,
            ResourceState::Removing,
            ResourceState::Removed,
            ResourceState::Purged,
            ResourceState::Error,
        ];
        for state in states {
            assert_eq!(ResourceState::try_from(state.label()), Ok(state));
            assert_eq!(state.to_string(), state.label());
        }

        assert!(ResourceState::try_from("recombobulating").is_err());
    }

    #[test]
    fn test_is_gone() {
        assert!(ResourceState::Removed.is_gone());
        assert!(ResourceState::Purged.is_gone());

        assert!(!ResourceState::Creating.is_gone());
        assert!(!ResourceState::Active.is_gone());
        assert!(!ResourceState::Inactive.is_gone());
        assert!(!ResourceState::Removing.is_gone());
        assert!(!ResourceState::Error.is_gone());
    }
}

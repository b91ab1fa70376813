// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier helpers shared by the provider crates.

use std::fmt;

/// Kinds of remote resource managed by this provider
///
/// Used to give errors a human-readable subject ("waiting for host (1h7)
/// ...").
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ResourceType {
    Host,
    Machine,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ResourceType::Host => "host",
            ResourceType::Machine => "machine",
        };
        write!(f, "{}", name)
    }
}

/// Splits a composite `<environment>/<resource>` identifier into its parts.
///
/// Import accepts either a bare resource identifier or one qualified by the
/// environment that owns the resource.  A bare identifier yields an empty
/// environment part; the split is at the first `/`.
pub fn split_id(id: &str) -> (&str, &str) {
    id.split_once('/').unwrap_or(("", id))
}

#[cfg(test)]
mod test {
    use super::split_id;

    #[test]
    fn test_split_id() {
        assert_eq!(split_id("1a05"), ("", "1a05"));
        assert_eq!(split_id("1a05/1s234"), ("1a05", "1s234"));
        assert_eq!(split_id(""), ("", ""));
        assert_eq!(split_id("1a05/"), ("1a05", ""));
    }
}

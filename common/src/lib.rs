// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Facilities shared by the Rancher provider crates.
//!
//! This crate holds the pieces both the API client and the lifecycle
//! handlers depend on: the resource state vocabulary, the state-convergence
//! poller used after asynchronous mutations, and identifier helpers.

pub mod id;
pub mod poll;
pub mod state;

// BgpSim: BGP Network Simulator written in Rust
// Copyright 2022-2024 Tibor Schneider <sctibor@ethz.ch>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The failure model (C10): a side state, held on the engine rather than on
//! link/node fields (spec §9's "global scenario state" design note), which
//! algorithms honor via [`crate::spf::PathFilter`]'s excluded sets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::{LinkId, NodeId};
use crate::spf::PathFilter;

/// The set of nodes and trunks currently marked as failed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FailureState {
    failed_nodes: BTreeSet<NodeId>,
    failed_trunks: BTreeSet<LinkId>,
}

impl FailureState {
    /// An empty failure state: nothing is failed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `node` as failed.
    pub fn fail_node(&mut self, node: NodeId) {
        self.failed_nodes.insert(node);
    }

    /// Clear the failed mark on `node`.
    pub fn unfail_node(&mut self, node: NodeId) {
        self.failed_nodes.remove(&node);
    }

    /// Mark `trunk` as failed.
    pub fn fail_trunk(&mut self, trunk: LinkId) {
        self.failed_trunks.insert(trunk);
    }

    /// Clear the failed mark on `trunk`.
    pub fn unfail_trunk(&mut self, trunk: LinkId) {
        self.failed_trunks.remove(&trunk);
    }

    /// Whether `node` is currently marked as failed.
    pub fn is_node_failed(&self, node: NodeId) -> bool {
        self.failed_nodes.contains(&node)
    }

    /// Whether `trunk` is currently marked as failed.
    pub fn is_trunk_failed(&self, trunk: LinkId) -> bool {
        self.failed_trunks.contains(&trunk)
    }

    /// Clear every failure mark.
    pub fn clear(&mut self) {
        self.failed_nodes.clear();
        self.failed_trunks.clear();
    }

    /// A [`PathFilter`] with no allow-list, excluding exactly the failed
    /// nodes and trunks. Callers that also need to restrict the search to
    /// an AS should build their own filter and extend its excluded sets
    /// with these, rather than use this directly.
    pub fn as_filter(&self) -> PathFilter {
        PathFilter {
            allowed_nodes: None,
            allowed_trunks: None,
            excluded_nodes: self.failed_nodes.clone(),
            excluded_trunks: self.failed_trunks.clone(),
        }
    }

    /// Layer this failure state's exclusions onto an existing filter
    /// (e.g. one restricted to an AS's nodes/trunks).
    pub fn apply_to(&self, filter: &mut PathFilter) {
        filter.excluded_nodes.extend(self.failed_nodes.iter().copied());
        filter.excluded_trunks.extend(self.failed_trunks.iter().copied());
    }
}

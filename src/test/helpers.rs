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

//! Shared scenario-building helpers for the end-to-end tests.

use crate::ids::{AsId, LinkId, NodeId};
use crate::model::{AsKind, NodeKind, TrunkProtocol};
use crate::network::Network;

/// Create a router named `name`.
pub(crate) fn router(net: &mut Network, name: &str) -> NodeId {
    net.node_factory(name, NodeKind::Router)
}

/// Create a trunk between `a` and `b` with the given symmetric cost.
pub(crate) fn trunk(net: &mut Network, a: NodeId, b: NodeId, cost: f64) -> LinkId {
    let id = net
        .trunk_factory(None, TrunkProtocol::Ethernet, a, b)
        .expect("fresh node handles are always live");
    let link = net.store_mut().link_mut(id).expect("just created");
    let t = link.as_trunk_mut().expect("trunk kind");
    t.sd.cost = cost;
    t.ds.cost = cost;
    id
}

/// Create a RIP AS with a single bookkeeping area, add every node and
/// trunk to it, and return the AS handle.
pub(crate) fn rip_as(net: &mut Network, name: &str, nodes: &[NodeId], trunks: &[LinkId]) -> AsId {
    let as_id = net.as_factory(name, AsKind::Rip);
    let area = net.area_factory(as_id, "R0").unwrap();
    for &n in nodes {
        net.add_node_to_as(as_id, area, n).unwrap();
    }
    for &t in trunks {
        net.add_trunk_to_as(as_id, t).unwrap();
    }
    as_id
}

/// Set a trunk's directional capacity (both directions).
pub(crate) fn set_capacity(net: &mut Network, trunk: LinkId, capacity: f64) {
    let link = net.store_mut().link_mut(trunk).unwrap();
    let t = link.as_trunk_mut().unwrap();
    t.sd.capacity = capacity;
    t.ds.capacity = capacity;
}

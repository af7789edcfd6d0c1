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

//! The AS / Area model (C3): membership bookkeeping, `update_topology`, and
//! `find_edge_nodes`, per spec §4.2.

use std::collections::BTreeSet;

use crate::error::NetworkError;
use crate::ids::{AreaId, AsId, LinkId, NodeId};
use crate::model::LinkKind;
use crate::store::Store;

/// Add `node` to `as_id`, as a member of `area`. Idempotent.
pub fn add_node_to_as(store: &mut Store, as_id: AsId, area: AreaId, node: NodeId) -> Result<(), NetworkError> {
    store.node(node)?;
    store.as_mut(as_id)?.nodes.insert(node);
    store.area_mut(area)?.nodes.insert(node);
    store.node_mut(node)?.memberships.entry(as_id).or_default().insert(area);
    Ok(())
}

/// Add `trunk` as a member of `as_id` (a trunk with both endpoints members
/// of the AS). Area assignment for OSPF/IS-IS ASes happens lazily in
/// [`update_topology`].
pub fn add_trunk_to_as(store: &mut Store, as_id: AsId, trunk: LinkId) -> Result<(), NetworkError> {
    let link = store.link(trunk)?;
    if link.kind() != LinkKind::Trunk {
        return Err(NetworkError::WrongLinkKind(trunk, link.kind(), LinkKind::Trunk));
    }
    store.as_mut(as_id)?.trunks.insert(trunk);
    Ok(())
}

/// `find_edge_nodes(AS)` (spec §4.2): the subset of AS nodes having at
/// least one trunk whose other endpoint is outside the AS.
pub fn find_edge_nodes(store: &Store, as_id: AsId) -> Result<BTreeSet<NodeId>, NetworkError> {
    let as_ = store.as_(as_id)?;
    let mut edge_nodes = BTreeSet::new();
    for &node in &as_.nodes {
        for (neighbor, _) in store.adjacent(node, LinkKind::Trunk) {
            if !as_.nodes.contains(&neighbor) {
                edge_nodes.insert(node);
                break;
            }
        }
    }
    Ok(edge_nodes)
}

/// Recompute area membership, border routers, and edge nodes for `as_id`,
/// per spec §4.2. For OSPF, a trunk belongs to an area when both of its
/// endpoints are members of that area. For IS-IS, a node's level is L1 if
/// it is a member of exactly one non-backbone area, L2 if it is only a
/// member of the backbone, and L1/L2 (a border router) if both — the same
/// "member of ≥2 areas" rule OSPF uses for ABRs, so both protocols share
/// the `border_routers` set.
///
/// Lazily prunes members that reference nodes no longer present in the
/// store (spec §7: "the AS lazily prunes absent members on next
/// `update_topology`").
pub fn update_topology(store: &mut Store, as_id: AsId) -> Result<(), NetworkError> {
    // Prune dangling members first.
    let live_nodes: BTreeSet<NodeId> = {
        let as_ = store.as_(as_id)?;
        as_.nodes.iter().copied().filter(|n| store.node(*n).is_ok()).collect()
    };
    let live_trunks: BTreeSet<LinkId> = {
        let as_ = store.as_(as_id)?;
        as_.trunks.iter().copied().filter(|t| store.link(*t).is_ok()).collect()
    };
    {
        let as_ = store.as_mut(as_id)?;
        as_.nodes = live_nodes;
        as_.trunks = live_trunks;
    }

    let area_ids: Vec<AreaId> = store.as_(as_id)?.areas.values().copied().collect();
    for area_id in &area_ids {
        let live: BTreeSet<NodeId> = store
            .area(*area_id)?
            .nodes
            .iter()
            .copied()
            .filter(|n| store.node(*n).is_ok())
            .collect();
        store.area_mut(*area_id)?.nodes = live;
    }

    // Recompute, for OSPF/IS-IS, each trunk's area membership from its
    // endpoints' area sets.
    let trunks: Vec<LinkId> = store.as_(as_id)?.trunks.iter().copied().collect();
    for area_id in &area_ids {
        store.area_mut(*area_id)?.trunks.clear();
    }
    for &trunk in &trunks {
        let link = store.link(trunk)?;
        let (src, dst) = (link.source, link.destination);
        let src_areas = store.node(src)?.memberships.get(&as_id).cloned().unwrap_or_default();
        let dst_areas = store.node(dst)?.memberships.get(&as_id).cloned().unwrap_or_default();
        for area_id in src_areas.intersection(&dst_areas) {
            store.area_mut(*area_id)?.trunks.insert(trunk);
        }
    }

    // Border routers: members of >= 2 areas of this AS.
    let mut border_routers = BTreeSet::new();
    let nodes: Vec<NodeId> = store.as_(as_id)?.nodes.iter().copied().collect();
    for node in nodes {
        let areas = store.node(node)?.memberships.get(&as_id).cloned().unwrap_or_default();
        if areas.len() >= 2 {
            border_routers.insert(node);
        }
    }
    store.as_mut(as_id)?.border_routers = border_routers;

    let edge_nodes = find_edge_nodes(store, as_id)?;
    store.as_mut(as_id)?.edge_nodes = edge_nodes;

    Ok(())
}

/// Run [`update_topology`] for every AS in the store.
pub fn update_all_topologies(store: &mut Store) -> Result<(), NetworkError> {
    let as_ids: Vec<AsId> = store.ases().map(|a| a.id()).collect();
    for as_id in as_ids {
        update_topology(store, as_id)?;
    }
    Ok(())
}

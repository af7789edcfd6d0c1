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

//! The traffic router (C8): splits each demand's throughput across ECMP
//! RFT entries hop by hop, per spec §4.7.

use std::collections::BTreeSet;

use crate::error::NetworkError;
use crate::ids::{LinkId, NodeId};
use crate::model::LinkKind;
use crate::store::Store;

/// Zero the `traffic` scratch field on every trunk, in both directions.
pub fn reset_traffic(store: &mut Store) {
    let trunk_ids: Vec<_> = store.links_of_kind(LinkKind::Trunk).map(|l| l.id()).collect();
    for id in trunk_ids {
        let link = store.link_mut(id).expect("id from store.links_of_kind");
        let trunk = link.as_trunk_mut().expect("filtered to trunk kind");
        trunk.sd.traffic = 0.0;
        trunk.ds.traffic = 0.0;
    }
}

fn destination_subnetwork(store: &Store, destination: NodeId) -> Option<std::net::Ipv4Addr> {
    store
        .adjacent(destination, LinkKind::Trunk)
        .find_map(|(_, t)| store.link(t).ok().and_then(|l| l.as_trunk()).and_then(|tr| tr.sntw))
}

/// Route a single traffic demand, mutating the trunks it crosses and the
/// demand's own `path`/unrouted status.
pub fn route_traffic_demand(store: &mut Store, demand_id: LinkId) -> Result<(), NetworkError> {
    let demand = store.link(demand_id)?;
    if demand.kind() != LinkKind::Traffic {
        return Err(NetworkError::WrongLinkKind(demand_id, demand.kind(), LinkKind::Traffic));
    }
    let source = demand.source;
    let destination = demand.destination;
    let throughput = demand.as_traffic().expect("kind checked above").throughput;

    let Some(dest_sntw) = destination_subnetwork(store, destination) else {
        log::warn!("traffic demand {demand_id} has no resolvable destination subnetwork; marking unrouted");
        store.link_mut(demand_id)?.as_traffic_mut().expect("kind checked above").path = Vec::new();
        return Ok(());
    };

    let mut stack = vec![(source, throughput)];
    let mut touched: BTreeSet<LinkId> = BTreeSet::new();
    let mut unrouted = false;

    while let Some((router, share)) = stack.pop() {
        if router == destination {
            continue;
        }
        let Ok(node) = store.node(router) else {
            unrouted = true;
            continue;
        };
        let entries = node.rft.get(&dest_sntw);
        let Some(entries) = entries.filter(|e| !e.is_empty()) else {
            unrouted = true;
            continue;
        };
        let n = entries.len() as f64;
        let entries: Vec<_> = entries.iter().cloned().collect();
        for entry in entries {
            let per_share = share / n;
            touched.insert(entry.exit_link);
            if let Ok(link) = store.link_mut(entry.exit_link) {
                if let Some(attrs) = link.attrs_from_mut(router) {
                    attrs.traffic += per_share;
                }
            }
            stack.push((entry.next_hop_node, per_share));
        }
    }

    if unrouted {
        log::warn!("traffic demand {demand_id} is unrouted: destination subnetwork absent from some intermediate RFT");
    }
    let data = store.link_mut(demand_id)?.as_traffic_mut().expect("kind checked above");
    data.path = if unrouted { Vec::new() } else { touched.into_iter().collect() };
    Ok(())
}

/// Route every traffic demand in the store, resetting accumulated traffic
/// counters first.
pub fn route_all_traffic_demands(store: &mut Store) -> Result<(), NetworkError> {
    reset_traffic(store);
    let demand_ids: Vec<_> = store.links_of_kind(LinkKind::Traffic).map(|l| l.id()).collect();
    for id in demand_ids {
        route_traffic_demand(store, id)?;
    }
    Ok(())
}

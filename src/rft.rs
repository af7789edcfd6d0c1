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

//! The RFT builder (C7): per-router routing table with ECMP up to `K`,
//! route-type precedence, and a non-load-balanced single-path variant.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};
use std::net::Ipv4Addr;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::ids::{LinkId, NodeId};
use crate::model::{As, AsKind, LinkKind, RftEntry, RouteType};
use crate::spf::{self, PathFilter};
use crate::store::Store;

/// Configuration for the RFT builder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RftConfig {
    /// Maximum number of ECMP entries per subnetwork.
    pub ecmp_cap: usize,
    /// Whether load-balancing (ECMP) is enabled. When `false`, the non-LB
    /// single-path builder is used instead.
    pub lb: bool,
}

impl Default for RftConfig {
    fn default() -> Self {
        Self {
            ecmp_cap: 4,
            lb: true,
        }
    }
}

fn trunks_share_area(store: &Store, as_: &As, a: LinkId, b: LinkId) -> bool {
    as_.areas.values().any(|&area_id| {
        store
            .area(area_id)
            .map(|area| area.trunks.contains(&a) && area.trunks.contains(&b))
            .unwrap_or(false)
    })
}

fn trunk_in_backbone_only(store: &Store, as_: &As, a: LinkId, b: LinkId) -> bool {
    as_.backbone
        .and_then(|b_id| store.area(b_id).ok())
        .map(|area| area.trunks.contains(&a) && area.trunks.contains(&b))
        .unwrap_or(false)
}

fn dynamic_route_type(store: &Store, as_: &As, ex_tk: LinkId, t: LinkId) -> RouteType {
    match as_.kind {
        AsKind::Rip => RouteType::Rip,
        AsKind::Ospf => {
            if trunks_share_area(store, as_, ex_tk, t) {
                RouteType::OspfIntra
            } else {
                RouteType::OspfInterArea
            }
        }
        AsKind::Isis => {
            if trunk_in_backbone_only(store, as_, ex_tk, t) {
                RouteType::IsisL2
            } else {
                RouteType::IsisL1
            }
        }
    }
}

/// Step 1: directly connected routes for every trunk of the AS incident to
/// `router`.
pub fn build_connected_routes(store: &Store, as_: &As, router: NodeId) -> BTreeMap<Ipv4Addr, RftEntry> {
    let mut table = BTreeMap::new();
    for (neighbor, link_id) in store.adjacent(router, LinkKind::Trunk) {
        if !as_.trunks.contains(&link_id) {
            continue;
        }
        let Ok(link) = store.link(link_id) else { continue };
        let Some(trunk) = link.as_trunk() else { continue };
        let Some(sntw) = trunk.sntw else { continue };
        let next_hop_ip = link
            .attrs_from(neighbor)
            .and_then(|a| a.ipaddress)
            .unwrap_or(Ipv4Addr::UNSPECIFIED);
        let exit_interface = link
            .attrs_from(router)
            .and_then(|a| a.interface.clone())
            .unwrap_or_default();
        table.insert(
            sntw,
            RftEntry {
                rtype: RouteType::Connected,
                next_hop_ip,
                exit_interface,
                cost: OrderedFloat(0.0),
                next_hop_node: neighbor,
                exit_link: link_id,
            },
        );
    }
    table
}

fn insert_entry(
    rft: &mut BTreeMap<Ipv4Addr, BTreeSet<RftEntry>>,
    sp_cost: &mut BTreeMap<Ipv4Addr, f64>,
    sntw: Ipv4Addr,
    entry: RftEntry,
    ecmp_cap: usize,
) {
    let entries = rft.entry(sntw).or_default();
    if entries.is_empty() {
        sp_cost.insert(sntw, entry.cost.into_inner());
        entries.insert(entry);
        return;
    }
    let existing_rtype = entries.iter().next().expect("non-empty").rtype;
    if matches!(existing_rtype, RouteType::Connected | RouteType::Static) {
        // C/S always win; dynamic protocol routes never overwrite them.
        return;
    }

    // OSPF precedence: O strictly replaces O IA at any cost; O IA never
    // overwrites O.
    if entry.rtype == RouteType::OspfInterArea && existing_rtype == RouteType::OspfIntra {
        return;
    }
    if entry.rtype == RouteType::OspfIntra && existing_rtype == RouteType::OspfInterArea {
        entries.clear();
        sp_cost.insert(sntw, entry.cost.into_inner());
        entries.insert(entry);
        return;
    }

    let existing_cost = *sp_cost.get(&sntw).unwrap_or(&f64::INFINITY);
    let new_cost = entry.cost.into_inner();
    if new_cost < existing_cost {
        entries.clear();
        sp_cost.insert(sntw, new_cost);
        entries.insert(entry);
    } else if (new_cost - existing_cost).abs() < 1e-9 && existing_rtype == entry.rtype && entries.len() < ecmp_cap {
        entries.insert(entry);
    }
    // else: strictly worse, or an equal cost of a different class without
    // OSPF precedence applying — ignored (see DESIGN.md Open Question 1).
}

/// Step 2-6: best-first exploration from `router`, ECMP insertion policy
/// (the `SP_cost`-based strategy only, per DESIGN.md Open Question 1).
pub fn build_ecmp_table(
    store: &Store,
    as_: &As,
    router: NodeId,
    cfg: RftConfig,
) -> BTreeMap<Ipv4Addr, BTreeSet<RftEntry>> {
    let connected = build_connected_routes(store, as_, router);
    let mut rft: BTreeMap<Ipv4Addr, BTreeSet<RftEntry>> = BTreeMap::new();
    let mut sp_cost: BTreeMap<Ipv4Addr, f64> = BTreeMap::new();
    for (sntw, entry) in connected {
        sp_cost.insert(sntw, 0.0);
        rft.entry(sntw).or_default().insert(entry);
    }

    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, NodeId, Vec<LinkId>)>> = BinaryHeap::new();
    let mut visited: BTreeSet<(NodeId, Vec<LinkId>)> = BTreeSet::new();
    heap.push(Reverse((OrderedFloat(0.0), router, Vec::new())));

    while let Some(Reverse((dist, node, path))) = heap.pop() {
        let dist = dist.into_inner();
        if !visited.insert((node, path.clone())) {
            continue;
        }

        let incident: Vec<(NodeId, LinkId)> = store
            .adjacent(node, LinkKind::Trunk)
            .filter(|(_, t)| as_.trunks.contains(t))
            .collect();

        for (neighbor, t) in incident {
            if path.contains(&t) {
                continue; // loop-free expansion, step 5
            }
            let Some(cost) = store.link(t).ok().and_then(|l| l.cost_from(node)) else {
                continue;
            };
            let curr_dist = dist + cost;
            let mut new_path = path.clone();
            new_path.push(t);

            if node == router {
                // First hop: nothing to insert (connected routes already
                // seeded the table); just extend the frontier.
                heap.push(Reverse((OrderedFloat(curr_dist), neighbor, new_path)));
                continue;
            }

            let ex_tk = path[0];
            let Some(trunk) = store.link(t).ok().and_then(|l| l.as_trunk().cloned()) else {
                continue;
            };
            let Some(sntw) = trunk.sntw else { continue };

            let Ok(ex_link) = store.link(ex_tk) else { continue };
            let Some(nh) = ex_link.other_end(router) else { continue };
            let ex_ip = ex_link.attrs_from(nh).and_then(|a| a.ipaddress).unwrap_or(Ipv4Addr::UNSPECIFIED);
            let ex_int = ex_link
                .attrs_from(router)
                .and_then(|a| a.interface.clone())
                .unwrap_or_default();
            let rtype = dynamic_route_type(store, as_, ex_tk, t);

            let entry = RftEntry {
                rtype,
                next_hop_ip: ex_ip,
                exit_interface: ex_int,
                cost: OrderedFloat(curr_dist),
                next_hop_node: nh,
                exit_link: ex_tk,
            };
            insert_entry(&mut rft, &mut sp_cost, sntw, entry, cfg.ecmp_cap);

            heap.push(Reverse((OrderedFloat(curr_dist), neighbor, new_path)));
        }
    }

    rft
}

fn first_trunk_on_path(store: &Store, source: NodeId, target: NodeId, prev: &BTreeMap<NodeId, LinkId>) -> Option<LinkId> {
    let mut cur = target;
    let mut last = None;
    while cur != source {
        let &link_id = prev.get(&cur)?;
        last = Some(link_id);
        let link = store.link(link_id).ok()?;
        cur = link.other_end(cur)?;
    }
    last
}

/// Non-LB variant: one route per subnetwork, first-reached under a pure
/// Dijkstra relaxation (used by AS types where `RftConfig::lb` is `false`).
pub fn build_static_table(store: &Store, as_: &As, router: NodeId) -> BTreeMap<Ipv4Addr, RftEntry> {
    let mut table = build_connected_routes(store, as_, router);

    let filter = PathFilter::restricted_to(as_.nodes.clone(), as_.trunks.clone());
    let (dist, _, prev) = spf::dijkstra(store, router, router, &filter);

    let mut best_cost: BTreeMap<Ipv4Addr, f64> = BTreeMap::new();
    for &t in &as_.trunks {
        let Ok(link) = store.link(t) else { continue };
        let Some(trunk) = link.as_trunk() else { continue };
        let Some(sntw) = trunk.sntw else { continue };
        if table.contains_key(&sntw) {
            continue; // a connected route already covers this subnetwork
        }
        for endpoint in [link.source, link.destination] {
            if endpoint == router {
                continue;
            }
            let Some(&d) = dist.get(&endpoint) else { continue };
            let Some(cross) = link.cost_from(endpoint) else { continue };
            let curr = d + cross;
            if curr < *best_cost.get(&sntw).unwrap_or(&f64::INFINITY) {
                let Some(first_trunk) = first_trunk_on_path(store, router, endpoint, &prev) else {
                    continue;
                };
                let Ok(first_link) = store.link(first_trunk) else { continue };
                let Some(nh) = first_link.other_end(router) else { continue };
                let ex_ip = first_link.attrs_from(nh).and_then(|a| a.ipaddress).unwrap_or(Ipv4Addr::UNSPECIFIED);
                let ex_int = first_link
                    .attrs_from(router)
                    .and_then(|a| a.interface.clone())
                    .unwrap_or_default();
                let rtype = match as_.kind {
                    AsKind::Rip => RouteType::Rip,
                    AsKind::Ospf => RouteType::OspfIntra,
                    AsKind::Isis => RouteType::IsisL1,
                };
                best_cost.insert(sntw, curr);
                table.insert(
                    sntw,
                    RftEntry {
                        rtype,
                        next_hop_ip: ex_ip,
                        exit_interface: ex_int,
                        cost: OrderedFloat(curr),
                        next_hop_node: nh,
                        exit_link: first_trunk,
                    },
                );
            }
        }
    }
    table
}

/// Build and install the RFT for `router` within `as_`, respecting
/// `cfg.lb`.
pub fn build_table_for_router(store: &Store, as_: &As, router: NodeId, cfg: RftConfig) -> BTreeMap<Ipv4Addr, BTreeSet<RftEntry>> {
    if cfg.lb {
        build_ecmp_table(store, as_, router, cfg)
    } else {
        build_static_table(store, as_, router)
            .into_iter()
            .map(|(k, v)| (k, BTreeSet::from([v])))
            .collect()
    }
}

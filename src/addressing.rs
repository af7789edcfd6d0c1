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

//! The addressing pipeline (C4), run at the start of `calculate_all` in the
//! exact order fixed by spec §4.3: per-AS trunks, loopbacks, AS-less
//! trunks, subnetwork ids, interfaces.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::ids::LinkId;
use crate::model::{LinkKind, NodeKind};
use crate::store::Store;

const SUBNET_MASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 252);

/// Base octets for the three address pools the pipeline allocates from,
/// per spec §4.3. Defaults match the spec's fixed scheme (`10.a.r.z`,
/// `192.168.*`, `172.16.0.z`); a host may repoint any of them to carve out
/// a different private range without touching the allocation logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressingConfig {
    /// First octet of the per-AS trunk block (`base.a.r.z`).
    pub per_as_first_octet: u8,
    /// First two octets of the loopback block (`base0.base1.*.*`).
    pub loopback_base: (u8, u8),
    /// The three fixed octets of the AS-less trunk block (`b0.b1.b2.z`).
    pub as_less_block: (u8, u8, u8),
}

impl Default for AddressingConfig {
    fn default() -> Self {
        Self {
            per_as_first_octet: 10,
            loopback_base: (192, 168),
            as_less_block: (172, 16, 0),
        }
    }
}

fn assign_block(store: &mut Store, trunks: &[LinkId], block: [u8; 3]) {
    for (k, &link_id) in trunks.iter().enumerate() {
        let z = (4 * k + 1) as u8;
        let [b1, b2, b3] = block;
        let src_ip = Ipv4Addr::new(b1, b2, b3, z);
        let dst_ip = Ipv4Addr::new(b1, b2, b3, z + 1);
        let link = store.link_mut(link_id).expect("trunk id from store must be live");
        let source = link.source;
        let destination = link.destination;
        if let Some(a) = link.attrs_from_mut(source) {
            a.ipaddress = Some(src_ip);
            a.subnetmask = Some(SUBNET_MASK);
        }
        if let Some(a) = link.attrs_from_mut(destination) {
            a.ipaddress = Some(dst_ip);
            a.subnetmask = Some(SUBNET_MASK);
        }
    }
}

/// Step 1: address every trunk belonging to an AS, block `base.a.r.z`.
fn address_as_trunks(store: &mut Store, cfg: &AddressingConfig) {
    let mut as_ids: Vec<_> = store.ases().map(|a| a.id()).collect();
    as_ids.sort_by_key(|id| id.index());
    for (a_idx, as_id) in as_ids.iter().enumerate() {
        let a = a_idx as u8;
        let as_ = store.as_(*as_id).expect("id from store.ases()").clone();
        let mut area_ids: Vec<_> = as_.areas.values().copied().collect();
        area_ids.sort_by_key(|id| id.index());
        for (r_idx, area_id) in area_ids.iter().enumerate() {
            let r = r_idx as u8;
            let area = store.area(*area_id).expect("id from as.areas").clone();
            let mut trunks: Vec<_> = area.trunks.iter().copied().collect();
            trunks.sort_by_key(|id| id.index());
            assign_block(store, &trunks, [cfg.per_as_first_octet, a, r]);
        }
    }
}

/// Step 2: assign loopback addresses `base0.base1.(i/255).(i%255)`.
fn address_loopbacks(store: &mut Store, cfg: &AddressingConfig) {
    let mut router_ids: Vec<_> = store
        .nodes()
        .filter(|n| n.subtype == NodeKind::Router)
        .map(|n| n.id())
        .collect();
    router_ids.sort_by_key(|id| id.index());
    let (b0, b1) = cfg.loopback_base;
    for (idx, node_id) in router_ids.into_iter().enumerate() {
        let i = (idx + 1) as u32;
        let addr = Ipv4Addr::new(b0, b1, (i / 255) as u8, (i % 255) as u8);
        store.node_mut(node_id).expect("id from store.nodes()").loopback = Some(addr);
    }
}

/// Step 3: address trunks that belong to no AS, block `b0.b1.b2.z`.
fn address_as_less_trunks(store: &mut Store, cfg: &AddressingConfig) {
    let in_as: BTreeSet<LinkId> = store.ases().flat_map(|a| a.trunks.iter().copied()).collect();
    let mut trunks: Vec<_> = store
        .links_of_kind(LinkKind::Trunk)
        .map(|l| l.id())
        .filter(|id| !in_as.contains(id))
        .collect();
    trunks.sort_by_key(|id| id.index());
    let (b0, b1, b2) = cfg.as_less_block;
    assign_block(store, &trunks, [b0, b1, b2]);
}

/// Step 4: subnetwork id `sntw = ipaddressS AND subnetmaskS`.
fn address_subnetworks(store: &mut Store) {
    let trunk_ids: Vec<_> = store.links_of_kind(LinkKind::Trunk).map(|l| l.id()).collect();
    for id in trunk_ids {
        let link = store.link_mut(id).expect("id from store.links_of_kind");
        let trunk = link.as_trunk_mut().expect("filtered to trunk kind");
        if let (Some(ip), Some(mask)) = (trunk.sd.ipaddress, trunk.sd.subnetmask) {
            let net = u32::from(ip) & u32::from(mask);
            trunk.sntw = Some(Ipv4Addr::from(net));
        }
    }
}

/// Step 5: number interfaces `Ethernet0/0, Ethernet0/1, …` in
/// adjacency-iteration order.
fn address_interfaces(store: &mut Store) {
    let node_ids: Vec<_> = store.nodes().map(|n| n.id()).collect();
    for node_id in node_ids {
        let incident: Vec<(_, LinkId)> = store.adjacent(node_id, LinkKind::Trunk).collect();
        for (slot, (_, link_id)) in incident.into_iter().enumerate() {
            let name = format!("Ethernet0/{slot}");
            let link = store.link_mut(link_id).expect("id from store.adjacent");
            let source = link.source;
            let destination = link.destination;
            let trunk = link.as_trunk_mut().expect("trunk kind adjacency");
            if node_id == source {
                trunk.sd.interface = Some(name);
            } else if node_id == destination {
                trunk.ds.interface = Some(name);
            }
        }
    }
}

/// Run the full addressing pipeline, in spec order.
pub fn run(store: &mut Store, cfg: &AddressingConfig) {
    address_as_trunks(store, cfg);
    address_loopbacks(store, cfg);
    address_as_less_trunks(store, cfg);
    address_subnetworks(store);
    address_interfaces(store);
}

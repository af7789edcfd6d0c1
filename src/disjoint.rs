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

//! Disjoint-path pairs (C9): Bhandari, Suurballe, and the A*-based
//! link-disjoint pair, per spec §4.8. Bhandari and Suurballe temporarily
//! mutate trunk costs and always restore them before returning, even when
//! no disjoint pair exists.

use std::collections::BTreeSet;

use crate::ids::{LinkId, NodeId};
use crate::model::LinkKind;
use crate::spf::{self, PathFilter};
use crate::store::Store;

fn path_node_sequence(store: &Store, source: NodeId, links: &[LinkId]) -> Vec<NodeId> {
    let mut nodes = vec![source];
    let mut cur = source;
    for &l in links {
        let link = store.link(l).expect("path link must be live");
        let next = link.other_end(cur).expect("path link incident to cur");
        nodes.push(next);
        cur = next;
    }
    nodes
}

fn symmetric_difference(a: &[LinkId], b: &[LinkId]) -> BTreeSet<LinkId> {
    let sa: BTreeSet<_> = a.iter().copied().collect();
    let sb: BTreeSet<_> = b.iter().copied().collect();
    sa.symmetric_difference(&sb).copied().collect()
}

fn save_trunk_costs(store: &Store, trunks: &[LinkId]) -> Vec<(LinkId, f64, f64)> {
    trunks
        .iter()
        .filter_map(|&t| {
            let trunk = store.link(t).ok()?.as_trunk()?;
            Some((t, trunk.sd.cost, trunk.ds.cost))
        })
        .collect()
}

fn restore_trunk_costs(store: &mut Store, saved: Vec<(LinkId, f64, f64)>) {
    for (link_id, sd, ds) in saved {
        if let Ok(link) = store.link_mut(link_id) {
            if let Some(trunk) = link.as_trunk_mut() {
                trunk.sd.cost = sd;
                trunk.ds.cost = ds;
            }
        }
    }
}

/// Bhandari's algorithm (per spec §4.8): A* for `P1`, block `P1` forward and
/// make it `-1` reverse, Bellman-Ford for `P2`, restore costs, return `P1 △
/// P2`. Empty if no disjoint pair exists.
pub fn bhandari(store: &mut Store, source: NodeId, target: NodeId, filter: &PathFilter) -> BTreeSet<LinkId> {
    let p1 = spf::a_star(store, source, target, &[], filter);
    if p1.is_empty() {
        return BTreeSet::new();
    }
    let nodes = path_node_sequence(store, source, &p1);
    let saved = save_trunk_costs(store, &p1);

    for (i, &link_id) in p1.iter().enumerate() {
        let from = nodes[i];
        let to = nodes[i + 1];
        if let Ok(link) = store.link_mut(link_id) {
            if let Some(a) = link.attrs_from_mut(from) {
                a.cost = f64::INFINITY;
            }
            if let Some(a) = link.attrs_from_mut(to) {
                a.cost = -1.0;
            }
        }
    }

    let (p2, _negative_cycle) = spf::bellman_ford(store, source, target, filter);
    restore_trunk_costs(store, saved);

    if p2.is_empty() {
        return BTreeSet::new();
    }
    symmetric_difference(&p1, &p2)
}

/// Suurballe's algorithm (per spec §4.8): Dijkstra distances `d`, reweight
/// every trunk by the Johnson reduction `cost ← cost − d(b) + d(a)` in each
/// direction, block `P1` forward only, A* for `P2`, restore costs, return
/// `P1 △ P2`.
pub fn suurballe(store: &mut Store, source: NodeId, target: NodeId, filter: &PathFilter) -> BTreeSet<LinkId> {
    let (dist, p1, _prev) = spf::dijkstra(store, source, target, filter);
    if p1.is_empty() {
        return BTreeSet::new();
    }

    let trunk_ids: Vec<LinkId> = store.links_of_kind(LinkKind::Trunk).map(|l| l.id()).collect();
    let saved = save_trunk_costs(store, &trunk_ids);

    for &t in &trunk_ids {
        let Ok(link) = store.link(t) else { continue };
        let (src, dst) = (link.source, link.destination);
        let (Some(&d_src), Some(&d_dst)) = (dist.get(&src), dist.get(&dst)) else {
            continue;
        };
        if let Ok(link) = store.link_mut(t) {
            if let Some(trunk) = link.as_trunk_mut() {
                trunk.sd.cost = trunk.sd.cost - d_dst + d_src;
                trunk.ds.cost = trunk.ds.cost - d_src + d_dst;
            }
        }
    }

    let nodes = path_node_sequence(store, source, &p1);
    for (i, &link_id) in p1.iter().enumerate() {
        let from = nodes[i];
        if let Ok(link) = store.link_mut(link_id) {
            if let Some(a) = link.attrs_from_mut(from) {
                a.cost = f64::INFINITY;
            }
        }
    }

    let p2 = spf::a_star(store, source, target, &[], filter);
    restore_trunk_costs(store, saved);

    if p2.is_empty() {
        return BTreeSet::new();
    }
    symmetric_difference(&p1, &p2)
}

/// A*-based link-disjoint pair: a first leg `s -> t`, then a second leg `s ->
/// t` with the first leg's trunks excluded. Per DESIGN.md Open Question 5,
/// this carries the exclusion explicitly between the two legs rather than
/// via a single round-trip `a_star` call, since [`spf::a_star`]'s waypoint
/// legs do not share visited state.
pub fn a_star_shortest_pair(store: &Store, source: NodeId, target: NodeId, filter: &PathFilter) -> BTreeSet<LinkId> {
    let leg1 = spf::a_star(store, source, target, &[], filter);
    if leg1.is_empty() {
        return BTreeSet::new();
    }
    let mut filter2 = filter.clone();
    filter2.excluded_trunks.extend(leg1.iter().copied());

    let leg2 = spf::a_star(store, source, target, &[], &filter2);
    if leg2.is_empty() {
        return BTreeSet::new();
    }
    leg1.into_iter().chain(leg2).collect()
}

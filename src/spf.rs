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

//! The shortest-path kernel (C5): dijkstra, a_star, bellman_ford,
//! floyd_warshall, all_paths. Cost lookups are always directional: crossing
//! a trunk from its `source` side uses `costSD` (via
//! [`crate::model::Link::cost_from`]), otherwise `costDS`.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use ordered_float::OrderedFloat;

use crate::ids::{LinkId, NodeId};
use crate::model::LinkKind;
use crate::store::Store;

/// Node/trunk allow/deny lists shared by every algorithm in this module.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    /// If set, only these nodes may be visited.
    pub allowed_nodes: Option<BTreeSet<NodeId>>,
    /// If set, only these trunks may be traversed.
    pub allowed_trunks: Option<BTreeSet<LinkId>>,
    /// These nodes may never be visited (failed nodes).
    pub excluded_nodes: BTreeSet<NodeId>,
    /// These trunks may never be traversed (failed trunks).
    pub excluded_trunks: BTreeSet<LinkId>,
}

impl PathFilter {
    /// No restriction at all.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Restrict the search to exactly these nodes and trunks.
    pub fn restricted_to(nodes: BTreeSet<NodeId>, trunks: BTreeSet<LinkId>) -> Self {
        Self {
            allowed_nodes: Some(nodes),
            allowed_trunks: Some(trunks),
            excluded_nodes: BTreeSet::new(),
            excluded_trunks: BTreeSet::new(),
        }
    }

    fn node_ok(&self, n: NodeId) -> bool {
        self.allowed_nodes.as_ref().map_or(true, |s| s.contains(&n)) && !self.excluded_nodes.contains(&n)
    }

    fn trunk_ok(&self, l: LinkId) -> bool {
        self.allowed_trunks.as_ref().map_or(true, |s| s.contains(&l)) && !self.excluded_trunks.contains(&l)
    }
}

fn reconstruct(store: &Store, source: NodeId, target: NodeId, prev_link: &BTreeMap<NodeId, LinkId>) -> Vec<LinkId> {
    let mut links = Vec::new();
    let mut cur = target;
    while cur != source {
        let Some(&link_id) = prev_link.get(&cur) else {
            // Unreachable, or (deliberately, see Open Question #2) the
            // caller asked for source == target: never dereference a
            // missing predecessor, just report no path.
            return Vec::new();
        };
        let link = store.link(link_id).expect("prev_link only holds live links");
        let Some(prev) = link.other_end(cur) else {
            return Vec::new();
        };
        links.push(link_id);
        cur = prev;
    }
    links.reverse();
    links
}

/// Dijkstra's algorithm. Returns `(distances, path source->target,
/// predecessor-link tree)`. `path` is empty when `target` is unreachable,
/// or when `source == target` (deliberate: see DESIGN.md Open Question 2).
pub fn dijkstra(
    store: &Store,
    source: NodeId,
    target: NodeId,
    filter: &PathFilter,
) -> (BTreeMap<NodeId, f64>, Vec<LinkId>, BTreeMap<NodeId, LinkId>) {
    let mut dist: BTreeMap<NodeId, f64> = BTreeMap::new();
    let mut prev_link: BTreeMap<NodeId, LinkId> = BTreeMap::new();
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, NodeId)>> = BinaryHeap::new();

    dist.insert(source, 0.0);
    heap.push(Reverse((OrderedFloat(0.0), source)));

    while let Some(Reverse((d, node))) = heap.pop() {
        let d = d.into_inner();
        if d > *dist.get(&node).unwrap_or(&f64::INFINITY) {
            continue;
        }
        for (neighbor, link) in store.adjacent(node, LinkKind::Trunk) {
            if !filter.node_ok(neighbor) || !filter.trunk_ok(link) {
                continue;
            }
            let Some(cost) = store.link(link).ok().and_then(|l| l.cost_from(node)) else {
                continue;
            };
            let nd = d + cost;
            if nd < *dist.get(&neighbor).unwrap_or(&f64::INFINITY) {
                dist.insert(neighbor, nd);
                prev_link.insert(neighbor, link);
                heap.push(Reverse((OrderedFloat(nd), neighbor)));
            }
        }
    }

    let path = if source == target {
        Vec::new()
    } else {
        reconstruct(store, source, target, &prev_link)
    };

    (dist, path, prev_link)
}

/// A* with ordered waypoints: each constraint is reached in turn via a
/// fresh Dijkstra search (the visited set restarts at each waypoint, per
/// spec §4.4), and the resulting link paths are concatenated.
pub fn a_star(
    store: &Store,
    source: NodeId,
    target: NodeId,
    path_constraints: &[NodeId],
    filter: &PathFilter,
) -> Vec<LinkId> {
    let mut current = source;
    let mut full_path = Vec::new();
    for &waypoint in path_constraints.iter().chain(std::iter::once(&target)) {
        if current == waypoint {
            continue;
        }
        let (_, leg, _) = dijkstra(store, current, waypoint, filter);
        if leg.is_empty() {
            return Vec::new();
        }
        full_path.extend(leg);
        current = waypoint;
    }
    full_path
}

/// Bellman-Ford, `|V|+2` passes, tolerant of negative costs (used by
/// Bhandari). Returns `(path, negative_cycle_detected)`; `path` is empty if
/// `target` is unreachable.
pub fn bellman_ford(
    store: &Store,
    source: NodeId,
    target: NodeId,
    filter: &PathFilter,
) -> (Vec<LinkId>, bool) {
    let nodes: Vec<NodeId> = store.nodes().map(|n| n.id()).filter(|&n| filter.node_ok(n)).collect();
    let mut dist: BTreeMap<NodeId, f64> = nodes.iter().map(|&n| (n, f64::INFINITY)).collect();
    dist.insert(source, 0.0);
    let mut prev: BTreeMap<NodeId, LinkId> = BTreeMap::new();

    let passes = nodes.len() + 2;
    let mut negative_cycle = false;
    for pass in 0..passes {
        let mut updated = false;
        for &node in &nodes {
            let d = *dist.get(&node).unwrap_or(&f64::INFINITY);
            if !d.is_finite() {
                continue;
            }
            for (neighbor, link) in store.adjacent(node, LinkKind::Trunk) {
                if !filter.node_ok(neighbor) || !filter.trunk_ok(link) {
                    continue;
                }
                let Some(cost) = store.link(link).ok().and_then(|l| l.cost_from(node)) else {
                    continue;
                };
                let nd = d + cost;
                if nd < *dist.get(&neighbor).unwrap_or(&f64::INFINITY) {
                    dist.insert(neighbor, nd);
                    prev.insert(neighbor, link);
                    updated = true;
                    if pass == passes - 1 {
                        negative_cycle = true;
                    }
                }
            }
        }
        if !updated {
            break;
        }
    }

    if !dist.get(&target).is_some_and(|d| d.is_finite()) {
        return (Vec::new(), negative_cycle);
    }
    (reconstruct(store, source, target, &prev), negative_cycle)
}

/// All-pairs shortest distances among the allowed nodes. Returns `None` if
/// a negative cycle is found (`W[v][v] < 0`).
pub fn floyd_warshall(store: &Store, filter: &PathFilter) -> Option<BTreeMap<(NodeId, NodeId), f64>> {
    let nodes: BTreeSet<NodeId> = store.nodes().map(|n| n.id()).filter(|&n| filter.node_ok(n)).collect();
    let mut w: BTreeMap<(NodeId, NodeId), f64> = BTreeMap::new();
    for &n in &nodes {
        w.insert((n, n), 0.0);
    }
    for &n in &nodes {
        for (neighbor, link) in store.adjacent(n, LinkKind::Trunk) {
            if !nodes.contains(&neighbor) || !filter.trunk_ok(link) {
                continue;
            }
            let Some(cost) = store.link(link).ok().and_then(|l| l.cost_from(n)) else {
                continue;
            };
            let entry = w.entry((n, neighbor)).or_insert(f64::INFINITY);
            if cost < *entry {
                *entry = cost;
            }
        }
    }

    for &k in &nodes {
        for &i in &nodes {
            let dik = *w.get(&(i, k)).unwrap_or(&f64::INFINITY);
            if !dik.is_finite() {
                continue;
            }
            for &j in &nodes {
                let dkj = *w.get(&(k, j)).unwrap_or(&f64::INFINITY);
                if !dkj.is_finite() {
                    continue;
                }
                let nd = dik + dkj;
                let entry = w.entry((i, j)).or_insert(f64::INFINITY);
                if nd < *entry {
                    *entry = nd;
                }
            }
        }
    }

    for &v in &nodes {
        if *w.get(&(v, v)).unwrap_or(&0.0) < 0.0 {
            return None;
        }
    }
    Some(w)
}

/// Depth-first enumeration of simple (loop-free) paths from `source`. If
/// `target` is given, yields every simple path reaching it; otherwise
/// yields every maximal dead-end path.
pub fn all_paths(store: &Store, source: NodeId, target: Option<NodeId>, filter: &PathFilter) -> Vec<Vec<LinkId>> {
    let mut results = Vec::new();
    let mut visited = BTreeSet::new();
    visited.insert(source);
    let mut path = Vec::new();
    all_paths_dfs(store, source, target, filter, &mut visited, &mut path, &mut results);
    results
}

#[allow(clippy::too_many_arguments)]
fn all_paths_dfs(
    store: &Store,
    node: NodeId,
    target: Option<NodeId>,
    filter: &PathFilter,
    visited: &mut BTreeSet<NodeId>,
    path: &mut Vec<LinkId>,
    results: &mut Vec<Vec<LinkId>>,
) {
    if let Some(t) = target {
        if node == t {
            results.push(path.clone());
            return;
        }
    }
    let mut dead_end = true;
    let neighbors: Vec<_> = store.adjacent(node, LinkKind::Trunk).collect();
    for (neighbor, link) in neighbors {
        if !filter.node_ok(neighbor) || !filter.trunk_ok(link) || visited.contains(&neighbor) {
            continue;
        }
        dead_end = false;
        visited.insert(neighbor);
        path.push(link);
        all_paths_dfs(store, neighbor, target, filter, visited, path, results);
        path.pop();
        visited.remove(&neighbor);
    }
    if target.is_none() && dead_end && !path.is_empty() {
        results.push(path.clone());
    }
}

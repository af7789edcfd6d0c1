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

//! Max flow (Ford-Fulkerson, Edmonds-Karp, Dinic) and Kruskal's MST (C9),
//! per spec §4.8. The three max-flow algorithms treat a trunk's `sd`/`ds`
//! capacity/flow as two independent directed arcs; augmenting along one
//! direction first cancels any flow already pushed the other way, then
//! consumes its own residual capacity.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use petgraph::unionfind::UnionFind;

use crate::ids::{LinkId, NodeId};
use crate::model::{Link, LinkKind};
use crate::spf::PathFilter;
use crate::store::Store;

/// Zero the `flow` scratch field on every trunk, in both directions.
pub fn reset_flow(store: &mut Store) {
    let trunk_ids: Vec<_> = store.links_of_kind(LinkKind::Trunk).map(|l| l.id()).collect();
    for id in trunk_ids {
        let link = store.link_mut(id).expect("id from store.links_of_kind");
        let trunk = link.as_trunk_mut().expect("filtered to trunk kind");
        trunk.sd.flow = 0.0;
        trunk.ds.flow = 0.0;
    }
}

fn residual_capacity(link: &Link, from: NodeId) -> f64 {
    let Some(to) = link.other_end(from) else { return 0.0 };
    let fwd = link.attrs_from(from).map(|a| a.capacity - a.flow).unwrap_or(0.0).max(0.0);
    let cancel = link.attrs_from(to).map(|a| a.flow).unwrap_or(0.0).max(0.0);
    fwd + cancel
}

fn push_flow(link: &mut Link, from: NodeId, amount: f64) {
    let Some(to) = link.other_end(from) else { return };
    let mut remaining = amount;
    if let Some(a) = link.attrs_from_mut(to) {
        let cancel = remaining.min(a.flow.max(0.0));
        a.flow -= cancel;
        remaining -= cancel;
    }
    if remaining > 1e-12 {
        if let Some(a) = link.attrs_from_mut(from) {
            a.flow += remaining;
        }
    }
}

fn dfs_augment(
    store: &Store,
    node: NodeId,
    target: NodeId,
    filter: &PathFilter,
    visited: &mut BTreeSet<NodeId>,
    path: &mut Vec<(NodeId, LinkId)>,
) -> bool {
    if node == target {
        return true;
    }
    for (neighbor, link) in store.adjacent(node, LinkKind::Trunk) {
        if visited.contains(&neighbor) || !filter.node_ok(neighbor) || !filter.trunk_ok(link) {
            continue;
        }
        let Ok(l) = store.link(link) else { continue };
        if residual_capacity(l, node) <= 1e-12 {
            continue;
        }
        visited.insert(neighbor);
        path.push((node, link));
        if dfs_augment(store, neighbor, target, filter, visited, path) {
            return true;
        }
        path.pop();
    }
    false
}

/// Ford-Fulkerson: recursive DFS augmentation. Calls [`reset_flow`] at
/// entry; returns the total flow leaving `source`.
pub fn ford_fulkerson(store: &mut Store, source: NodeId, target: NodeId, filter: &PathFilter) -> f64 {
    reset_flow(store);
    let mut total = 0.0;
    loop {
        let mut visited = BTreeSet::new();
        visited.insert(source);
        let mut path = Vec::new();
        if !dfs_augment(store, source, target, filter, &mut visited, &mut path) {
            break;
        }
        let bottleneck = path
            .iter()
            .map(|&(from, link)| residual_capacity(store.link(link).expect("path link live"), from))
            .fold(f64::INFINITY, f64::min);
        for &(from, link) in &path {
            push_flow(store.link_mut(link).expect("path link live"), from, bottleneck);
        }
        total += bottleneck;
    }
    total
}

/// Edmonds-Karp: BFS shortest augmenting path, parent map. Calls
/// [`reset_flow`] at entry; returns the total flow leaving `source`.
pub fn edmonds_karp(store: &mut Store, source: NodeId, target: NodeId, filter: &PathFilter) -> f64 {
    reset_flow(store);
    let mut total = 0.0;
    loop {
        let mut parent: BTreeMap<NodeId, (NodeId, LinkId)> = BTreeMap::new();
        let mut visited = BTreeSet::new();
        visited.insert(source);
        let mut queue = VecDeque::new();
        queue.push_back(source);
        while let Some(node) = queue.pop_front() {
            if node == target {
                break;
            }
            for (neighbor, link) in store.adjacent(node, LinkKind::Trunk) {
                if visited.contains(&neighbor) || !filter.node_ok(neighbor) || !filter.trunk_ok(link) {
                    continue;
                }
                let Ok(l) = store.link(link) else { continue };
                if residual_capacity(l, node) <= 1e-12 {
                    continue;
                }
                visited.insert(neighbor);
                parent.insert(neighbor, (node, link));
                queue.push_back(neighbor);
            }
        }
        if !visited.contains(&target) {
            break;
        }
        let mut path = Vec::new();
        let mut cur = target;
        while cur != source {
            let &(prev, link) = parent.get(&cur).expect("reached via BFS parent chain");
            path.push((prev, link));
            cur = prev;
        }
        path.reverse();
        let bottleneck = path
            .iter()
            .map(|&(from, link)| residual_capacity(store.link(link).expect("path link live"), from))
            .fold(f64::INFINITY, f64::min);
        for &(from, link) in &path {
            push_flow(store.link_mut(link).expect("path link live"), from, bottleneck);
        }
        total += bottleneck;
    }
    total
}

fn bfs_levels(store: &Store, source: NodeId, target: NodeId, filter: &PathFilter) -> Option<BTreeMap<NodeId, u32>> {
    let mut level = BTreeMap::new();
    level.insert(source, 0u32);
    let mut queue = VecDeque::new();
    queue.push_back(source);
    while let Some(node) = queue.pop_front() {
        let d = level[&node];
        for (neighbor, link) in store.adjacent(node, LinkKind::Trunk) {
            if level.contains_key(&neighbor) || !filter.node_ok(neighbor) || !filter.trunk_ok(link) {
                continue;
            }
            let Ok(l) = store.link(link) else { continue };
            if residual_capacity(l, node) <= 1e-12 {
                continue;
            }
            level.insert(neighbor, d + 1);
            queue.push_back(neighbor);
        }
    }
    level.contains_key(&target).then_some(level)
}

#[allow(clippy::too_many_arguments)]
fn dinic_dfs(
    store: &mut Store,
    node: NodeId,
    target: NodeId,
    bound: f64,
    level: &BTreeMap<NodeId, u32>,
    iter_ptr: &mut BTreeMap<NodeId, usize>,
    filter: &PathFilter,
) -> f64 {
    if node == target {
        return bound;
    }
    let neighbors: Vec<(NodeId, LinkId)> = store.adjacent(node, LinkKind::Trunk).collect();
    let mut idx = *iter_ptr.get(&node).unwrap_or(&0);
    while idx < neighbors.len() {
        let (neighbor, link) = neighbors[idx];
        if filter.node_ok(neighbor) && filter.trunk_ok(link) && level.get(&neighbor) == Some(&(level.get(&node).copied().unwrap_or(0) + 1)) {
            let res = store.link(link).map(|l| residual_capacity(l, node)).unwrap_or(0.0);
            if res > 1e-12 {
                let pushed = dinic_dfs(store, neighbor, target, bound.min(res), level, iter_ptr, filter);
                if pushed > 1e-12 {
                    push_flow(store.link_mut(link).expect("link validated above"), node, pushed);
                    iter_ptr.insert(node, idx);
                    return pushed;
                }
            }
        }
        idx += 1;
    }
    iter_ptr.insert(node, idx);
    0.0
}

/// Dinic's algorithm: level graph plus blocking flow via a DFS with
/// per-node iterator pointers. Calls [`reset_flow`] at entry; returns the
/// total flow leaving `source`.
pub fn dinic(store: &mut Store, source: NodeId, target: NodeId, filter: &PathFilter) -> f64 {
    reset_flow(store);
    let mut total = 0.0;
    while let Some(level) = bfs_levels(store, source, target, filter) {
        let mut iter_ptr: BTreeMap<NodeId, usize> = BTreeMap::new();
        loop {
            let pushed = dinic_dfs(store, source, target, f64::INFINITY, &level, &mut iter_ptr, filter);
            if pushed <= 1e-12 {
                break;
            }
            total += pushed;
        }
    }
    total
}

/// Kruskal's MST over the trunks allowed by `filter`, using `sd.cost` as the
/// (nominally symmetric) edge weight. Returns a forest when the allowed
/// subgraph is disconnected.
pub fn kruskal(store: &Store, filter: &PathFilter) -> Vec<LinkId> {
    let nodes: Vec<NodeId> = store.nodes().map(|n| n.id()).filter(|&n| filter.node_ok(n)).collect();
    let index_of: BTreeMap<NodeId, usize> = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();
    let mut uf = UnionFind::<usize>::new(nodes.len());

    let mut edges: Vec<(f64, LinkId, NodeId, NodeId)> = store
        .links_of_kind(LinkKind::Trunk)
        .filter(|l| filter.trunk_ok(l.id()) && filter.node_ok(l.source) && filter.node_ok(l.destination))
        .filter_map(|l| l.cost_from(l.source).map(|c| (c, l.id(), l.source, l.destination)))
        .collect();
    edges.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut mst = Vec::new();
    for (_, link_id, a, b) in edges {
        let (Some(&ia), Some(&ib)) = (index_of.get(&a), index_of.get(&b)) else {
            continue;
        };
        if uf.find(ia) != uf.find(ib) {
            uf.union(ia, ib);
            mst.push(link_id);
        }
    }
    mst
}

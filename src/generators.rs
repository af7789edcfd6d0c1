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

//! Graph generators (spec §6): each builds a fresh set of nodes of the
//! given subtype into the store and wires them with ethernet trunks,
//! returning the created node handles.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::ids::NodeId;
use crate::model::{NodeKind, TrunkProtocol};
use crate::store::Store;

fn node(store: &mut Store, prefix: &str, name: impl std::fmt::Display, subtype: NodeKind) -> NodeId {
    store.node_factory(&format!("{prefix}{name}"), subtype)
}

fn link(store: &mut Store, a: NodeId, b: NodeId) {
    store
        .trunk_factory(None, TrunkProtocol::Ethernet, a, b)
        .expect("node handles from the same store are always live");
}

/// A balanced binary tree with `2^n - 1` nodes (spec: `tree(n)`), numbering
/// nodes in heap order so node `i`'s children are `2i+1` and `2i+2`.
pub fn tree(store: &mut Store, n: u32, subtype: NodeKind) -> Vec<NodeId> {
    let prefix = "tree";
    let mut nodes = Vec::new();
    for i in 0..(2u64.pow(n) - 1) {
        let (n1, n2, n3) = (i, 2 * i + 1, 2 * i + 2);
        let a = node(store, prefix, n1, subtype);
        let b = node(store, prefix, n2, subtype);
        let c = node(store, prefix, n3, subtype);
        link(store, a, b);
        link(store, a, c);
        nodes.extend([a, b, c]);
    }
    nodes.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// A star: one center node connected to `n` leaves.
pub fn star(store: &mut Store, n: u32, subtype: NodeKind) -> Vec<NodeId> {
    let prefix = "star";
    let center = node(store, prefix, 0, subtype);
    let mut nodes = vec![center];
    for i in 0..n {
        let leaf = node(store, prefix, i + 1, subtype);
        link(store, center, leaf);
        nodes.push(leaf);
    }
    nodes
}

/// A complete graph on `n` nodes.
pub fn full_mesh(store: &mut Store, n: u32, subtype: NodeKind) -> Vec<NodeId> {
    let prefix = "mesh";
    let nodes: Vec<NodeId> = (0..n).map(|i| node(store, prefix, i, subtype)).collect();
    for i in 0..n as usize {
        for j in 0..i {
            link(store, nodes[j], nodes[i]);
        }
    }
    nodes
}

/// A cycle on `n` nodes.
pub fn ring(store: &mut Store, n: u32, subtype: NodeKind) -> Vec<NodeId> {
    let prefix = "ring";
    let nodes: Vec<NodeId> = (0..n).map(|i| node(store, prefix, i, subtype)).collect();
    for i in 0..n as usize {
        link(store, nodes[i], nodes[(i + 1) % n as usize]);
    }
    nodes
}

/// An `n x n` square lattice, each node connected to its right and below
/// neighbor.
pub fn square_tiling(store: &mut Store, n: u32, subtype: NodeKind) -> Vec<NodeId> {
    let prefix = "grid";
    let total = n * n;
    let nodes: Vec<NodeId> = (0..total).map(|i| node(store, prefix, i, subtype)).collect();
    for i in 0..total as i64 {
        let (i_u, n_i64) = (i as usize, n as i64);
        if i - 1 > -1 && i % n_i64 != 0 {
            link(store, nodes[i_u], nodes[(i - 1) as usize]);
        }
        if i + n_i64 < total as i64 {
            link(store, nodes[i_u], nodes[(i + n_i64) as usize]);
        }
    }
    nodes
}

/// An `n`-dimensional hypercube (`2^n` nodes), built by connecting two
/// `(n-1)`-dimensional hypercubes bit by bit.
pub fn hypercube(store: &mut Store, n: u32, subtype: NodeKind) -> Vec<NodeId> {
    let prefix = "cube";
    let mut nodes = vec![node(store, prefix, 0, subtype)];
    let mut edges: Vec<(u64, u64)> = Vec::new();
    for i in 0..n {
        let offset = 1u64 << i;
        let base_count = nodes.len();
        for k in 0..base_count {
            nodes.push(node(store, prefix, k as u64 + offset, subtype));
        }
        let mut new_edges = Vec::new();
        for &(a, b) in &edges {
            let (na, nb) = (a + offset, b + offset);
            link(store, nodes[na as usize], nodes[nb as usize]);
            new_edges.push((na, nb));
        }
        for k in 0..base_count {
            link(store, nodes[k], nodes[k + base_count]);
            new_edges.push((k as u64, (k + base_count) as u64));
        }
        edges.extend(new_edges);
    }
    nodes
}

/// The Kneser graph `K(n,k)`: one node per `k`-subset of `{1,...,n-1}`, an
/// edge between every pair of disjoint subsets.
pub fn kneser(store: &mut Store, n: u32, k: u32, subtype: NodeKind) -> Vec<NodeId> {
    let subsets: Vec<BTreeSet<u32>> = (1..n).combinations(k as usize).map(|c| c.into_iter().collect()).collect();
    let mut nodes = Vec::new();
    let mut already_done = BTreeSet::new();
    for set_a in &subsets {
        already_done.insert(set_a.clone());
        let na = node(store, "kneser", format!("{set_a:?}"), subtype);
        nodes.push(na);
        for set_b in &subsets {
            if already_done.contains(set_b) || !set_a.is_disjoint(set_b) {
                continue;
            }
            let nb = node(store, "kneser", format!("{set_b:?}"), subtype);
            link(store, na, nb);
        }
    }
    nodes.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// The generalized Petersen graph `GP(n,k)`: an outer `n`-cycle `u_i`, an
/// inner "star polygon" `v_i` with `(v_i, v_(i+k mod n))` edges, and spokes
/// `(u_i, v_i)`.
pub fn petersen(store: &mut Store, n: u32, k: u32, subtype: NodeKind) -> Vec<NodeId> {
    let prefix = "petersen";
    let outer: Vec<NodeId> = (0..n).map(|i| node(store, prefix, i, subtype)).collect();
    let inner: Vec<NodeId> = (0..n).map(|i| node(store, prefix, i + n, subtype)).collect();
    for i in 0..n as usize {
        link(store, outer[i], outer[(i + 1) % n as usize]);
        link(store, outer[i], inner[i]);
        link(store, inner[i], inner[(i + k as usize) % n as usize]);
    }
    outer.into_iter().chain(inner).collect()
}

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

//! Structural checks on the graph generators: node/edge counts and
//! degree sequences.

use std::collections::BTreeMap;

use crate::ids::NodeId;
use crate::model::NodeKind;
use crate::network::Network;

fn degrees(net: &Network, nodes: &[NodeId]) -> BTreeMap<NodeId, usize> {
    let mut deg: BTreeMap<NodeId, usize> = nodes.iter().map(|&n| (n, 0)).collect();
    for link in net.store().links_of_kind(crate::model::LinkKind::Trunk) {
        *deg.entry(link.source).or_default() += 1;
        *deg.entry(link.destination).or_default() += 1;
    }
    deg
}

fn edge_count(net: &Network) -> usize {
    net.store().links_of_kind(crate::model::LinkKind::Trunk).count()
}

#[test]
fn tree_is_a_connected_acyclic_graph() {
    let mut net = Network::new();
    let nodes = net.tree(2, NodeKind::Router);
    // a tree on k nodes has exactly k - 1 edges.
    assert_eq!(edge_count(&net), nodes.len() - 1);
    // every node but the root has exactly one parent edge plus however
    // many children it was given, so no node is isolated.
    let deg = degrees(&net, &nodes);
    assert!(deg.values().all(|&d| d >= 1));
}

#[test]
fn star_has_one_hub_and_n_leaves_of_degree_one() {
    let mut net = Network::new();
    let nodes = net.star(5, NodeKind::Router);
    assert_eq!(nodes.len(), 6);
    assert_eq!(edge_count(&net), 5);
    let deg = degrees(&net, &nodes);
    let hub = nodes[0];
    assert_eq!(deg[&hub], 5);
    for &leaf in &nodes[1..] {
        assert_eq!(deg[&leaf], 1);
    }
}

#[test]
fn full_mesh_is_n_minus_one_regular() {
    let mut net = Network::new();
    let n = 5;
    let nodes = net.full_mesh(n, NodeKind::Router);
    assert_eq!(nodes.len(), n as usize);
    assert_eq!(edge_count(&net), (n * (n - 1) / 2) as usize);
    let deg = degrees(&net, &nodes);
    assert!(deg.values().all(|&d| d == (n - 1) as usize));
}

#[test]
fn ring_is_two_regular() {
    let mut net = Network::new();
    let n = 6;
    let nodes = net.ring(n, NodeKind::Router);
    assert_eq!(nodes.len(), n as usize);
    assert_eq!(edge_count(&net), n as usize);
    let deg = degrees(&net, &nodes);
    assert!(deg.values().all(|&d| d == 2));
}

#[test]
fn square_tiling_has_the_expected_edge_count() {
    let mut net = Network::new();
    let n = 3;
    let nodes = net.square_tiling(n, NodeKind::Router);
    assert_eq!(nodes.len(), (n * n) as usize);
    assert_eq!(edge_count(&net), (2 * n * (n - 1)) as usize);
}

#[test]
fn hypercube_is_n_regular_with_two_to_the_n_nodes() {
    let mut net = Network::new();
    let n = 3;
    let nodes = net.hypercube(n, NodeKind::Router);
    assert_eq!(nodes.len(), 2usize.pow(n));
    let deg = degrees(&net, &nodes);
    assert!(deg.values().all(|&d| d == n as usize));
}

#[test]
fn kneser_graph_matches_the_classic_petersen_parameters() {
    let mut net = Network::new();
    // ground set {1..5}, 2-subsets: the Petersen graph, 3-regular on 10 nodes.
    let nodes = net.kneser(6, 2, NodeKind::Router);
    assert_eq!(nodes.len(), 10);
    let deg = degrees(&net, &nodes);
    assert!(deg.values().all(|&d| d == 3));
    assert_eq!(edge_count(&net), 15);
}

#[test]
fn generalized_petersen_graph_is_cubic() {
    let mut net = Network::new();
    let nodes = net.petersen(5, 2, NodeKind::Router);
    assert_eq!(nodes.len(), 10);
    assert_eq!(edge_count(&net), 15);
    let deg = degrees(&net, &nodes);
    assert!(deg.values().all(|&d| d == 3));
}

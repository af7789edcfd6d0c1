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

//! Cross-cutting properties that must hold of every valid topology,
//! independent of any single end-to-end scenario.

use std::collections::BTreeSet;

use crate::model::LinkKind;
use crate::spf::PathFilter;
use crate::test::helpers::{rip_as, router, trunk};
use crate::network::Network;

/// `object_factory` resolves a node by name idempotently, but cannot
/// conjure a link that doesn't already exist.
#[test]
fn object_factory_creates_nodes_but_only_looks_up_links() {
    use crate::network::{ObjectId, ObjectKind};

    let mut net = Network::new();
    let a = net.object_factory("A", ObjectKind::Node(crate::model::NodeKind::Router)).unwrap();
    let a_again = net.object_factory("A", ObjectKind::Node(crate::model::NodeKind::Router)).unwrap();
    assert_eq!(a, a_again);
    let ObjectId::Node(a_id) = a else { panic!("expected a node") };

    let b = router(&mut net, "B");
    let ab = trunk(&mut net, a_id, b, 1.0);
    let ab_name = net.store().link(ab).unwrap().name.clone();
    let resolved = net.object_factory(&ab_name, ObjectKind::Link(LinkKind::Trunk)).unwrap();
    assert_eq!(resolved, ObjectId::Link(ab));

    assert!(net.object_factory("no-such-trunk", ObjectKind::Link(LinkKind::Trunk)).is_err());
}

/// Property 1: adjacency is symmetric, and removing a trunk clears both
/// endpoints' entries.
#[test]
fn adjacency_is_symmetric_and_removal_clears_both_sides() {
    let mut net = Network::new();
    let a = router(&mut net, "A");
    let b = router(&mut net, "B");
    let ab = trunk(&mut net, a, b, 1.0);

    let a_side: Vec<_> = net.store().adjacent(a, LinkKind::Trunk).collect();
    let b_side: Vec<_> = net.store().adjacent(b, LinkKind::Trunk).collect();
    assert_eq!(a_side, vec![(b, ab)]);
    assert_eq!(b_side, vec![(a, ab)]);

    net.store_mut().remove_link(ab).unwrap();
    assert!(net.store().adjacent(a, LinkKind::Trunk).next().is_none());
    assert!(net.store().adjacent(b, LinkKind::Trunk).next().is_none());
}

/// Property 2: within one AS area, no two trunks share an IP, and every
/// trunk ends up with a `/30` mask.
#[test]
fn addressing_assigns_unique_ips_with_slash_thirty_masks() {
    let mut net = Network::new();
    let a = router(&mut net, "A");
    let b = router(&mut net, "B");
    let c = router(&mut net, "C");
    let d = router(&mut net, "D");
    let ab = trunk(&mut net, a, b, 1.0);
    let bc = trunk(&mut net, b, c, 1.0);
    let cd = trunk(&mut net, c, d, 1.0);
    rip_as(&mut net, "AS1", &[a, b, c, d], &[ab, bc, cd]);

    net.calculate_all().unwrap();

    let mut seen = BTreeSet::new();
    for &t in &[ab, bc, cd] {
        let data = net.store().link(t).unwrap().as_trunk().unwrap();
        let mask = Some(std::net::Ipv4Addr::new(255, 255, 255, 252));
        assert_eq!(data.sd.subnetmask, mask);
        assert_eq!(data.ds.subnetmask, mask);
        assert!(seen.insert(data.sd.ipaddress.expect("addressed trunk")));
        assert!(seen.insert(data.ds.ipaddress.expect("addressed trunk")));
    }
}

/// Property 3: every RFT entry set for a router/subnetwork pair shares one
/// cost and stays within the ECMP cap.
#[test]
fn rft_entries_share_cost_and_respect_the_ecmp_cap() {
    let mut net = Network::new();
    net.set_ecmp_cap(2);
    let a = router(&mut net, "A");
    let b = router(&mut net, "B");
    let c = router(&mut net, "C");
    let d = router(&mut net, "D");
    let ab = trunk(&mut net, a, b, 1.0);
    let ac = trunk(&mut net, a, c, 1.0);
    let bd = trunk(&mut net, b, d, 1.0);
    let cd = trunk(&mut net, c, d, 1.0);
    rip_as(&mut net, "AS1", &[a, b, c, d], &[ab, ac, bd, cd]);

    net.calculate_all().unwrap();

    for entries in net.node("A").unwrap().rft.values() {
        assert!(entries.len() <= 2);
        let costs: BTreeSet<_> = entries.iter().map(|e| e.cost.into_inner().to_bits()).collect();
        assert_eq!(costs.len(), 1, "mixed costs in one ECMP set: {entries:?}");
        let types: BTreeSet<_> = entries.iter().map(|e| e.rtype).collect();
        assert_eq!(types.len(), 1, "mixed route types in one ECMP set: {entries:?}");
    }
}

/// Property 4: ECMP traffic conserves total throughput leaving the source.
#[test]
fn ecmp_traffic_conserves_total_throughput_leaving_source() {
    let mut net = Network::new();
    net.set_ecmp_cap(2);
    let a = router(&mut net, "A");
    let b = router(&mut net, "B");
    let c = router(&mut net, "C");
    let d = router(&mut net, "D");
    let ab = trunk(&mut net, a, b, 1.0);
    let ac = trunk(&mut net, a, c, 1.0);
    let bd = trunk(&mut net, b, d, 1.0);
    let cd = trunk(&mut net, c, d, 1.0);
    rip_as(&mut net, "AS1", &[a, b, c, d], &[ab, ac, bd, cd]);
    net.traffic_factory(None, a, d, 10.0).unwrap();

    net.calculate_all().unwrap();

    let ab_data = net.store().link(ab).unwrap().as_trunk().unwrap();
    let ac_data = net.store().link(ac).unwrap().as_trunk().unwrap();
    let leaving_a = ab_data.sd.traffic + ac_data.sd.traffic;
    assert!((leaving_a - 10.0).abs() < 1e-9);
}

/// Property 5: Bhandari and Suurballe both split their result into two
/// trunk-disjoint simple paths.
#[test]
fn disjoint_path_pairs_share_no_trunk() {
    let mut net = Network::new();
    let a = router(&mut net, "A");
    let b = router(&mut net, "B");
    let c = router(&mut net, "C");
    let d = router(&mut net, "D");
    let ab = trunk(&mut net, a, b, 1.0);
    let bc = trunk(&mut net, b, c, 1.0);
    let ad = trunk(&mut net, a, d, 1.0);
    let dc = trunk(&mut net, d, c, 1.0);
    let _ac = trunk(&mut net, a, c, 3.0);

    let bhandari = net.bhandari(a, c, &PathFilter::unrestricted());
    let suurballe = net.suurballe(a, c, &PathFilter::unrestricted());

    assert_eq!(bhandari, BTreeSet::from([ab, bc, ad, dc]));
    assert_eq!(suurballe, BTreeSet::from([ab, bc, ad, dc]));
}

/// Property 6: Ford-Fulkerson, Edmonds-Karp and Dinic agree on the max-flow
/// value of the same graph.
#[test]
fn max_flow_algorithms_agree_on_value() {
    fn build() -> (Network, crate::ids::NodeId, crate::ids::NodeId) {
        let mut net = Network::new();
        let s = router(&mut net, "S");
        let a = router(&mut net, "A");
        let t = router(&mut net, "T");
        let sa = trunk(&mut net, s, a, 1.0);
        let at = trunk(&mut net, a, t, 1.0);
        crate::test::helpers::set_capacity(&mut net, sa, 7.0);
        crate::test::helpers::set_capacity(&mut net, at, 4.0);
        (net, s, t)
    }
    let (mut ff_net, s1, t1) = build();
    let (mut ek_net, s2, t2) = build();
    let (mut di_net, s3, t3) = build();

    let ff = ff_net.ford_fulkerson(s1, t1, &PathFilter::unrestricted());
    let ek = ek_net.edmonds_karp(s2, t2, &PathFilter::unrestricted());
    let di = di_net.dinic(s3, t3, &PathFilter::unrestricted());

    assert!((ff - 4.0).abs() < 1e-9);
    assert!((ff - ek).abs() < 1e-9);
    assert!((ek - di).abs() < 1e-9);
}

/// Property 7: Floyd-Warshall agrees with Dijkstra on every pair, when all
/// costs are non-negative.
#[test]
fn floyd_warshall_agrees_with_dijkstra_on_every_pair() {
    let mut net = Network::new();
    let a = router(&mut net, "A");
    let b = router(&mut net, "B");
    let c = router(&mut net, "C");
    let d = router(&mut net, "D");
    let ab = trunk(&mut net, a, b, 1.0);
    let bc = trunk(&mut net, b, c, 2.0);
    let _cd = trunk(&mut net, c, d, 3.0);
    let _bd = trunk(&mut net, b, d, 10.0);
    let _ = ab;
    let _ = bc;

    let filter = PathFilter::unrestricted();
    let w = net.floyd_warshall(&filter).expect("no negative cycle");

    for &x in &[a, b, c, d] {
        for &y in &[a, b, c, d] {
            let (dist, _, _) = net.dijkstra(x, y, &filter);
            let expected = dist.get(&y).copied().unwrap_or(f64::INFINITY);
            let actual = w.get(&(x, y)).copied().unwrap_or(f64::INFINITY);
            if expected.is_finite() {
                assert!((expected - actual).abs() < 1e-9, "{x:?}->{y:?}: {expected} vs {actual}");
            } else {
                assert!(!actual.is_finite());
            }
        }
    }
}

/// Property 8: OSPF paths never cross a trunk outside the source area,
/// the backbone, or the target area.
#[test]
fn ospf_routing_never_leaves_its_allowed_regions() {
    let mut net = Network::new();
    let r = router(&mut net, "R");
    let a1 = router(&mut net, "A1");
    let a2 = router(&mut net, "A2");
    let stray = router(&mut net, "Stray");

    let t_a1_r = trunk(&mut net, a1, r, 1.0);
    let t_r_a2 = trunk(&mut net, r, a2, 1.0);
    let t_stray = trunk(&mut net, a1, stray, 1.0);

    let as_id = net.as_factory("AS1", crate::model::AsKind::Ospf);
    let area1 = net.area_factory(as_id, "Area1").unwrap();
    let area2 = net.area_factory(as_id, "Area2").unwrap();
    net.add_node_to_as(as_id, area1, a1).unwrap();
    net.add_node_to_as(as_id, area1, r).unwrap();
    net.add_node_to_as(as_id, area2, r).unwrap();
    net.add_node_to_as(as_id, area2, a2).unwrap();
    net.add_trunk_to_as(as_id, t_a1_r).unwrap();
    net.add_trunk_to_as(as_id, t_r_a2).unwrap();

    let (_, path) = net.ospf_routing(as_id, a1, a2).unwrap();
    assert!(!path.contains(&t_stray));
    assert_eq!(BTreeSet::from_iter(path), BTreeSet::from([t_a1_r, t_r_a2]));
}

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

//! S6: a 4-node graph whose s-side min cut is 11, so all three max-flow
//! algorithms must agree on that value.

use crate::spf::PathFilter;
use crate::test::helpers::{router, set_capacity, trunk};
use crate::network::Network;

fn build() -> (Network, crate::ids::NodeId, crate::ids::NodeId) {
    let mut net = Network::new();
    let s = router(&mut net, "S");
    let a = router(&mut net, "A");
    let b = router(&mut net, "B");
    let t = router(&mut net, "T");
    let sa = trunk(&mut net, s, a, 1.0);
    let sb = trunk(&mut net, s, b, 1.0);
    let ab = trunk(&mut net, a, b, 1.0);
    let at = trunk(&mut net, a, t, 1.0);
    let bt = trunk(&mut net, b, t, 1.0);
    set_capacity(&mut net, sa, 10.0);
    set_capacity(&mut net, sb, 1.0);
    set_capacity(&mut net, ab, 1.0);
    set_capacity(&mut net, at, 10.0);
    set_capacity(&mut net, bt, 10.0);
    (net, s, t)
}

#[test]
fn ford_fulkerson_finds_max_flow_eleven() {
    let (mut net, s, t) = build();
    let value = net.ford_fulkerson(s, t, &PathFilter::unrestricted());
    assert!((value - 11.0).abs() < 1e-9);
}

#[test]
fn edmonds_karp_finds_max_flow_eleven() {
    let (mut net, s, t) = build();
    let value = net.edmonds_karp(s, t, &PathFilter::unrestricted());
    assert!((value - 11.0).abs() < 1e-9);
}

#[test]
fn dinic_finds_max_flow_eleven() {
    let (mut net, s, t) = build();
    let value = net.dinic(s, t, &PathFilter::unrestricted());
    assert!((value - 11.0).abs() < 1e-9);
}

#[test]
fn all_three_max_flow_algorithms_agree() {
    let (mut net1, s1, t1) = build();
    let (mut net2, s2, t2) = build();
    let (mut net3, s3, t3) = build();
    let ff = net1.ford_fulkerson(s1, t1, &PathFilter::unrestricted());
    let ek = net2.edmonds_karp(s2, t2, &PathFilter::unrestricted());
    let di = net3.dinic(s3, t3, &PathFilter::unrestricted());
    assert!((ff - ek).abs() < 1e-9);
    assert!((ek - di).abs() < 1e-9);
}

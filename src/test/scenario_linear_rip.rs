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

//! S1: three routers A-B-C, one RIP AS, unit trunk costs.

use crate::model::RouteType;
use crate::network::Network;
use crate::test::helpers::{rip_as, router, trunk};

#[test]
fn linear_rip_builds_two_hop_route() {
    let mut net = Network::new();
    let a = router(&mut net, "A");
    let b = router(&mut net, "B");
    let c = router(&mut net, "C");
    let ab = trunk(&mut net, a, b, 1.0);
    let bc = trunk(&mut net, b, c, 1.0);
    rip_as(&mut net, "AS1", &[a, b, c], &[ab, bc]);

    net.calculate_all().unwrap();

    let bc_sntw = net.store().link(bc).unwrap().as_trunk().unwrap().sntw.unwrap();
    let entries = &net.node("A").unwrap().rft[&bc_sntw];
    assert_eq!(entries.len(), 1);
    let entry = entries.iter().next().unwrap();
    assert_eq!(entry.rtype, RouteType::Rip);
    assert_eq!(entry.next_hop_node, b);
    assert_eq!(entry.exit_link, ab);
    assert!((entry.cost.into_inner() - 2.0).abs() < 1e-9);
}

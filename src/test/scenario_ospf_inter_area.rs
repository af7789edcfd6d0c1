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

//! S3: two OSPF areas joined at a single ABR.

use crate::model::{AsKind, RouteType};
use crate::network::Network;
use crate::test::helpers::{router, trunk};

#[test]
fn ospf_classifies_intra_and_inter_area_routes() {
    let mut net = Network::new();
    let r = router(&mut net, "R");
    let a1 = router(&mut net, "A1");
    let a1c = router(&mut net, "A1c");
    let a2 = router(&mut net, "A2");

    let t_a1_r = trunk(&mut net, a1, r, 1.0);
    let t_r_a1c = trunk(&mut net, r, a1c, 1.0);
    let t_r_a2 = trunk(&mut net, r, a2, 1.0);

    let as_id = net.as_factory("AS1", AsKind::Ospf);
    let area1 = net.area_factory(as_id, "Area1").unwrap();
    let area2 = net.area_factory(as_id, "Area2").unwrap();
    net.add_node_to_as(as_id, area1, a1).unwrap();
    net.add_node_to_as(as_id, area1, a1c).unwrap();
    net.add_node_to_as(as_id, area1, r).unwrap();
    net.add_node_to_as(as_id, area2, r).unwrap();
    net.add_node_to_as(as_id, area2, a2).unwrap();
    for &t in &[t_a1_r, t_r_a1c, t_r_a2] {
        net.add_trunk_to_as(as_id, t).unwrap();
    }

    net.calculate_all().unwrap();

    let intra_sntw = net.store().link(t_r_a1c).unwrap().as_trunk().unwrap().sntw.unwrap();
    let inter_sntw = net.store().link(t_r_a2).unwrap().as_trunk().unwrap().sntw.unwrap();

    let a1_rft = &net.node("A1").unwrap().rft;
    let intra_entry = a1_rft[&intra_sntw].iter().next().unwrap();
    assert_eq!(intra_entry.rtype, RouteType::OspfIntra);

    let inter_entry = a1_rft[&inter_sntw].iter().next().unwrap();
    assert_eq!(inter_entry.rtype, RouteType::OspfInterArea);
}

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

//! S4: traffic routed over S1's linear topology carries its full
//! throughput on every trunk; over S2's diamond (extended with a stub
//! router E off D, per the ECMP-diamond scenario) it splits evenly across
//! both arms.

use crate::network::Network;
use crate::test::helpers::{rip_as, router, trunk};

#[test]
fn traffic_carries_full_throughput_on_a_single_path() {
    let mut net = Network::new();
    let a = router(&mut net, "A");
    let b = router(&mut net, "B");
    let c = router(&mut net, "C");
    let ab = trunk(&mut net, a, b, 1.0);
    let bc = trunk(&mut net, b, c, 1.0);
    rip_as(&mut net, "AS1", &[a, b, c], &[ab, bc]);
    net.traffic_factory(None, a, c, 10.0).unwrap();

    net.calculate_all().unwrap();

    let ab_data = net.store().link(ab).unwrap().as_trunk().unwrap();
    let bc_data = net.store().link(bc).unwrap().as_trunk().unwrap();
    assert!((ab_data.sd.traffic - 10.0).abs() < 1e-9);
    assert!((bc_data.sd.traffic - 10.0).abs() < 1e-9);
}

#[test]
fn traffic_splits_evenly_across_ecmp_paths() {
    let mut net = Network::new();
    net.set_ecmp_cap(2);
    let a = router(&mut net, "A");
    let b = router(&mut net, "B");
    let c = router(&mut net, "C");
    let d = router(&mut net, "D");
    let e = router(&mut net, "E");
    let ab = trunk(&mut net, a, b, 1.0);
    let ac = trunk(&mut net, a, c, 1.0);
    let bd = trunk(&mut net, b, d, 1.0);
    let cd = trunk(&mut net, c, d, 1.0);
    let de = trunk(&mut net, d, e, 1.0);
    rip_as(&mut net, "AS1", &[a, b, c, d, e], &[ab, ac, bd, cd, de]);
    // E's only trunk is d-e, so its subnetwork is unambiguous: A's RFT
    // for it holds both `ab` and `ac` as a genuine 2-entry ECMP set (both
    // arms reach it at cost 3, via `A-B-D-E` and `A-C-D-E`).
    net.traffic_factory(None, a, e, 10.0).unwrap();

    net.calculate_all().unwrap();

    for t in [ab, ac, bd, cd] {
        let data = net.store().link(t).unwrap().as_trunk().unwrap();
        assert!((data.sd.traffic - 5.0).abs() < 1e-9, "trunk {t} carried {}", data.sd.traffic);
    }
    let de_data = net.store().link(de).unwrap().as_trunk().unwrap();
    assert!((de_data.sd.traffic - 10.0).abs() < 1e-9);
}

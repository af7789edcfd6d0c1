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

//! S2: diamond A-{B,C}-D, unit trunk costs, RIP, K=2, plus a stub router E
//! off D so the destination subnet is genuinely equidistant via both arms
//! (`subnet(B-D)` itself is only reached at cost 2 via `ab` and at cost 3
//! via `ac`, so it is not a real ECMP case; `subnet(D-E)` is reached at
//! cost 3 from both `A-B-D-E` and `A-C-D-E`).

use crate::network::Network;
use crate::test::helpers::{rip_as, router, trunk};

#[test]
fn ecmp_diamond_splits_across_both_exits() {
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

    net.calculate_all().unwrap();

    let de_sntw = net.store().link(de).unwrap().as_trunk().unwrap().sntw.unwrap();
    let entries = &net.node("A").unwrap().rft[&de_sntw];
    assert_eq!(entries.len(), 2);

    let exit_links: std::collections::BTreeSet<_> = entries.iter().map(|e| e.exit_link).collect();
    assert_eq!(exit_links, std::collections::BTreeSet::from([ab, ac]));
    for entry in entries {
        assert!((entry.cost.into_inner() - 3.0).abs() < 1e-9);
    }
}

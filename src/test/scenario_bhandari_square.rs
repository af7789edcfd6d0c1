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

//! S5: Bhandari's disjoint-path pair on a square with a costly diagonal.

use std::collections::BTreeSet;

use crate::spf::PathFilter;
use crate::test::helpers::{router, trunk};
use crate::network::Network;

#[test]
fn bhandari_avoids_the_cheap_but_shared_diagonal() {
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

    let result = net.bhandari(a, c, &PathFilter::unrestricted());

    assert_eq!(result, BTreeSet::from([ab, bc, ad, dc]));
}

#[test]
fn suurballe_agrees_with_bhandari_on_the_same_square() {
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

    let result = net.suurballe(a, c, &PathFilter::unrestricted());

    assert_eq!(result, BTreeSet::from([ab, bc, ad, dc]));
}

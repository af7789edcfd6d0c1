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

//! Module that introduces a formatter to display all types containing
//! handles ([`NodeId`], [`LinkId`], [`AsId`], [`AreaId`]) by looking up
//! their names in a [`Network`].

use itertools::Itertools;

use crate::ids::{AreaId, AsId, LinkId, NodeId};
use crate::network::Network;

/// Trait to format a type that contains handles, by resolving them to
/// names via a [`Network`].
pub trait NetworkFormatter {
    /// Return a formatted string by looking up handles in the network.
    fn fmt(&self, net: &Network) -> String;
}

impl<T: NetworkFormatter> NetworkFormatter for &T {
    fn fmt(&self, net: &Network) -> String {
        T::fmt(*self, net)
    }
}

impl<T: NetworkFormatter> NetworkFormatter for Option<T> {
    fn fmt(&self, net: &Network) -> String {
        match self {
            Some(x) => format!("Some({})", x.fmt(net)),
            None => "None".to_string(),
        }
    }
}

impl<T: NetworkFormatter, E: NetworkFormatter> NetworkFormatter for Result<T, E> {
    fn fmt(&self, net: &Network) -> String {
        match self {
            Ok(x) => format!("Ok({})", x.fmt(net)),
            Err(e) => format!("Err({})", e.fmt(net)),
        }
    }
}

impl<T: NetworkFormatter> NetworkFormatter for Vec<T> {
    fn fmt(&self, net: &Network) -> String {
        format!("[{}]", self.iter().map(|x| x.fmt(net)).join(", "))
    }
}

impl NetworkFormatter for NodeId {
    fn fmt(&self, net: &Network) -> String {
        match net.store().node(*self) {
            Ok(n) => n.name.clone(),
            Err(_) => "?".to_string(),
        }
    }
}

impl NetworkFormatter for LinkId {
    fn fmt(&self, net: &Network) -> String {
        match net.store().link(*self) {
            Ok(l) => format!("{} -> {}", l.source.fmt(net), l.destination.fmt(net)),
            Err(_) => "?".to_string(),
        }
    }
}

impl NetworkFormatter for AsId {
    fn fmt(&self, net: &Network) -> String {
        match net.store().as_(*self) {
            Ok(a) => a.name.clone(),
            Err(_) => "?".to_string(),
        }
    }
}

impl NetworkFormatter for AreaId {
    fn fmt(&self, net: &Network) -> String {
        match net.store().area(*self) {
            Ok(a) => a.name.clone(),
            Err(_) => "?".to_string(),
        }
    }
}

impl NetworkFormatter for (NodeId, NodeId) {
    fn fmt(&self, net: &Network) -> String {
        format!("({}, {})", self.0.fmt(net), self.1.fmt(net))
    }
}

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

#![warn(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # netscenario
//!
//! A network-simulation engine for IP and optical networks: address
//! assignment, RIP/OSPF/IS-IS routing-table construction with ECMP, traffic
//! routing, disjoint-path and max-flow algorithms, force-directed layout,
//! and topology generators.
//!
//! ## Main Concepts
//!
//! [`network::Network`] is the top-level handle: it owns a [`store::Store`]
//! (the arena of nodes, trunks/routes/traffic demands, ASes, and areas) and
//! a [`failure::FailureState`], and exposes every operation the engine
//! supports. [`network::Network::calculate_all`] runs the full pipeline —
//! addressing, per-router RFT construction, and traffic routing — in one
//! call.
//!
//! Nodes and links are created through idempotent-by-name factories
//! ([`store::Store::node_factory`], [`store::Store::trunk_factory`], and
//! friends) and referenced afterwards by opaque handles
//! ([`ids::NodeId`], [`ids::LinkId`], [`ids::AsId`], [`ids::AreaId`]).
//! A link is one of three kinds ([`model::LinkKind`]): a [`model::TrunkData`]
//! physical trunk, a [`model::RouteData`] abstracted unidirectional route,
//! or a [`model::TrafficData`] aggregate demand.
//!
//! Routers are organized into autonomous systems ([`model::As`]), each
//! running RIP, OSPF, or IS-IS ([`model::AsKind`]); OSPF/IS-IS ASes are
//! further divided into areas ([`model::Area`]) around a distinguished
//! backbone. [`protocols`] computes protocol-respecting paths; [`rft`]
//! turns those paths into each router's ECMP forwarding table; [`traffic`]
//! splits demand throughput proportionally across that table's entries.
//!
//! [`spf`] is the shared shortest-path kernel (Dijkstra, A*, Bellman-Ford,
//! Floyd-Warshall, exhaustive path enumeration) that every higher-level
//! component is built on, parameterized by a [`spf::PathFilter`] that both
//! ad-hoc callers and [`failure::FailureState`] use to restrict or exclude
//! nodes and trunks. [`disjoint`] and [`flow`] build on the same kernel for
//! disjoint path pairs, max flow, and minimum spanning trees/forests.
//!
//! ## Optional Features
//!
//! - `milp`: adds [`milp`], exact MILP formulations of shortest path, max
//!   flow, min-cost flow, K disjoint shortest paths, and RWA wavelength
//!   assignment, built on [good_lp](https://docs.rs/good_lp). Off by
//!   default: a missing solver backend should fail a build cleanly rather
//!   than be a hard requirement.
//!
//! ## Example usage
//!
//! ```
//! use netscenario::model::{AsKind, NodeKind, TrunkProtocol};
//! use netscenario::network::Network;
//!
//! let mut net = Network::new();
//! let r1 = net.node_factory("R1", NodeKind::Router);
//! let r2 = net.node_factory("R2", NodeKind::Router);
//! let trunk = net.trunk_factory(None, TrunkProtocol::Ethernet, r1, r2).unwrap();
//!
//! let as1 = net.as_factory("AS1", AsKind::Rip);
//! let backbone = net.area_factory(as1, "Backbone").unwrap();
//! net.add_node_to_as(as1, backbone, r1).unwrap();
//! net.add_node_to_as(as1, backbone, r2).unwrap();
//! net.add_trunk_to_as(as1, trunk).unwrap();
//!
//! net.calculate_all().unwrap();
//! assert!(!net.node("R1").unwrap().rft.is_empty());
//! ```

pub mod addressing;
pub mod as_model;
pub mod disjoint;
pub mod error;
pub mod failure;
pub mod flow;
pub mod formatter;
pub mod generators;
pub mod ids;
pub mod layout;
#[cfg(feature = "milp")]
#[cfg_attr(docsrs, doc(cfg(feature = "milp")))]
pub mod milp;
pub mod model;
pub mod network;
pub mod protocols;
pub mod rft;
pub mod spf;
pub mod store;
pub mod traffic;

#[cfg(test)]
mod test;

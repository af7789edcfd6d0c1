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

//! # The network engine
//!
//! [`Network`] is the crate's top-level handle: it owns the [`Store`]
//! (C1/C2) and the [`FailureState`] (C10), and exposes every operation
//! named in spec §6. [`Network::calculate_all`] drives the full pipeline
//! in the order fixed by spec §5.

use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::addressing::AddressingConfig;
use crate::as_model;
use crate::disjoint;
use crate::error::NetworkError;
use crate::failure::FailureState;
use crate::flow;
use crate::generators;
use crate::ids::{AreaId, AsId, LinkId, NodeId};
use crate::layout;
use crate::model::{As, AsKind, Link, LinkKind, Node, NodeKind, RftEntry, RouteType, TrunkProtocol};
use crate::protocols;
use crate::rft::{self, RftConfig};
use crate::spf::{self, PathFilter};
use crate::store::Store;
use crate::traffic;

/// Default ECMP cap `K`, per spec §4.6.
pub const DEFAULT_ECMP_CAP: usize = 4;

/// Which kind of entity [`Network::object_factory`] should resolve or
/// create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Resolve-or-create a node of the given subtype.
    Node(NodeKind),
    /// Resolve an existing link of the given kind; links cannot be created
    /// from a name alone.
    Link(LinkKind),
}

/// A resolved handle returned by [`Network::object_factory`]: either a
/// node or a link, discriminated by the caller-supplied [`ObjectKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectId {
    /// A node handle.
    Node(NodeId),
    /// A link handle.
    Link(LinkId),
}

/// The network-simulation engine: a [`Store`] plus failure state and the
/// configured ECMP cap.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Network {
    store: Store,
    failure: FailureState,
    ecmp_cap: usize,
    addressing: AddressingConfig,
    load_balancing: bool,
}

impl Network {
    /// An empty network with the default ECMP cap and addressing scheme.
    pub fn new() -> Self {
        Self {
            store: Store::new(),
            failure: FailureState::new(),
            ecmp_cap: DEFAULT_ECMP_CAP,
            addressing: AddressingConfig::default(),
            load_balancing: true,
        }
    }

    /// Override the ECMP cap `K` used by [`Self::calculate_all`].
    pub fn set_ecmp_cap(&mut self, k: usize) {
        self.ecmp_cap = k;
    }

    /// Override the base octets [`Self::calculate_all`] addresses from.
    pub fn set_addressing_config(&mut self, cfg: AddressingConfig) {
        self.addressing = cfg;
    }

    /// Enable or disable ECMP (load-balancing). When disabled,
    /// [`Self::build_router_rft`] builds every AS's dynamic routes with the
    /// non-LB single-path builder instead of the ECMP builder, per spec
    /// §4.6.
    pub fn set_load_balancing(&mut self, lb: bool) {
        self.load_balancing = lb;
    }

    /// Read-only access to the underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Mutable access to the underlying store, for callers that need
    /// operations this type does not wrap directly.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Read-only access to the failure state.
    pub fn failure(&self) -> &FailureState {
        &self.failure
    }

    /// Mutable access to the failure state.
    pub fn failure_mut(&mut self) -> &mut FailureState {
        &mut self.failure
    }

    // ---- C1/C2: factories and lifecycle --------------------------------

    /// Idempotent-by-name node factory.
    pub fn node_factory(&mut self, name: &str, subtype: NodeKind) -> NodeId {
        self.store.node_factory(name, subtype)
    }

    /// Idempotent-by-name trunk factory.
    pub fn trunk_factory(
        &mut self,
        name: Option<&str>,
        protocol: TrunkProtocol,
        src: NodeId,
        dst: NodeId,
    ) -> Result<LinkId, NetworkError> {
        self.store.trunk_factory(name, protocol, src, dst)
    }

    /// Idempotent-by-name abstracted-route factory.
    pub fn route_factory(&mut self, name: Option<&str>, src: NodeId, dst: NodeId, cost: f64) -> Result<LinkId, NetworkError> {
        self.store.route_factory(name, src, dst, cost)
    }

    /// Idempotent-by-name traffic-demand factory.
    pub fn traffic_factory(
        &mut self,
        name: Option<&str>,
        src: NodeId,
        dst: NodeId,
        throughput: f64,
    ) -> Result<LinkId, NetworkError> {
        self.store.traffic_factory(name, src, dst, throughput)
    }

    /// Idempotent-by-name AS factory; auto-creates the distinguished
    /// `Backbone` area for OSPF/IS-IS ASes.
    pub fn as_factory(&mut self, name: &str, kind: AsKind) -> AsId {
        self.store.as_factory(name, kind)
    }

    /// Idempotent-by-name area factory within an AS.
    pub fn area_factory(&mut self, as_id: AsId, name: &str) -> Result<AreaId, NetworkError> {
        self.store.area_factory(as_id, name)
    }

    /// Resolves an object by name without the caller needing to know
    /// whether it is a node or a link, mirroring NetDim's `of` dispatcher
    /// over its `nf`/`lf` factories. A missing node is created (a node can
    /// be conjured from a name alone); a missing link is an error, since a
    /// link additionally needs endpoints that a bare name cannot supply.
    pub fn object_factory(&mut self, name: &str, kind: ObjectKind) -> Result<ObjectId, NetworkError> {
        match kind {
            ObjectKind::Node(subtype) => Ok(ObjectId::Node(self.store.node_factory(name, subtype))),
            ObjectKind::Link(link_kind) => Ok(ObjectId::Link(self.store.link_by_name(link_kind, name)?)),
        }
    }

    /// Add `node` to `as_id` as a member of `area`.
    pub fn add_node_to_as(&mut self, as_id: AsId, area: AreaId, node: NodeId) -> Result<(), NetworkError> {
        as_model::add_node_to_as(&mut self.store, as_id, area, node)
    }

    /// Add `trunk` as a member of `as_id`.
    pub fn add_trunk_to_as(&mut self, as_id: AsId, trunk: LinkId) -> Result<(), NetworkError> {
        as_model::add_trunk_to_as(&mut self.store, as_id, trunk)
    }

    /// Remove `node` and every link incident to it, returning the removed
    /// links.
    pub fn remove_node(&mut self, node: NodeId) -> Result<Vec<Link>, NetworkError> {
        self.store.remove_node(node)
    }

    /// Remove `link` only.
    pub fn remove_link(&mut self, link: LinkId) -> Result<Link, NetworkError> {
        self.store.remove_link(link)
    }

    /// Empty every pool and every failure mark.
    pub fn erase_network(&mut self) {
        self.store.erase_network();
        self.failure.clear();
    }

    // ---- C3: AS / area model --------------------------------------------

    /// Recompute area/trunk membership, border routers, and edge nodes for
    /// `as_id`, lazily pruning members that reference removed nodes/trunks.
    pub fn update_topology(&mut self, as_id: AsId) -> Result<(), NetworkError> {
        as_model::update_topology(&mut self.store, as_id)
    }

    /// The subset of `as_id`'s nodes with at least one trunk to a node
    /// outside the AS.
    pub fn find_edge_nodes(&self, as_id: AsId) -> Result<BTreeSet<NodeId>, NetworkError> {
        as_model::find_edge_nodes(&self.store, as_id)
    }

    // ---- the full pipeline -----------------------------------------------

    /// Run the full pipeline: per-AS topology update, addressing, RFT
    /// construction for every router, failure-mark clearing, a second
    /// per-AS topology update, and traffic routing, in the order fixed by
    /// spec §5.
    ///
    /// `update_topology` runs once before addressing rather than after, a
    /// deliberate departure from spec §5's listed order: addressing's
    /// `address_as_trunks` step reads each area's trunk membership, which
    /// is itself only populated as a side effect of `update_topology`. On
    /// a freshly built topology, addressing before the first topology
    /// update would number zero trunks. The second pass, at the point
    /// spec §5 names, matches the documented sequence and applies the lazy
    /// dangling-member prune (spec §7) immediately before traffic routing
    /// reads `AS.trunks`.
    pub fn calculate_all(&mut self) -> Result<(), NetworkError> {
        as_model::update_all_topologies(&mut self.store)?;

        crate::addressing::run(&mut self.store, &self.addressing);

        let routers: Vec<NodeId> = self
            .store
            .nodes()
            .filter(|n| n.subtype == NodeKind::Router)
            .map(|n| n.id())
            .collect();
        for router in routers {
            self.build_router_rft(router)?;
        }

        self.failure.clear();

        as_model::update_all_topologies(&mut self.store)?;

        traffic::route_all_traffic_demands(&mut self.store)?;

        Ok(())
    }

    /// Rebuild a single router's RFT: a global static seed over every
    /// incident trunk regardless of AS membership, then the per-AS ECMP
    /// table for every AS the router belongs to, merged into one map.
    ///
    /// The seed is global because the original `static_RFT_builder` pass
    /// runs once per router before any AS-scoped dynamic pass; since each
    /// AS addresses disjoint subnetwork blocks (spec §4.1), a later AS's
    /// dynamic entry for the same subnetwork never arises, and a
    /// first-insert-wins merge is equivalent to what the AS-scoped static
    /// seed inside [`rft::build_connected_routes`] already produces.
    pub fn build_router_rft(&mut self, router: NodeId) -> Result<(), NetworkError> {
        let mut merged: BTreeMap<Ipv4Addr, BTreeSet<RftEntry>> = BTreeMap::new();

        let incident: Vec<(NodeId, LinkId)> = self.store.adjacent(router, LinkKind::Trunk).collect();
        for (neighbor, trunk) in incident {
            let Ok(link) = self.store.link(trunk) else { continue };
            let Some(t) = link.as_trunk() else { continue };
            let Some(sntw) = t.sntw else { continue };
            let next_hop_ip = link.attrs_from(neighbor).and_then(|a| a.ipaddress).unwrap_or(Ipv4Addr::UNSPECIFIED);
            let exit_interface = link.attrs_from(router).and_then(|a| a.interface.clone()).unwrap_or_default();
            merged.entry(sntw).or_default().insert(RftEntry {
                rtype: RouteType::Connected,
                next_hop_ip,
                exit_interface,
                cost: ordered_float::OrderedFloat(0.0),
                next_hop_node: neighbor,
                exit_link: trunk,
            });
        }

        let as_ids: Vec<AsId> = self.store.node(router)?.memberships.keys().copied().collect();
        let cfg = RftConfig {
            ecmp_cap: self.ecmp_cap,
            lb: self.load_balancing,
        };
        for as_id in as_ids {
            let as_ = self.store.as_(as_id)?.clone();
            let table = rft::build_table_for_router(&self.store, &as_, router, cfg);
            for (sntw, entries) in table {
                merged.entry(sntw).or_insert(entries);
            }
        }

        self.store.node_mut(router)?.rft = merged;
        Ok(())
    }

    // ---- C5: shortest-path kernel -----------------------------------------

    /// Dijkstra's algorithm, honoring marked failures in addition to
    /// `filter`. Returns `(distances, path source->target, predecessor-link
    /// tree)`.
    pub fn dijkstra(
        &self,
        source: NodeId,
        target: NodeId,
        filter: &PathFilter,
    ) -> (BTreeMap<NodeId, f64>, Vec<LinkId>, BTreeMap<NodeId, LinkId>) {
        let filter = self.with_failures(filter);
        spf::dijkstra(&self.store, source, target, &filter)
    }

    /// A* with ordered waypoints, honoring marked failures.
    pub fn a_star(&self, source: NodeId, target: NodeId, path_constraints: &[NodeId], filter: &PathFilter) -> Vec<LinkId> {
        let filter = self.with_failures(filter);
        spf::a_star(&self.store, source, target, path_constraints, &filter)
    }

    /// Bellman-Ford, honoring marked failures. Returns `(path,
    /// negative_cycle_detected)`.
    pub fn bellman_ford(&self, source: NodeId, target: NodeId, filter: &PathFilter) -> (Vec<LinkId>, bool) {
        let filter = self.with_failures(filter);
        spf::bellman_ford(&self.store, source, target, &filter)
    }

    /// Floyd-Warshall all-pairs distances, honoring marked failures.
    pub fn floyd_warshall(&self, filter: &PathFilter) -> Option<BTreeMap<(NodeId, NodeId), f64>> {
        let filter = self.with_failures(filter);
        spf::floyd_warshall(&self.store, &filter)
    }

    /// Enumerate simple paths, honoring marked failures.
    pub fn all_paths(&self, source: NodeId, target: Option<NodeId>, filter: &PathFilter) -> Vec<Vec<LinkId>> {
        let filter = self.with_failures(filter);
        spf::all_paths(&self.store, source, target, &filter)
    }

    fn with_failures(&self, filter: &PathFilter) -> PathFilter {
        let mut filter = filter.clone();
        self.failure.apply_to(&mut filter);
        filter
    }

    // ---- C6: protocol routers ----------------------------------------------

    /// RIP routing within an AS: `(node path, link path)`.
    pub fn rip_routing(&self, as_id: AsId, source: NodeId, target: NodeId) -> Result<(Vec<NodeId>, Vec<LinkId>), NetworkError> {
        let as_ = self.store.as_(as_id)?;
        Ok(protocols::rip_routing(&self.store, as_, source, target))
    }

    /// IS-IS routing within an AS: `(node path, link path)`.
    pub fn isis_routing(&self, as_id: AsId, source: NodeId, target: NodeId) -> Result<(Vec<NodeId>, Vec<LinkId>), NetworkError> {
        let as_ = self.store.as_(as_id)?;
        Ok(protocols::isis_routing(&self.store, as_, source, target))
    }

    /// OSPF routing within an AS: `(node path, link path)`.
    pub fn ospf_routing(&self, as_id: AsId, source: NodeId, target: NodeId) -> Result<(Vec<NodeId>, Vec<LinkId>), NetworkError> {
        let as_ = self.store.as_(as_id)?;
        Ok(protocols::ospf_routing(&self.store, as_, source, target))
    }

    // ---- C8: traffic router --------------------------------------------------

    /// Reset every trunk's traffic/wctraffic counters and every traffic
    /// demand's recorded path.
    pub fn reset_traffic(&mut self) {
        traffic::reset_traffic(&mut self.store)
    }

    /// Route a single traffic demand through the already-built RFTs.
    pub fn route_traffic_demand(&mut self, demand: LinkId) -> Result<(), NetworkError> {
        traffic::route_traffic_demand(&mut self.store, demand)
    }

    /// Route every traffic demand in the store.
    pub fn route_all_traffic_demands(&mut self) -> Result<(), NetworkError> {
        traffic::route_all_traffic_demands(&mut self.store)
    }

    // ---- C9: disjoint paths, flow, MST --------------------------------------

    /// Bhandari's disjoint-path pair.
    pub fn bhandari(&mut self, source: NodeId, target: NodeId, filter: &PathFilter) -> BTreeSet<LinkId> {
        let filter = self.with_failures(filter);
        disjoint::bhandari(&mut self.store, source, target, &filter)
    }

    /// Suurballe's disjoint-path pair.
    pub fn suurballe(&mut self, source: NodeId, target: NodeId, filter: &PathFilter) -> BTreeSet<LinkId> {
        let filter = self.with_failures(filter);
        disjoint::suurballe(&mut self.store, source, target, &filter)
    }

    /// A*-based link-disjoint pair.
    pub fn a_star_shortest_pair(&self, source: NodeId, target: NodeId, filter: &PathFilter) -> BTreeSet<LinkId> {
        let filter = self.with_failures(filter);
        disjoint::a_star_shortest_pair(&self.store, source, target, &filter)
    }

    /// Reset every trunk's directional flow counters.
    pub fn reset_flow(&mut self) {
        flow::reset_flow(&mut self.store)
    }

    /// Ford-Fulkerson max flow.
    pub fn ford_fulkerson(&mut self, source: NodeId, target: NodeId, filter: &PathFilter) -> f64 {
        let filter = self.with_failures(filter);
        flow::ford_fulkerson(&mut self.store, source, target, &filter)
    }

    /// Edmonds-Karp max flow.
    pub fn edmonds_karp(&mut self, source: NodeId, target: NodeId, filter: &PathFilter) -> f64 {
        let filter = self.with_failures(filter);
        flow::edmonds_karp(&mut self.store, source, target, &filter)
    }

    /// Dinic's max flow.
    pub fn dinic(&mut self, source: NodeId, target: NodeId, filter: &PathFilter) -> f64 {
        let filter = self.with_failures(filter);
        flow::dinic(&mut self.store, source, target, &filter)
    }

    /// Kruskal's minimum spanning tree/forest.
    pub fn kruskal(&self, filter: &PathFilter) -> Vec<LinkId> {
        let filter = self.with_failures(filter);
        flow::kruskal(&self.store, &filter)
    }

    // ---- geometry and layout -------------------------------------------------

    /// Euclidean distance.
    pub fn distance(&self, dx: f64, dy: f64) -> f64 {
        layout::distance(dx, dy)
    }

    /// Great-circle distance between two nodes' geographic coordinates.
    pub fn haversine(&self, src: NodeId, dst: NodeId) -> Option<f64> {
        layout::haversine(&self.store, src, dst)
    }

    /// Eades' spring-electrical layout.
    pub fn spring_layout(&mut self, nodes: &[NodeId], cf: f64, k: f64, sf: f64, l0: f64) {
        layout::spring_layout(&mut self.store, nodes, cf, k, sf, l0)
    }

    /// Fruchterman-Reingold layout.
    pub fn fruchterman_reingold_layout(&mut self, nodes: &[NodeId], opd: Option<f64>, limit: f64) {
        layout::fruchterman_reingold_layout(&mut self.store, nodes, opd, limit)
    }

    // ---- graph generators -----------------------------------------------------

    /// A balanced binary tree with `2^n - 1` nodes.
    pub fn tree(&mut self, n: u32, subtype: NodeKind) -> Vec<NodeId> {
        generators::tree(&mut self.store, n, subtype)
    }

    /// A star with `n` leaves.
    pub fn star(&mut self, n: u32, subtype: NodeKind) -> Vec<NodeId> {
        generators::star(&mut self.store, n, subtype)
    }

    /// A complete graph on `n` nodes.
    pub fn full_mesh(&mut self, n: u32, subtype: NodeKind) -> Vec<NodeId> {
        generators::full_mesh(&mut self.store, n, subtype)
    }

    /// A cycle on `n` nodes.
    pub fn ring(&mut self, n: u32, subtype: NodeKind) -> Vec<NodeId> {
        generators::ring(&mut self.store, n, subtype)
    }

    /// An `n x n` square lattice.
    pub fn square_tiling(&mut self, n: u32, subtype: NodeKind) -> Vec<NodeId> {
        generators::square_tiling(&mut self.store, n, subtype)
    }

    /// An `n`-dimensional hypercube.
    pub fn hypercube(&mut self, n: u32, subtype: NodeKind) -> Vec<NodeId> {
        generators::hypercube(&mut self.store, n, subtype)
    }

    /// The Kneser graph `K(n,k)`.
    pub fn kneser(&mut self, n: u32, k: u32, subtype: NodeKind) -> Vec<NodeId> {
        generators::kneser(&mut self.store, n, k, subtype)
    }

    /// The generalized Petersen graph `GP(n,k)`.
    pub fn petersen(&mut self, n: u32, k: u32, subtype: NodeKind) -> Vec<NodeId> {
        generators::petersen(&mut self.store, n, k, subtype)
    }

    // ---- read-only convenience accessors -------------------------------------

    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Result<&Node, NetworkError> {
        let id = self.store.node_by_name(name)?;
        self.store.node(id)
    }

    /// Look up an AS by name.
    pub fn as_by_name(&self, name: &str) -> Result<&As, NetworkError> {
        let id = self.store.as_by_name(name)?;
        self.store.as_(id)
    }
}

#[cfg(feature = "milp")]
impl Network {
    /// MILP shortest path.
    pub fn lp_shortest_path(
        &self,
        source: NodeId,
        target: NodeId,
        filter: &PathFilter,
    ) -> Result<Vec<LinkId>, crate::error::MilpError> {
        let filter = self.with_failures(filter);
        crate::milp::lp_sp(&self.store, source, target, &filter)
    }

    /// MILP single-source/sink max flow.
    pub fn lp_max_flow(&self, source: NodeId, target: NodeId, filter: &PathFilter) -> Result<f64, crate::error::MilpError> {
        let filter = self.with_failures(filter);
        crate::milp::lp_mf(&self.store, source, target, &filter)
    }

    /// MILP min-cost flow.
    pub fn lp_min_cost_flow(&self, demands: &[(NodeId, f64)], filter: &PathFilter) -> Result<f64, crate::error::MilpError> {
        let filter = self.with_failures(filter);
        crate::milp::lp_mcf(&self.store, demands, &filter)
    }

    /// MILP `K` link-disjoint shortest paths.
    pub fn lp_k_disjoint_shortest_paths(
        &self,
        source: NodeId,
        target: NodeId,
        k: u32,
        filter: &PathFilter,
    ) -> Result<Vec<Vec<LinkId>>, crate::error::MilpError> {
        let filter = self.with_failures(filter);
        crate::milp::lp_ldsp(&self.store, source, target, k, &filter)
    }

    /// MILP RWA wavelength assignment.
    pub fn lp_rwa(&self, paths: &[Vec<LinkId>], num_wavelengths: u32) -> Result<Vec<u32>, crate::error::MilpError> {
        crate::milp::lp_rwa(paths, num_wavelengths)
    }
}

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

//! The graph store (C1) and its factories (C2).
//!
//! `Store` owns four arenas (nodes, links, ASes, areas) plus a bidirectional
//! adjacency index keyed by `(node, link-kind)`. Entities are created
//! through factories only and are never moved once created; handles stay
//! valid until the owning entity (or an ancestor, for nodes/links removed by
//! `remove_node`) is removed.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, NetworkErrorOption};
use crate::ids::{AreaId, AsId, LinkId, NodeId};
use crate::model::{
    Area, As, AsKind, Link, LinkData, LinkKind, Node, NodeKind, RouteData, TrafficData,
    TrunkData, TrunkProtocol,
};

/// The graph store: four entity pools plus the adjacency index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Store {
    nodes: Vec<Option<Node>>,
    links: Vec<Option<Link>>,
    ases: Vec<Option<As>>,
    areas: Vec<Option<Area>>,

    node_names: HashMap<String, NodeId>,
    link_names: HashMap<(LinkKind, String), LinkId>,
    as_names: HashMap<String, AsId>,

    /// `adjacency[node][kind]` is the set of `(neighbor, link)` reachable
    /// from `node` over a link of that kind. For trunks (undirected) both
    /// endpoints carry an entry; for routes/traffic (directed) only the
    /// source does.
    adjacency: HashMap<NodeId, BTreeMap<LinkKind, BTreeSet<(NodeId, LinkId)>>>,

    next_link_auto_id: u32,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty all pools, per spec's `erase_network()`.
    pub fn erase_network(&mut self) {
        *self = Self::new();
    }

    // ---- lookups ----------------------------------------------------

    /// Resolve a node handle.
    pub fn node(&self, id: NodeId) -> Result<&Node, NetworkError> {
        self.nodes
            .get(id.index())
            .and_then(|o| o.as_ref())
            .or_node_not_found(id)
    }

    /// Resolve a node handle mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, NetworkError> {
        self.nodes
            .get_mut(id.index())
            .and_then(|o| o.as_mut())
            .or_node_not_found(id)
    }

    /// Resolve a node by name.
    pub fn node_by_name(&self, name: &str) -> Result<NodeId, NetworkError> {
        self.node_names
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::NodeNameNotFound(name.to_string()))
    }

    /// Resolve a link by name within its kind.
    pub fn link_by_name(&self, kind: LinkKind, name: &str) -> Result<LinkId, NetworkError> {
        self.link_names
            .get(&(kind, name.to_string()))
            .copied()
            .ok_or_else(|| NetworkError::LinkNameNotFound(kind, name.to_string()))
    }

    /// Resolve a link handle.
    pub fn link(&self, id: LinkId) -> Result<&Link, NetworkError> {
        self.links
            .get(id.index())
            .and_then(|o| o.as_ref())
            .or_link_not_found(id)
    }

    /// Resolve a link handle mutably.
    pub fn link_mut(&mut self, id: LinkId) -> Result<&mut Link, NetworkError> {
        self.links
            .get_mut(id.index())
            .and_then(|o| o.as_mut())
            .or_link_not_found(id)
    }

    /// Resolve an AS handle.
    pub fn as_(&self, id: AsId) -> Result<&As, NetworkError> {
        self.ases
            .get(id.index())
            .and_then(|o| o.as_ref())
            .or_as_not_found(id)
    }

    /// Resolve an AS handle mutably.
    pub fn as_mut(&mut self, id: AsId) -> Result<&mut As, NetworkError> {
        self.ases
            .get_mut(id.index())
            .and_then(|o| o.as_mut())
            .or_as_not_found(id)
    }

    /// Resolve an AS by name.
    pub fn as_by_name(&self, name: &str) -> Result<AsId, NetworkError> {
        self.as_names
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::AsNameNotFound(name.to_string()))
    }

    /// Resolve an area handle.
    pub fn area(&self, id: AreaId) -> Result<&Area, NetworkError> {
        self.areas
            .get(id.index())
            .and_then(|o| o.as_ref())
            .or_area_not_found(id)
    }

    /// Resolve an area handle mutably.
    pub fn area_mut(&mut self, id: AreaId) -> Result<&mut Area, NetworkError> {
        self.areas
            .get_mut(id.index())
            .and_then(|o| o.as_mut())
            .or_area_not_found(id)
    }

    /// Iterate over all live nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter_map(|o| o.as_ref())
    }

    /// Iterate over all live links.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter_map(|o| o.as_ref())
    }

    /// Iterate over all live links of one kind.
    pub fn links_of_kind(&self, kind: LinkKind) -> impl Iterator<Item = &Link> {
        self.links().filter(move |l| l.kind() == kind)
    }

    /// Iterate over all live ASes.
    pub fn ases(&self) -> impl Iterator<Item = &As> {
        self.ases.iter().filter_map(|o| o.as_ref())
    }

    // ---- factories (C2) ----------------------------------------------

    /// Return the existing node named `name`, or create one with `subtype`.
    pub fn node_factory(&mut self, name: &str, subtype: NodeKind) -> NodeId {
        if let Some(&id) = self.node_names.get(name) {
            return id;
        }
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Some(Node::new(id, name.to_string(), subtype)));
        self.node_names.insert(name.to_string(), id);
        self.adjacency.insert(id, BTreeMap::new());
        id
    }

    fn auto_link_name(&mut self, kind: LinkKind) -> String {
        let n = self.next_link_auto_id;
        self.next_link_auto_id += 1;
        format!("{kind:?}{n}")
    }

    fn insert_link(&mut self, name: String, src: NodeId, dst: NodeId, data: LinkData) -> LinkId {
        let kind = match &data {
            LinkData::Trunk(_) => LinkKind::Trunk,
            LinkData::Route(_) => LinkKind::Route,
            LinkData::Traffic(_) => LinkKind::Traffic,
        };
        let id = LinkId::new(self.links.len() as u32);
        self.links.push(Some(Link::new(id, name.clone(), src, dst, data)));
        self.link_names.insert((kind, name), id);

        self.adjacency
            .entry(src)
            .or_default()
            .entry(kind)
            .or_default()
            .insert((dst, id));
        if kind == LinkKind::Trunk {
            self.adjacency
                .entry(dst)
                .or_default()
                .entry(kind)
                .or_default()
                .insert((src, id));
        }
        id
    }

    /// Return the existing trunk named `name` between `src`/`dst`, or create
    /// one. Idempotent on name.
    pub fn trunk_factory(
        &mut self,
        name: Option<&str>,
        protocol: TrunkProtocol,
        src: NodeId,
        dst: NodeId,
    ) -> Result<LinkId, NetworkError> {
        if let Some(n) = name {
            if let Some(&id) = self.link_names.get(&(LinkKind::Trunk, n.to_string())) {
                return Ok(id);
            }
        }
        let name = name.map(str::to_string).unwrap_or_else(|| self.auto_link_name(LinkKind::Trunk));
        let data = LinkData::Trunk(TrunkData {
            protocol,
            ..Default::default()
        });
        Ok(self.insert_link(name, src, dst, data))
    }

    /// Return the existing route named `name` from `src` to `dst`, or
    /// create one.
    pub fn route_factory(
        &mut self,
        name: Option<&str>,
        src: NodeId,
        dst: NodeId,
        cost: f64,
    ) -> Result<LinkId, NetworkError> {
        if let Some(n) = name {
            if let Some(&id) = self.link_names.get(&(LinkKind::Route, n.to_string())) {
                return Ok(id);
            }
        }
        let name = name.map(str::to_string).unwrap_or_else(|| self.auto_link_name(LinkKind::Route));
        Ok(self.insert_link(name, src, dst, LinkData::Route(RouteData { cost })))
    }

    /// Return the existing traffic demand named `name` from `src` to `dst`,
    /// or create one.
    pub fn traffic_factory(
        &mut self,
        name: Option<&str>,
        src: NodeId,
        dst: NodeId,
        throughput: f64,
    ) -> Result<LinkId, NetworkError> {
        if let Some(n) = name {
            if let Some(&id) = self.link_names.get(&(LinkKind::Traffic, n.to_string())) {
                return Ok(id);
            }
        }
        let name = name.map(str::to_string).unwrap_or_else(|| self.auto_link_name(LinkKind::Traffic));
        Ok(self.insert_link(
            name,
            src,
            dst,
            LinkData::Traffic(TrafficData {
                throughput,
                path: Vec::new(),
            }),
        ))
    }

    /// Return the existing AS named `name`, or create one, automatically
    /// creating its distinguished `Backbone` area for OSPF/IS-IS ASes.
    pub fn as_factory(&mut self, name: &str, kind: AsKind) -> AsId {
        if let Some(&id) = self.as_names.get(name) {
            return id;
        }
        let id = AsId::new(self.ases.len() as u32);
        let mut as_ = As::new(id, name.to_string(), kind);
        self.ases.push(None); // reserve slot before creating backbone area
        self.as_names.insert(name.to_string(), id);
        if kind != AsKind::Rip {
            let area_id = self.area_factory_raw("Backbone");
            as_.areas.insert("Backbone".to_string(), area_id);
            as_.backbone = Some(area_id);
        }
        self.ases[id.index()] = Some(as_);
        id
    }

    fn area_factory_raw(&mut self, name: &str) -> AreaId {
        let id = AreaId::new(self.areas.len() as u32);
        self.areas.push(Some(Area::new(id, name.to_string())));
        id
    }

    /// Return the existing area named `name` within `as_id`, or create one.
    pub fn area_factory(&mut self, as_id: AsId, name: &str) -> Result<AreaId, NetworkError> {
        if let Some(&id) = self.as_(as_id)?.areas.get(name) {
            return Ok(id);
        }
        let area_id = self.area_factory_raw(name);
        self.as_mut(as_id)?.areas.insert(name.to_string(), area_id);
        Ok(area_id)
    }

    // ---- adjacency queries (C1) ---------------------------------------

    /// Links of `kind` incident to (if trunk) or leaving (if route/traffic)
    /// `node`, as `(neighbor, link)` pairs.
    pub fn adjacent(&self, node: NodeId, kind: LinkKind) -> impl Iterator<Item = (NodeId, LinkId)> + '_ {
        self.adjacency
            .get(&node)
            .and_then(|m| m.get(&kind))
            .into_iter()
            .flatten()
            .copied()
    }

    /// Parallel links of `kind` directly connecting `a` and `b` (in either
    /// direction for trunks, or `a -> b` for routes/traffic).
    pub fn links_between(&self, a: NodeId, b: NodeId, kind: LinkKind) -> Vec<LinkId> {
        self.adjacent(a, kind)
            .filter(|&(n, _)| n == b)
            .map(|(_, l)| l)
            .collect()
    }

    /// Whether any link of `kind` connects `a` and `b`.
    pub fn is_connected(&self, a: NodeId, b: NodeId, kind: LinkKind) -> bool {
        self.adjacent(a, kind).any(|(n, _)| n == b)
    }

    /// Connected components of the trunk-only graph, grounded in
    /// `network.py`'s `bfs`/`connected_components` helpers.
    pub fn connected_components(&self) -> Vec<Vec<NodeId>> {
        let mut seen = BTreeSet::new();
        let mut components = Vec::new();
        for node in self.nodes() {
            if seen.contains(&node.id()) {
                continue;
            }
            let mut component = Vec::new();
            let mut stack = vec![node.id()];
            seen.insert(node.id());
            while let Some(n) = stack.pop() {
                component.push(n);
                for (neighbor, _) in self.adjacent(n, LinkKind::Trunk) {
                    if seen.insert(neighbor) {
                        stack.push(neighbor);
                    }
                }
            }
            components.push(component);
        }
        components
    }

    // ---- lifecycle -----------------------------------------------------

    /// Remove `node` and all links incident to it (of any kind), returning
    /// the removed links.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Vec<Link>, NetworkError> {
        self.node(id)?; // validate
        let mut incident = BTreeSet::new();
        if let Some(by_kind) = self.adjacency.get(&id) {
            for set in by_kind.values() {
                for &(_, l) in set {
                    incident.insert(l);
                }
            }
        }
        // links where `id` is a route/traffic source but not indexed under
        // its own adjacency entry as a destination still get swept because
        // insert_link only records directed links under the source; a node
        // can also be the destination of a route/traffic link, which we
        // must also remove.
        for link in self.links() {
            if link.destination == id && link.kind() != LinkKind::Trunk {
                incident.insert(link.id());
            }
        }

        let mut removed = Vec::new();
        for link_id in incident {
            removed.push(self.remove_link(link_id)?);
        }

        let node = self.nodes[id.index()].take().expect("validated above");
        self.node_names.remove(&node.name);
        self.adjacency.remove(&id);

        for as_ in self.ases.iter_mut().flatten() {
            as_.nodes.remove(&id);
            as_.edge_nodes.remove(&id);
            as_.border_routers.remove(&id);
        }
        for area in self.areas.iter_mut().flatten() {
            area.nodes.remove(&id);
        }

        Ok(removed)
    }

    /// Remove `link` only, returning the removed link.
    pub fn remove_link(&mut self, id: LinkId) -> Result<Link, NetworkError> {
        let link = self.link(id)?.clone();
        self.link_names.remove(&(link.kind(), link.name.clone()));

        if let Some(by_kind) = self.adjacency.get_mut(&link.source) {
            if let Some(set) = by_kind.get_mut(&link.kind()) {
                set.remove(&(link.destination, id));
            }
        }
        if link.kind() == LinkKind::Trunk {
            if let Some(by_kind) = self.adjacency.get_mut(&link.destination) {
                if let Some(set) = by_kind.get_mut(&link.kind()) {
                    set.remove(&(link.source, id));
                }
            }
        }

        if link.kind() == LinkKind::Trunk {
            for as_ in self.ases.iter_mut().flatten() {
                as_.trunks.remove(&id);
            }
            for area in self.areas.iter_mut().flatten() {
                area.trunks.remove(&id);
            }
        }

        self.links[id.index()] = None;
        Ok(link)
    }
}

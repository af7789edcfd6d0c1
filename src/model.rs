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

//! Entity types held by the [`crate::store::Store`] arenas.

use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::ids::{AreaId, AsId, LinkId, NodeId};

/// Node subtype, per spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A router: the only subtype that is assigned an RFT.
    Router,
    /// A layer-2 switch.
    Switch,
    /// An optical cross-connect.
    Oxc,
    /// An end host.
    Host,
    /// A wireless antenna.
    Antenna,
    /// An optical regenerator.
    Regenerator,
    /// An optical splitter.
    Splitter,
    /// An abstracted cloud/external network.
    Cloud,
}

/// Layout state mutated only by [`crate::layout`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutState {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// X velocity, scratch space for force-directed layout.
    pub vx: f64,
    /// Y velocity, scratch space for force-directed layout.
    pub vy: f64,
}

/// A node in the topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub(crate) id: NodeId,
    /// Unique name among nodes.
    pub name: String,
    /// Node subtype.
    pub subtype: NodeKind,
    /// Geographic coordinates (longitude, latitude), independent of layout.
    pub coords: (f64, f64),
    /// Per-AS membership: which areas of each AS this node belongs to.
    pub memberships: BTreeMap<AsId, BTreeSet<AreaId>>,
    /// Loopback address, assigned by the addressing pipeline.
    pub loopback: Option<Ipv4Addr>,
    /// Routing forwarding table, populated by the RFT builder. Only
    /// meaningful for [`NodeKind::Router`], but present on every node for
    /// uniformity (kept empty otherwise).
    pub rft: BTreeMap<Ipv4Addr, BTreeSet<RftEntry>>,
    /// Layout state, mutated only by the layout component.
    pub layout: LayoutState,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: String, subtype: NodeKind) -> Self {
        Self {
            id,
            name,
            subtype,
            coords: (0.0, 0.0),
            memberships: BTreeMap::new(),
            loopback: None,
            rft: BTreeMap::new(),
            layout: LayoutState::default(),
        }
    }

    /// The handle of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }
}

/// Link kind tag, per spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    /// A physical trunk (ethernet/WDM), logically undirected.
    Trunk,
    /// An abstracted, unidirectional routed path.
    Route,
    /// An aggregate traffic demand.
    Traffic,
}

/// Trunk physical protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrunkProtocol {
    /// Ethernet trunk.
    Ethernet,
    /// WDM optical fiber.
    Wdm,
}

/// Per-direction attributes of a trunk (spec §3: `sd`/`ds` records).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DirectionalAttrs {
    /// Routing cost in this direction.
    pub cost: f64,
    /// Link capacity in this direction (for max-flow).
    pub capacity: f64,
    /// Current flow in this direction, scratch space for max-flow algorithms.
    pub flow: f64,
    /// Aggregate traffic routed over this direction.
    pub traffic: f64,
    /// Worst-case traffic routed over this direction.
    pub wctraffic: f64,
    /// IP address of the endpoint on this side.
    pub ipaddress: Option<Ipv4Addr>,
    /// Subnet mask shared by both directions.
    pub subnetmask: Option<Ipv4Addr>,
    /// Interface name on this side (e.g. `Ethernet0/0`).
    pub interface: Option<String>,
}

/// Trunk-specific data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrunkData {
    /// Physical protocol.
    pub protocol: TrunkProtocol,
    /// Attributes from `source` to `destination`.
    pub sd: DirectionalAttrs,
    /// Attributes from `destination` to `source`.
    pub ds: DirectionalAttrs,
    /// Subnetwork id: `ipaddressS AND subnetmaskS`, computed by addressing.
    pub sntw: Option<Ipv4Addr>,
}

impl Default for TrunkData {
    fn default() -> Self {
        Self {
            protocol: TrunkProtocol::Ethernet,
            sd: DirectionalAttrs::default(),
            ds: DirectionalAttrs::default(),
            sntw: None,
        }
    }
}

/// Route-specific data: a single unidirectional abstracted path.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteData {
    /// Cost of the abstracted path.
    pub cost: f64,
}

/// Traffic-demand-specific data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrafficData {
    /// Demand volume.
    pub throughput: f64,
    /// Trunks carrying part of the demand, populated by [`crate::traffic`].
    pub path: Vec<LinkId>,
}

/// Kind-specific payload of a [`Link`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LinkData {
    /// See [`TrunkData`].
    Trunk(TrunkData),
    /// See [`RouteData`].
    Route(RouteData),
    /// See [`TrafficData`].
    Traffic(TrafficData),
}

/// A link in the topology: a trunk, a route, or a traffic demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub(crate) id: LinkId,
    /// Unique name within its kind.
    pub name: String,
    /// Source endpoint.
    pub source: NodeId,
    /// Destination endpoint.
    pub destination: NodeId,
    /// Kind-specific data.
    pub data: LinkData,
}

impl Link {
    pub(crate) fn new(id: LinkId, name: String, source: NodeId, destination: NodeId, data: LinkData) -> Self {
        Self {
            id,
            name,
            source,
            destination,
            data,
        }
    }

    /// The handle of this link.
    pub fn id(&self) -> LinkId {
        self.id
    }

    /// The kind tag of this link.
    pub fn kind(&self) -> LinkKind {
        match &self.data {
            LinkData::Trunk(_) => LinkKind::Trunk,
            LinkData::Route(_) => LinkKind::Route,
            LinkData::Traffic(_) => LinkKind::Traffic,
        }
    }

    /// Access the trunk data, if this link is a trunk.
    pub fn as_trunk(&self) -> Option<&TrunkData> {
        match &self.data {
            LinkData::Trunk(t) => Some(t),
            _ => None,
        }
    }

    /// Mutably access the trunk data, if this link is a trunk.
    pub fn as_trunk_mut(&mut self) -> Option<&mut TrunkData> {
        match &mut self.data {
            LinkData::Trunk(t) => Some(t),
            _ => None,
        }
    }

    /// Access the traffic data, if this link is a traffic demand.
    pub fn as_traffic(&self) -> Option<&TrafficData> {
        match &self.data {
            LinkData::Traffic(t) => Some(t),
            _ => None,
        }
    }

    /// Mutably access the traffic data, if this link is a traffic demand.
    pub fn as_traffic_mut(&mut self) -> Option<&mut TrafficData> {
        match &mut self.data {
            LinkData::Traffic(t) => Some(t),
            _ => None,
        }
    }

    /// Access the route data, if this link is a route.
    pub fn as_route(&self) -> Option<&RouteData> {
        match &self.data {
            LinkData::Route(r) => Some(r),
            _ => None,
        }
    }

    /// Directional attributes as seen when traversing this trunk starting
    /// at `from`. Returns `None` if `from` is not an endpoint, or the link
    /// is not a trunk.
    pub fn attrs_from(&self, from: NodeId) -> Option<&DirectionalAttrs> {
        let t = self.as_trunk()?;
        if from == self.source {
            Some(&t.sd)
        } else if from == self.destination {
            Some(&t.ds)
        } else {
            None
        }
    }

    /// Mutable directional attributes as seen when traversing this trunk
    /// starting at `from`.
    pub fn attrs_from_mut(&mut self, from: NodeId) -> Option<&mut DirectionalAttrs> {
        let source = self.source;
        let destination = self.destination;
        let t = self.as_trunk_mut()?;
        if from == source {
            Some(&mut t.sd)
        } else if from == destination {
            Some(&mut t.ds)
        } else {
            None
        }
    }

    /// The other endpoint of this link, given one of them.
    pub fn other_end(&self, from: NodeId) -> Option<NodeId> {
        if from == self.source {
            Some(self.destination)
        } else if from == self.destination {
            Some(self.source)
        } else {
            None
        }
    }

    /// Cost of traversing this link starting at `from`, respecting
    /// direction for trunks, or the single cost for routes.
    pub fn cost_from(&self, from: NodeId) -> Option<f64> {
        match &self.data {
            LinkData::Trunk(_) => self.attrs_from(from).map(|a| a.cost),
            LinkData::Route(r) if from == self.source => Some(r.cost),
            _ => None,
        }
    }
}

/// Autonomous System type, per spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AsKind {
    /// RIP: distance-vector, no areas beyond the implicit whole-AS region.
    Rip,
    /// OSPF: link-state with areas and a backbone.
    Ospf,
    /// IS-IS: link-state with L1/L2 levels.
    Isis,
}

/// An Autonomous System.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct As {
    pub(crate) id: AsId,
    /// Unique name.
    pub name: String,
    /// Routing protocol type.
    pub kind: AsKind,
    /// Member nodes.
    pub nodes: BTreeSet<NodeId>,
    /// Member trunks.
    pub trunks: BTreeSet<LinkId>,
    /// Nodes that are members but touch at least one non-member node.
    pub edge_nodes: BTreeSet<NodeId>,
    /// Nodes belonging to ≥2 areas of this AS (OSPF/IS-IS only).
    pub border_routers: BTreeSet<NodeId>,
    /// Areas by name, including the distinguished backbone.
    pub areas: BTreeMap<String, AreaId>,
    /// The distinguished backbone area (OSPF/IS-IS only).
    pub backbone: Option<AreaId>,
}

impl As {
    pub(crate) fn new(id: AsId, name: String, kind: AsKind) -> Self {
        Self {
            id,
            name,
            kind,
            nodes: BTreeSet::new(),
            trunks: BTreeSet::new(),
            edge_nodes: BTreeSet::new(),
            border_routers: BTreeSet::new(),
            areas: BTreeMap::new(),
            backbone: None,
        }
    }

    /// The handle of this AS.
    pub fn id(&self) -> AsId {
        self.id
    }
}

/// An area within an OSPF/IS-IS AS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub(crate) id: AreaId,
    /// Name, unique within the owning AS.
    pub name: String,
    /// Member nodes.
    pub nodes: BTreeSet<NodeId>,
    /// Member trunks.
    pub trunks: BTreeSet<LinkId>,
}

impl Area {
    pub(crate) fn new(id: AreaId, name: String) -> Self {
        Self {
            id,
            name,
            nodes: BTreeSet::new(),
            trunks: BTreeSet::new(),
        }
    }

    /// The handle of this area.
    pub fn id(&self) -> AreaId {
        self.id
    }
}

/// Route-type precedence, per spec §3, ordered from most to least
/// preferred (connected routes always win, static next, then the dynamic
/// protocol classes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RouteType {
    /// Directly connected.
    Connected,
    /// Statically configured.
    Static,
    /// RIP.
    Rip,
    /// OSPF intra-area.
    OspfIntra,
    /// OSPF inter-area.
    OspfInterArea,
    /// IS-IS level 1.
    IsisL1,
    /// IS-IS level 2.
    IsisL2,
}

impl std::fmt::Display for RouteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RouteType::Connected => "C",
            RouteType::Static => "S",
            RouteType::Rip => "R",
            RouteType::OspfIntra => "O",
            RouteType::OspfInterArea => "O IA",
            RouteType::IsisL1 => "i L1",
            RouteType::IsisL2 => "i L2",
        };
        write!(f, "{s}")
    }
}

/// A single forwarding entry in a router's RFT.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RftEntry {
    /// Route type (determines precedence).
    pub rtype: RouteType,
    /// Next-hop IP address, on the next hop's side of the exit link.
    pub next_hop_ip: Ipv4Addr,
    /// Exit interface name, on this router's side of the exit link.
    pub exit_interface: String,
    /// Cost of this entry.
    pub cost: OrderedFloat<f64>,
    /// Next-hop node.
    pub next_hop_node: NodeId,
    /// Exit link (trunk) used to reach the next hop.
    pub exit_link: LinkId,
}

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

//! Error types for the engine.
//!
//! Only programmer/API misuse is represented as an error here. "No path",
//! "unreachable demand", and "negative cycle" are not errors: they are
//! reported through return values, per the engine's error-handling design.

use crate::ids::{AreaId, AsId, LinkId, NodeId};
use thiserror::Error;

/// Errors raised by the graph store and the network engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// A node handle did not resolve to a live node.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),
    /// A node name did not resolve to any node.
    #[error("node name not found: {0}")]
    NodeNameNotFound(String),
    /// A link handle did not resolve to a live link.
    #[error("link not found: {0:?}")]
    LinkNotFound(LinkId),
    /// A link name did not resolve to any link of the requested kind.
    #[error("{0:?} named {1} not found")]
    LinkNameNotFound(crate::model::LinkKind, String),
    /// No link of the requested kind exists between the two nodes.
    #[error("no {2:?} link between {0:?} and {1:?}")]
    NoLinkBetween(NodeId, NodeId, crate::model::LinkKind),
    /// An AS handle did not resolve to a live AS.
    #[error("AS not found: {0:?}")]
    AsNotFound(AsId),
    /// An AS name did not resolve to any AS.
    #[error("AS name not found: {0}")]
    AsNameNotFound(String),
    /// An area handle did not resolve to a live area.
    #[error("area not found: {0:?}")]
    AreaNotFound(AreaId),
    /// An operation that only makes sense for a given link kind was called
    /// on a link of a different kind.
    #[error("link {0:?} has kind {1:?}, expected {2:?}")]
    WrongLinkKind(LinkId, crate::model::LinkKind, crate::model::LinkKind),
    /// An operation that only makes sense for a given AS type was called on
    /// an AS of a different type.
    #[error("AS {0:?} has type {1:?}, expected {2:?}")]
    WrongAsKind(AsId, crate::model::AsKind, crate::model::AsKind),
    /// The addressing pool for a given scheme is exhausted.
    #[error("address pool exhausted for {0}")]
    AddressPoolExhausted(&'static str),
}

/// Errors raised by the optional MILP formulations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MilpError {
    /// No solver backend is available or it failed to produce a result; the
    /// caller should treat this as a clean "no answer", not a crash.
    #[error("MILP solver unavailable or failed: {0}")]
    SolverUnavailable(String),
    /// The formulation is infeasible for the given topology.
    #[error("MILP formulation infeasible")]
    Infeasible,
}

/// Convenience trait to turn a lookup `Option` into a [`NetworkError`].
pub trait NetworkErrorOption<T> {
    /// Transform `None` into `Err(NetworkError::NodeNotFound)`.
    fn or_node_not_found(self, id: NodeId) -> Result<T, NetworkError>;
    /// Transform `None` into `Err(NetworkError::LinkNotFound)`.
    fn or_link_not_found(self, id: LinkId) -> Result<T, NetworkError>;
    /// Transform `None` into `Err(NetworkError::AsNotFound)`.
    fn or_as_not_found(self, id: AsId) -> Result<T, NetworkError>;
    /// Transform `None` into `Err(NetworkError::AreaNotFound)`.
    fn or_area_not_found(self, id: AreaId) -> Result<T, NetworkError>;
}

impl<T> NetworkErrorOption<T> for Option<T> {
    fn or_node_not_found(self, id: NodeId) -> Result<T, NetworkError> {
        self.ok_or(NetworkError::NodeNotFound(id))
    }

    fn or_link_not_found(self, id: LinkId) -> Result<T, NetworkError> {
        self.ok_or(NetworkError::LinkNotFound(id))
    }

    fn or_as_not_found(self, id: AsId) -> Result<T, NetworkError> {
        self.ok_or(NetworkError::AsNotFound(id))
    }

    fn or_area_not_found(self, id: AreaId) -> Result<T, NetworkError> {
        self.ok_or(NetworkError::AreaNotFound(id))
    }
}

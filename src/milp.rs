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

//! Optional MILP formulations (C9, `feature = "milp"`): shortest path, max
//! flow, min-cost flow, `K` link-disjoint shortest paths, and RWA wavelength
//! assignment, all expressed with node-flow-conservation constraints over
//! `good_lp`, per spec §4.9. Every entry point returns cleanly on solver
//! failure rather than panicking.

use std::collections::{BTreeMap, BTreeSet};

use good_lp::{constraint, variable, Expression, ProblemVariables, Solution, SolverModel, Variable};

use crate::error::MilpError;
use crate::ids::{LinkId, NodeId};
use crate::model::LinkKind;
use crate::spf::PathFilter;
use crate::store::Store;

/// One directed arc per trunk direction: `(link, from)` pairs with a bound
/// and a per-unit cost, shared by every formulation below.
struct ArcSet {
    vars: BTreeMap<(LinkId, NodeId), Variable>,
    out_of: BTreeMap<NodeId, Vec<(LinkId, NodeId, Variable)>>,
    into: BTreeMap<NodeId, Vec<(LinkId, NodeId, Variable)>>,
}

fn build_arcs(
    problem: &mut ProblemVariables,
    store: &Store,
    filter: &PathFilter,
    bound: impl Fn(&crate::model::Link, NodeId) -> f64,
) -> ArcSet {
    let mut vars = BTreeMap::new();
    let mut out_of: BTreeMap<NodeId, Vec<(LinkId, NodeId, Variable)>> = BTreeMap::new();
    let mut into: BTreeMap<NodeId, Vec<(LinkId, NodeId, Variable)>> = BTreeMap::new();

    for link in store.links_of_kind(LinkKind::Trunk) {
        if !filter.trunk_ok(link.id()) || !filter.node_ok(link.source) || !filter.node_ok(link.destination) {
            continue;
        }
        for from in [link.source, link.destination] {
            let Some(to) = link.other_end(from) else { continue };
            let ub = bound(link, from);
            if ub <= 0.0 {
                continue;
            }
            let v = problem.add(variable().min(0.0).max(ub));
            vars.insert((link.id(), from), v);
            out_of.entry(from).or_default().push((link.id(), to, v));
            into.entry(to).or_default().push((link.id(), from, v));
        }
    }

    ArcSet { vars, out_of, into }
}

impl ArcSet {
    fn out_expr(&self, node: NodeId) -> Expression {
        self.out_of
            .get(&node)
            .into_iter()
            .flatten()
            .map(|&(_, _, v)| Expression::from(v))
            .sum()
    }

    fn in_expr(&self, node: NodeId) -> Expression {
        self.into
            .get(&node)
            .into_iter()
            .flatten()
            .map(|&(_, _, v)| Expression::from(v))
            .sum()
    }
}

fn solve_error(e: impl std::fmt::Display) -> MilpError {
    MilpError::SolverUnavailable(e.to_string())
}

/// Shortest path as a unit flow LP (totally unimodular, so the relaxation is
/// integral): minimize `Σ cost · x` subject to unit conservation at
/// `source`/`target` and zero elsewhere.
pub fn lp_sp(store: &Store, source: NodeId, target: NodeId, filter: &PathFilter) -> Result<Vec<LinkId>, MilpError> {
    let mut problem = ProblemVariables::new();
    let arcs = build_arcs(&mut problem, store, filter, |_, _| 1.0);

    let objective: Expression = arcs
        .vars
        .iter()
        .filter_map(|(&(link, from), &v)| store.link(link).ok().and_then(|l| l.cost_from(from)).map(|c| v * c))
        .sum();

    let mut model = problem.minimise(objective).using(good_lp::microlp);
    let nodes: BTreeSet<NodeId> = store.nodes().map(|n| n.id()).filter(|&n| filter.node_ok(n)).collect();
    for &node in &nodes {
        let balance = if node == source {
            1.0
        } else if node == target {
            -1.0
        } else {
            0.0
        };
        model.add_constraint(constraint!(arcs.out_expr(node) - arcs.in_expr(node) == balance));
    }

    let solution = model.solve().map_err(solve_error)?;
    let mut path = Vec::new();
    for (&(link, _from), &v) in &arcs.vars {
        if solution.value(v) > 0.5 {
            path.push(link);
        }
    }
    Ok(path)
}

/// Single-source/sink max flow LP: maximize flow leaving `source` subject to
/// per-direction capacity and conservation at every other node.
pub fn lp_mf(store: &Store, source: NodeId, target: NodeId, filter: &PathFilter) -> Result<f64, MilpError> {
    let mut problem = ProblemVariables::new();
    let arcs = build_arcs(&mut problem, store, filter, |link, from| {
        link.attrs_from(from).map(|a| a.capacity).unwrap_or(0.0)
    });

    let objective = arcs.out_expr(source) - arcs.in_expr(source);
    let mut model = problem.maximise(objective.clone()).using(good_lp::microlp);
    let nodes: BTreeSet<NodeId> = store.nodes().map(|n| n.id()).filter(|&n| filter.node_ok(n)).collect();
    for &node in &nodes {
        if node == source || node == target {
            continue;
        }
        model.add_constraint(constraint!(arcs.out_expr(node) - arcs.in_expr(node) == 0.0));
    }

    let solution = model.solve().map_err(solve_error)?;
    Ok(solution.eval(&objective))
}

/// Minimum-cost flow meeting a list of `(node, net_supply)` balance
/// requirements (positive = source, negative = sink), subject to capacity.
pub fn lp_mcf(store: &Store, demands: &[(NodeId, f64)], filter: &PathFilter) -> Result<f64, MilpError> {
    let mut problem = ProblemVariables::new();
    let arcs = build_arcs(&mut problem, store, filter, |link, from| {
        link.attrs_from(from).map(|a| a.capacity).unwrap_or(0.0)
    });

    let objective: Expression = arcs
        .vars
        .iter()
        .filter_map(|(&(link, from), &v)| store.link(link).ok().and_then(|l| l.cost_from(from)).map(|c| v * c))
        .sum();

    let mut model = problem.minimise(objective.clone()).using(good_lp::microlp);
    let supply: BTreeMap<NodeId, f64> = demands.iter().copied().collect();
    let nodes: BTreeSet<NodeId> = store.nodes().map(|n| n.id()).filter(|&n| filter.node_ok(n)).collect();
    for &node in &nodes {
        let balance = supply.get(&node).copied().unwrap_or(0.0);
        model.add_constraint(constraint!(arcs.out_expr(node) - arcs.in_expr(node) == balance));
    }

    let solution = model.solve().map_err(solve_error)?;
    Ok(solution.eval(&objective))
}

/// `K` link-disjoint shortest paths: a min-cost flow of value `K` with unit
/// per-direction capacity forces edge-disjointness; the resulting integral
/// flow is decomposed into `K` simple paths.
pub fn lp_ldsp(store: &Store, source: NodeId, target: NodeId, k: u32, filter: &PathFilter) -> Result<Vec<Vec<LinkId>>, MilpError> {
    let mut problem = ProblemVariables::new();
    let arcs = build_arcs(&mut problem, store, filter, |_, _| 1.0);

    let objective: Expression = arcs
        .vars
        .iter()
        .filter_map(|(&(link, from), &v)| store.link(link).ok().and_then(|l| l.cost_from(from)).map(|c| v * c))
        .sum();

    let mut model = problem.minimise(objective).using(good_lp::microlp);
    let nodes: BTreeSet<NodeId> = store.nodes().map(|n| n.id()).filter(|&n| filter.node_ok(n)).collect();
    for &node in &nodes {
        let balance = if node == source {
            k as f64
        } else if node == target {
            -(k as f64)
        } else {
            0.0
        };
        model.add_constraint(constraint!(arcs.out_expr(node) - arcs.in_expr(node) == balance));
    }

    let solution = model.solve().map_err(solve_error)?;
    let mut remaining: BTreeMap<NodeId, Vec<(LinkId, NodeId)>> = BTreeMap::new();
    for (&(link, from), &v) in &arcs.vars {
        let units = solution.value(v).round() as i32;
        if units <= 0 {
            continue;
        }
        let Some(to) = store.link(link).ok().and_then(|l| l.other_end(from)) else { continue };
        for _ in 0..units {
            remaining.entry(from).or_default().push((link, to));
        }
    }

    let mut paths = Vec::new();
    for _ in 0..k {
        let mut path = Vec::new();
        let mut cur = source;
        while cur != target {
            let Some(options) = remaining.get_mut(&cur) else { break };
            let Some((link, next)) = options.pop() else { break };
            path.push(link);
            cur = next;
        }
        if cur == target {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// RWA: assign one of `num_wavelengths` wavelengths to each of `paths`
/// (trunk sets already routed) such that no two paths sharing a trunk get
/// the same wavelength — a graph-coloring ILP over binary `x[p][w]`.
pub fn lp_rwa(paths: &[Vec<LinkId>], num_wavelengths: u32) -> Result<Vec<u32>, MilpError> {
    let mut problem = ProblemVariables::new();
    let x: Vec<Vec<Variable>> = paths
        .iter()
        .map(|_| (0..num_wavelengths).map(|_| problem.add(variable().binary())).collect())
        .collect();

    let objective = Expression::from(0.0);
    let mut model = problem.minimise(objective).using(good_lp::microlp);

    for row in &x {
        let sum: Expression = row.iter().copied().map(Expression::from).sum();
        model.add_constraint(constraint!(sum == 1));
    }

    for (i, pi) in paths.iter().enumerate() {
        let used_i: BTreeSet<LinkId> = pi.iter().copied().collect();
        for (j, pj) in paths.iter().enumerate().skip(i + 1) {
            if used_i.iter().any(|t| pj.contains(t)) {
                for w in 0..num_wavelengths as usize {
                    model.add_constraint(constraint!(x[i][w] + x[j][w] <= 1));
                }
            }
        }
    }

    let solution = model.solve().map_err(|_| MilpError::Infeasible)?;
    Ok(x.iter()
        .map(|row| {
            row.iter()
                .position(|&v| solution.value(v) > 0.5)
                .map(|w| w as u32)
                .unwrap_or(0)
        })
        .collect())
}

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

//! Force-directed layout (spec §6): Eades' `spring_layout` and
//! Fruchterman-Reingold. Both mutate node `(x,y,vx,vy)` in place and leave
//! every other field untouched.

use crate::ids::NodeId;
use crate::model::LinkKind;
use crate::store::Store;

/// Euclidean distance, per spec §6's `distance(dx,dy)`.
pub fn distance(dx: f64, dy: f64) -> f64 {
    (dx * dx + dy * dy).sqrt()
}

/// Great-circle distance between two nodes' `coords` (longitude, latitude
/// in degrees), per spec §6's `haversine(src,dst)`.
pub fn haversine(store: &Store, src: NodeId, dst: NodeId) -> Option<f64> {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let (lon_s, lat_s) = store.node(src).ok()?.coords;
    let (lon_d, lat_d) = store.node(dst).ok()?.coords;
    let (lon_s, lat_s, lon_d, lat_d) = (
        lon_s.to_radians(),
        lat_s.to_radians(),
        lon_d.to_radians(),
        lat_d.to_radians(),
    );
    let delta_lon = lon_d - lon_s;
    let delta_lat = lat_d - lat_s;
    let a = (delta_lat / 2.0).sin().powi(2) + lat_s.cos() * lat_d.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    Some(EARTH_RADIUS_KM * c)
}

fn coulomb_force(dx: f64, dy: f64, dist: f64, cf: f64) -> (f64, f64) {
    if dist == 0.0 {
        return (0.0, 0.0);
    }
    let c = cf / dist.powi(3);
    (-c * dx, -c * dy)
}

fn hooke_force(dx: f64, dy: f64, dist: f64, l0: f64, k: f64) -> (f64, f64) {
    if dist == 0.0 {
        return (0.0, 0.0);
    }
    let c = k * (dist - l0) / dist;
    (c * dx, c * dy)
}

/// Eades' spring-electrical layout: every pair of nodes repels by an
/// inverse-square Coulomb force; trunk-connected pairs additionally attract
/// by a Hooke's-law spring toward rest length `l0`. `cf` scales the
/// repulsion, `k` the spring stiffness, `sf` the integration step.
pub fn spring_layout(store: &mut Store, nodes: &[NodeId], cf: f64, k: f64, sf: f64, l0: f64) {
    let positions: Vec<(NodeId, f64, f64)> = nodes
        .iter()
        .filter_map(|&n| store.node(n).ok().map(|node| (n, node.layout.x, node.layout.y)))
        .collect();

    let mut velocities = Vec::with_capacity(nodes.len());
    for &(node_a, xa, ya) in &positions {
        let mut fx = 0.0;
        let mut fy = 0.0;
        for &(node_b, xb, yb) in &positions {
            if node_a == node_b {
                continue;
            }
            let (dx, dy) = (xb - xa, yb - ya);
            let dist = distance(dx, dy);
            let (hx, hy) = if store.is_connected(node_a, node_b, LinkKind::Trunk) {
                hooke_force(dx, dy, dist, l0, k)
            } else {
                (0.0, 0.0)
            };
            let (cx, cy) = coulomb_force(dx, dy, dist, cf);
            fx += hx + cx;
            fy += hy + cy;
        }
        velocities.push((node_a, fx, fy));
    }

    for (node, fx, fy) in velocities {
        if let Ok(n) = store.node_mut(node) {
            n.layout.vx = 0.5 * n.layout.vx + 0.2 * fx;
            n.layout.vy = 0.5 * n.layout.vy + 0.2 * fy;
            n.layout.x += (n.layout.vx * sf).round();
            n.layout.y += (n.layout.vy * sf).round();
        }
    }
}

/// Fruchterman-Reingold layout: every pair repels proportionally to
/// `opd^2/dist^2`, every trunk pulls its endpoints together proportionally
/// to `dist/opd`. `opd` is the optimal pairwise distance; when `None`, it is
/// derived from the canvas area and the trunk count the way the original
/// heuristic does (`sqrt(1200*700/num_trunks) / 3`). `limit` bounds the
/// per-step displacement if positive.
pub fn fruchterman_reingold_layout(store: &mut Store, nodes: &[NodeId], opd: Option<f64>, limit: f64) {
    let num_trunks = store.links_of_kind(LinkKind::Trunk).count().max(1);
    let opd = opd.unwrap_or_else(|| (1200.0 * 700.0 / num_trunks as f64).sqrt()) / 3.0;

    let positions: Vec<(NodeId, f64, f64)> = nodes
        .iter()
        .filter_map(|&n| store.node(n).ok().map(|node| (n, node.layout.x, node.layout.y)))
        .collect();

    let mut deltas: Vec<(NodeId, f64, f64)> = Vec::with_capacity(positions.len());
    for &(node_a, xa, ya) in &positions {
        let mut vx = 0.0;
        let mut vy = 0.0;
        for &(node_b, xb, yb) in &positions {
            if node_a == node_b {
                continue;
            }
            let (dx, dy) = (xa - xb, ya - yb);
            let dist = distance(dx, dy);
            if dist > 0.0 {
                vx += dx * opd * opd / (dist * dist);
                vy += dy * opd * opd / (dist * dist);
            }
        }
        deltas.push((node_a, vx, vy));
    }

    for &(node, vx, vy) in &deltas {
        if let Ok(n) = store.node_mut(node) {
            n.layout.vx = vx;
            n.layout.vy = vy;
        }
    }

    let trunk_ids: Vec<_> = store.links_of_kind(LinkKind::Trunk).map(|l| l.id()).collect();
    for trunk in trunk_ids {
        let Ok(link) = store.link(trunk) else { continue };
        let (src, dst) = (link.source, link.destination);
        let (Some(sp), Some(dp)) = (
            store.node(src).ok().map(|n| (n.layout.x, n.layout.y)),
            store.node(dst).ok().map(|n| (n.layout.x, n.layout.y)),
        ) else {
            continue;
        };
        let (dx, dy) = (sp.0 - dp.0, sp.1 - dp.1);
        let dist = distance(dx, dy);
        if dist == 0.0 {
            continue;
        }
        if let Ok(n) = store.node_mut(src) {
            n.layout.vx -= dist * dx / opd;
            n.layout.vy -= dist * dy / opd;
        }
        if let Ok(n) = store.node_mut(dst) {
            n.layout.vx += dist * dx / opd;
            n.layout.vy += dist * dy / opd;
        }
    }

    for &(node, ..) in &positions {
        if let Ok(n) = store.node_mut(node) {
            let (mut vx, mut vy) = (n.layout.vx, n.layout.vy);
            if limit > 0.0 {
                let speed = distance(vx, vy);
                if speed > limit {
                    vx *= limit / speed;
                    vy *= limit / speed;
                }
            }
            n.layout.x += vx;
            n.layout.y += vy;
        }
    }
}

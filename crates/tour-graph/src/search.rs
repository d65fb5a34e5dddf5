//! Shortest-path search trait and default A* implementation.
//!
//! # Pluggability
//!
//! The planner calls routing via the [`PathSearch`] trait, so applications
//! can swap in custom implementations (contraction hierarchies, bidirectional
//! search) without touching the planning core.  The default [`AStarSearch`]
//! is sufficient for via-point legs.
//!
//! # Cost model
//!
//! The search takes the cost model as `&dyn CostFunction` and re-evaluates
//! every arc cost through it on each call — no costs are cached between
//! calls, so decorator state updated between legs (visited-edge penalties)
//! takes effect on the next search.
//!
//! [`CostFunction::min_cost`] over the remaining straight-line distance is
//! the A* heuristic.  Implementations keep it an admissible lower bound, so
//! the search stays exact; a model returning `0.0` degrades this to plain
//! Dijkstra.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tour_core::{ArcId, EdgeId, NodeId};

use crate::cost::CostFunction;
use crate::network::RoadNetwork;
use crate::{GraphError, GraphResult};

// ── Path ──────────────────────────────────────────────────────────────────────

/// The result of a search: an ordered list of traversed segments plus
/// aggregate distance and cost.  Immutable once returned.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    /// Node the search started from.
    pub from: NodeId,
    /// Node the search ended at.
    pub to: NodeId,
    /// Segments traversed in order, from `from` to `to`.
    pub edges: Vec<EdgeId>,
    /// Physical length of the path in metres (independent of the cost model).
    pub distance_m: f64,
    /// Accumulated cost under the cost model the search ran with.
    pub cost: f64,
}

impl Path {
    /// `true` if the source and destination were the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

// ── PathSearch trait ──────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one engine instance can serve
/// concurrent planning requests.
pub trait PathSearch: Send + Sync {
    /// Compute the cheapest path from `from` to `to` under `cost`.
    ///
    /// `from == to` is answered with a trivial (empty) path rather than an
    /// error; disconnected endpoints return [`GraphError::NoPath`].
    fn search(
        &self,
        network: &RoadNetwork,
        from: NodeId,
        to: NodeId,
        cost: &dyn CostFunction,
    ) -> GraphResult<Path>;
}

// ── AStarSearch ───────────────────────────────────────────────────────────────

/// A* over the CSR road graph with `min_cost` as the heuristic.
pub struct AStarSearch;

impl PathSearch for AStarSearch {
    fn search(
        &self,
        network: &RoadNetwork,
        from: NodeId,
        to: NodeId,
        cost: &dyn CostFunction,
    ) -> GraphResult<Path> {
        astar(network, from, to, cost)
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

/// `f64` cost with a total order so it can live in the binary heap.
#[derive(Copy, Clone, PartialEq)]
struct HeapCost(f64);

impl Eq for HeapCost {}

impl Ord for HeapCost {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for HeapCost {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

fn astar(
    network: &RoadNetwork,
    from: NodeId,
    to: NodeId,
    cost: &dyn CostFunction,
) -> GraphResult<Path> {
    let n = network.node_count();
    if from.index() >= n {
        return Err(GraphError::NodeNotFound(from));
    }
    if to.index() >= n {
        return Err(GraphError::NodeNotFound(to));
    }
    if from == to {
        return Ok(Path {
            from,
            to,
            edges: vec![],
            distance_m: 0.0,
            cost: 0.0,
        });
    }

    let goal_pos = network.node_pos[to.index()];

    // g[v] = best known cost to reach v.
    let mut g = vec![f64::INFINITY; n];
    // prev_arc[v] = arc that reached v; ArcId::INVALID for unreached nodes.
    let mut prev_arc = vec![ArcId::INVALID; n];

    g[from.index()] = 0.0;

    // Min-heap on (f, g, node). Reverse makes BinaryHeap (max) behave as
    // min-heap; the NodeId key makes tie-breaking deterministic.
    let mut heap: BinaryHeap<Reverse<(HeapCost, HeapCost, NodeId)>> = BinaryHeap::new();
    let h0 = cost.min_cost(network.node_pos[from.index()].distance_m(goal_pos));
    heap.push(Reverse((HeapCost(h0), HeapCost(0.0), from)));

    while let Some(Reverse((_, HeapCost(node_g), node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(network, &prev_arc, from, to, node_g));
        }

        // Skip stale heap entries.
        if node_g > g[node.index()] {
            continue;
        }

        // Segment the search arrived on, for turn-aware cost models.
        let via_arc = prev_arc[node.index()];
        let arrived_on = if via_arc == ArcId::INVALID {
            EdgeId::INVALID
        } else {
            network.arc_edge[via_arc.index()]
        };

        for arc in network.out_arcs(node) {
            let edge_ref = network.edge_ref(arc);
            let w = cost.edge_cost(&edge_ref, network.arc_dir[arc.index()], arrived_on);
            debug_assert!(w.is_finite() && w >= 0.0, "edge cost must be non-negative and finite");

            let neighbor = edge_ref.to;
            let new_g = node_g + w;

            if new_g < g[neighbor.index()] {
                g[neighbor.index()] = new_g;
                prev_arc[neighbor.index()] = arc;
                let h = cost.min_cost(network.node_pos[neighbor.index()].distance_m(goal_pos));
                heap.push(Reverse((HeapCost(new_g + h), HeapCost(new_g), neighbor)));
            }
        }
    }

    Err(GraphError::NoPath { from, to })
}

fn reconstruct(
    network: &RoadNetwork,
    prev_arc: &[ArcId],
    from: NodeId,
    to: NodeId,
    total_cost: f64,
) -> Path {
    let mut edges = Vec::new();
    let mut distance_m = 0.0;
    let mut cur = to;
    loop {
        let arc = prev_arc[cur.index()];
        if arc == ArcId::INVALID {
            break;
        }
        edges.push(network.arc_edge[arc.index()]);
        distance_m += network.arc_length_m[arc.index()];
        cur = network.arc_from[arc.index()];
    }
    edges.reverse();
    Path {
        from,
        to,
        edges,
        distance_m,
        cost: total_cost,
    }
}

//! Cost decorator that rates already-travelled segments worse.
//!
//! One `AvoidEdgesCost` instance is created per loop-assembly attempt and
//! shared by all of that attempt's leg searches.  After each accepted leg the
//! planner records the leg's segments; later legs then see those segments at
//! a multiple of their base cost and steer around them where an alternative
//! exists.
//!
//! The penalty is multiplicative, so it scales across cost models with
//! different units without calibration, and it is finite, so a visited
//! segment remains traversable when a sparse network offers no alternative
//! (soft avoidance, not exclusion).

use tour_core::EdgeId;
use tour_graph::{CostFunction, Direction, EdgeRef, Path};

/// Cost multiplier applied to segments already used by an earlier leg.
pub const VISITED_EDGE_PENALTY: f64 = 5.0;

#[cfg(feature = "fx-hash")]
type EdgeSet = rustc_hash::FxHashSet<EdgeId>;
#[cfg(not(feature = "fx-hash"))]
type EdgeSet = std::collections::HashSet<EdgeId>;

/// Decorator over any [`CostFunction`] penalizing visited segments.
///
/// Owns its visited-edge set exclusively; the set only ever grows for the
/// lifetime of one attempt and is discarded with the decorator when the
/// attempt is abandoned.
pub struct AvoidEdgesCost<C: CostFunction> {
    inner: C,
    penalty_factor: f64,
    visited: EdgeSet,
}

impl<C: CostFunction> AvoidEdgesCost<C> {
    /// Wrap `inner` with the default [`VISITED_EDGE_PENALTY`].
    pub fn new(inner: C) -> Self {
        Self::with_penalty(inner, VISITED_EDGE_PENALTY)
    }

    /// Wrap `inner` with a custom penalty factor (≥ 1).
    pub fn with_penalty(inner: C, penalty_factor: f64) -> Self {
        debug_assert!(penalty_factor >= 1.0);
        Self {
            inner,
            penalty_factor,
            visited: EdgeSet::default(),
        }
    }

    /// Record every segment of `path` as visited.  Re-recording a segment is
    /// a no-op, so recording the same path twice changes nothing.
    pub fn record_path(&mut self, path: &Path) {
        for &edge in &path.edges {
            self.visited.insert(edge);
        }
    }

    pub fn is_visited(&self, edge: EdgeId) -> bool {
        self.visited.contains(&edge)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

impl<C: CostFunction> CostFunction for AvoidEdgesCost<C> {
    /// Delegates unchanged: the penalty only raises individual edge costs, so
    /// the wrapped bound stays a valid lower bound for the search.
    fn min_cost(&self, distance_m: f64) -> f64 {
        self.inner.min_cost(distance_m)
    }

    fn edge_cost(&self, edge: &EdgeRef, dir: Direction, adjacent: EdgeId) -> f64 {
        let base = self.inner.edge_cost(edge, dir, adjacent);
        if self.visited.contains(&edge.edge) {
            return base * self.penalty_factor;
        }
        base
    }
}

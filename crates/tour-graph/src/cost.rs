//! Edge-cost capability consumed by the shortest-path search.
//!
//! # Decorator chains
//!
//! Cost models compose by wrapping: a decorator holds the function it wraps
//! (the "inner" function), delegates both methods unchanged by default, and
//! overrides only what it shapes.  The chain structure is immutable; only a
//! decorator's own private state may mutate between searches.  The search
//! re-evaluates costs from the instance it is handed on every call, so state
//! changes between legs take effect immediately.
//!
//! Two contracts every implementation must keep:
//!
//! - `min_cost(d)` is a valid lower bound on the cost of *any* path covering
//!   `d` metres.  A decorator that only ever raises edge costs delegates this
//!   unchanged; lowering validity breaks the search's pruning.
//! - `edge_cost` is non-negative and finite for every traversable arc.

use tour_core::{EdgeId, NodeId};

// ── Traversal context ─────────────────────────────────────────────────────────

/// Which way a road segment is being traversed relative to its canonical
/// (as-built) direction.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Forward,
    Reverse,
}

/// A view of one directed arc handed to [`CostFunction::edge_cost`].
///
/// `from`/`to` are the traversal endpoints of the arc, not the canonical
/// endpoints of the segment.
#[derive(Copy, Clone, Debug)]
pub struct EdgeRef {
    /// Undirected segment identity (the key for visited-edge tracking).
    pub edge: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub length_m: f64,
}

// ── CostFunction ──────────────────────────────────────────────────────────────

/// Pluggable per-edge cost model driving the shortest-path search.
///
/// Object-safe so a decorator chain of any depth can be passed as
/// `&dyn CostFunction`.
pub trait CostFunction {
    /// Fast admissible lower bound on the cost of covering `distance_m`
    /// metres.  Used by the search as its pruning heuristic; returning `0.0`
    /// disables pruning and degrades the search to plain Dijkstra.
    fn min_cost(&self, distance_m: f64) -> f64;

    /// Cost of traversing `edge` in direction `dir`.  `adjacent` is the
    /// segment the search arrived on (`EdgeId::INVALID` at the source node),
    /// available to turn-aware models.
    fn edge_cost(&self, edge: &EdgeRef, dir: Direction, adjacent: EdgeId) -> f64;
}

// Forwarding impls so a chain can hold its inner function by reference or
// boxed, and so callers can hand the search either.
impl<C: CostFunction + ?Sized> CostFunction for &C {
    fn min_cost(&self, distance_m: f64) -> f64 {
        (**self).min_cost(distance_m)
    }

    fn edge_cost(&self, edge: &EdgeRef, dir: Direction, adjacent: EdgeId) -> f64 {
        (**self).edge_cost(edge, dir, adjacent)
    }
}

impl<C: CostFunction + ?Sized> CostFunction for Box<C> {
    fn min_cost(&self, distance_m: f64) -> f64 {
        (**self).min_cost(distance_m)
    }

    fn edge_cost(&self, edge: &EdgeRef, dir: Direction, adjacent: EdgeId) -> f64 {
        (**self).edge_cost(edge, dir, adjacent)
    }
}

// ── DistanceCost ──────────────────────────────────────────────────────────────

/// The base cost model: cost equals physical length in metres.
///
/// Its `min_cost` is exact (the straight-line distance *is* the cheapest
/// conceivable cost over that distance), which gives the search its tightest
/// admissible heuristic.
#[derive(Copy, Clone, Debug, Default)]
pub struct DistanceCost;

impl CostFunction for DistanceCost {
    fn min_cost(&self, distance_m: f64) -> f64 {
        distance_m
    }

    fn edge_cost(&self, edge: &EdgeRef, _dir: Direction, _adjacent: EdgeId) -> f64 {
        edge.length_m
    }
}

//! The round-trip planner: assembles closed loops from via-point proposals.
//!
//! # Attempt lifecycle
//!
//! One call to [`RoundTripPlanner::plan`] runs up to `max_retries` attempts.
//! Each attempt:
//!
//! 1. **Plan** — sample a fresh tour (new random draw), project each
//!    (bearing, distance) proposal from the start position, and snap it to
//!    the nearest routable node.
//! 2. **Search legs** — route start → via → … → start strictly in order,
//!    all legs sharing one [`AvoidEdgesCost`] whose visited set accumulates
//!    as legs are accepted.  Later legs therefore pay a premium for
//!    retracing earlier ones.
//! 3. **Validate** — the assembled loop must be closed and its total
//!    distance within `tolerance × target` of the target.
//!
//! A failed leg search, an unresolvable or degenerate via point, and a
//! tolerance miss all abandon the attempt: its tour plan and visited-edge
//! set are discarded and the next attempt starts from a fresh draw.  Only
//! the aggregate outcome is observable — [`PlanError::RoundTripFailed`]
//! carries the number of attempts made.
//!
//! # Sharing
//!
//! A planner borrows its network immutably and owns its search, so one
//! planner instance can be constructed per request; nothing is shared
//! between concurrent requests.  Cancellation is signalled through a cloned
//! [`CancelFlag`] and honoured at attempt starts and leg boundaries.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tour_core::{EdgeId, GeoPoint, NodeId, TourRng};
use tour_graph::{CostFunction, Path, PathSearch, RoadNetwork};

use crate::avoid::{AvoidEdgesCost, VISITED_EDGE_PENALTY};
use crate::tour::{SinglePointTour, TourStrategy, TourVariant};
use crate::{PlanError, PlanResult};

/// Default bound on attempts per planning request.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default accepted relative deviation of loop length from the target.
pub const DEFAULT_TOLERANCE: f64 = 0.3;

// ── CancelFlag ────────────────────────────────────────────────────────────────

/// Cooperative cancellation handle.
///
/// Clone it, hand one clone to the planning request's config, keep the other,
/// and call [`cancel`](Self::cancel) from any thread.  The planner checks the
/// flag at attempt starts and between leg searches; a search already underway
/// runs to completion.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ── RoundTripConfig ───────────────────────────────────────────────────────────

/// Per-request planning configuration.
#[derive(Clone, Debug)]
pub struct RoundTripConfig {
    /// Bound on total attempts (≥ 1).
    pub max_retries: u32,

    /// Cost multiplier for segments already used by an earlier leg (≥ 1).
    pub penalty_factor: f64,

    /// Accepted relative deviation of loop length from the target (> 0).
    /// 0.3 accepts loops within ±30 % of the requested distance.
    pub tolerance: f64,

    /// Which tour strategy generates via-point proposals.
    pub variant: TourVariant,

    /// Optional wall-clock budget for the whole request.  Checked before
    /// each attempt; an expired budget ends the request as
    /// [`PlanError::RoundTripFailed`].
    pub time_budget: Option<Duration>,

    /// Fixed RNG seed for reproducible plans.  `None` draws from entropy.
    pub seed: Option<u64>,

    /// Cooperative cancellation handle for this request.
    pub cancel: Option<CancelFlag>,
}

impl Default for RoundTripConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            penalty_factor: VISITED_EDGE_PENALTY,
            tolerance: DEFAULT_TOLERANCE,
            variant: TourVariant::default(),
            time_budget: None,
            seed: None,
            cancel: None,
        }
    }
}

impl RoundTripConfig {
    fn validate(&self) -> PlanResult<()> {
        if self.max_retries == 0 {
            return Err(PlanError::InvalidParameter(
                "max_retries must be at least 1".into(),
            ));
        }
        if !self.penalty_factor.is_finite() || self.penalty_factor < 1.0 {
            return Err(PlanError::InvalidParameter(format!(
                "penalty_factor must be finite and ≥ 1, got {}",
                self.penalty_factor
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(PlanError::InvalidParameter(format!(
                "tolerance must be finite and positive, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

// ── LoopRoute ─────────────────────────────────────────────────────────────────

/// A closed loop assembled from consecutive leg paths.
///
/// Invariants on a planner-produced loop: each leg's end node equals the next
/// leg's start node, the final leg ends where the first began, and the total
/// distance lies within the configured tolerance of the requested target.
#[derive(Debug, Clone)]
pub struct LoopRoute {
    /// Leg paths in travel order; each leg was searched against a
    /// successively more penalized cost function.
    pub legs: Vec<Path>,

    /// Sum of all legs' physical lengths in metres.
    pub total_distance_m: f64,

    /// Attempts the planner needed (≥ 1).
    pub attempts: u32,
}

impl LoopRoute {
    /// The node the loop starts and ends at.
    pub fn start(&self) -> NodeId {
        self.legs[0].from
    }

    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    /// All traversed segments in travel order.  A segment may appear more
    /// than once when a sparse network forces a later leg back over an
    /// earlier one (soft avoidance).
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.legs.iter().flat_map(|leg| leg.edges.iter().copied())
    }

    /// `true` if consecutive legs chain end-to-start and the last leg
    /// returns to the first leg's start.
    pub fn is_closed(&self) -> bool {
        let (Some(first), Some(last)) = (self.legs.first(), self.legs.last()) else {
            return false;
        };
        self.legs.windows(2).all(|w| w[0].to == w[1].from) && last.to == first.from
    }
}

// ── Attempt failures (absorbed by the retry loop) ─────────────────────────────

/// Why one attempt was abandoned.  Never observable to callers except
/// through the aggregate retry outcome.
enum AttemptFailure {
    /// No routable node near the projected via coordinate.
    ViaUnresolved,
    /// The via point resolved to the start node (degenerate offset), or a
    /// leg collapsed to zero length.
    DegenerateVia,
    /// A leg search found no path.
    Leg,
    /// The assembled loop landed outside the tolerance band.
    Tolerance,
    /// Not retryable; propagated to the caller as-is.
    Fatal(PlanError),
}

impl From<PlanError> for AttemptFailure {
    fn from(e: PlanError) -> Self {
        AttemptFailure::Fatal(e)
    }
}

// ── RoundTripPlanner ──────────────────────────────────────────────────────────

/// Assembles round trips on a road network using a pluggable search.
///
/// # Type parameter
///
/// `S` must implement [`PathSearch`] (e.g. [`tour_graph::AStarSearch`]).
/// Swap it at compile time for a different search algorithm with no runtime
/// overhead.
pub struct RoundTripPlanner<'n, S: PathSearch> {
    network: &'n RoadNetwork,
    search: S,
}

impl<'n, S: PathSearch> RoundTripPlanner<'n, S> {
    pub fn new(network: &'n RoadNetwork, search: S) -> Self {
        Self { network, search }
    }

    /// Plan a loop from `start` of roughly `target_distance_m` metres under
    /// the given base cost model.
    ///
    /// Returns the first acceptable loop, [`PlanError::RoundTripFailed`]
    /// once retries or the time budget are exhausted, or
    /// [`PlanError::Cancelled`] if the request's [`CancelFlag`] fires.
    pub fn plan(
        &self,
        start: NodeId,
        target_distance_m: f64,
        cost: &dyn CostFunction,
        config: &RoundTripConfig,
    ) -> PlanResult<LoopRoute> {
        config.validate()?;
        if !target_distance_m.is_finite() || target_distance_m <= 0.0 {
            return Err(PlanError::InvalidParameter(format!(
                "target distance must be positive, got {target_distance_m}"
            )));
        }
        let start_pos = self.network.position(start).ok_or_else(|| {
            PlanError::InvalidParameter(format!("start node {start} not in network"))
        })?;

        let mut rng = match config.seed {
            Some(seed) => TourRng::new(seed),
            None => TourRng::from_entropy(),
        };
        let deadline = config.time_budget.map(|budget| Instant::now() + budget);

        let mut attempts = 0;
        while attempts < config.max_retries {
            if config.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
                return Err(PlanError::Cancelled);
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }

            attempts += 1;
            match self.attempt(start, start_pos, target_distance_m, cost, config, &mut rng) {
                Ok(mut route) => {
                    route.attempts = attempts;
                    return Ok(route);
                }
                Err(AttemptFailure::Fatal(e)) => return Err(e),
                // Absorbed: retry with a fresh tour plan and visited set.
                Err(_) => continue,
            }
        }

        Err(PlanError::RoundTripFailed { attempts })
    }

    fn attempt(
        &self,
        start: NodeId,
        start_pos: GeoPoint,
        target_m: f64,
        cost: &dyn CostFunction,
        config: &RoundTripConfig,
        rng: &mut TourRng,
    ) -> Result<LoopRoute, AttemptFailure> {
        let tour = make_tour(config.variant, target_m, rng)?;

        // Resolve each proposal to a concrete graph node.
        let mut via_nodes = Vec::with_capacity(tour.point_count());
        for i in 0..tour.point_count() {
            let proposal = start_pos.project(tour.bearing_for(i)?, tour.distance_for(i)?);
            let via = self
                .network
                .snap_to_node(proposal)
                .ok_or(AttemptFailure::ViaUnresolved)?;
            if via == start {
                return Err(AttemptFailure::DegenerateVia);
            }
            via_nodes.push(via);
        }

        // One avoidance decorator shared by every leg of this attempt.
        let mut avoid = AvoidEdgesCost::with_penalty(cost, config.penalty_factor);

        let mut legs: Vec<Path> = Vec::with_capacity(via_nodes.len() + 1);
        let mut total_m = 0.0;
        let mut prev = start;
        for next in via_nodes.into_iter().chain(std::iter::once(start)) {
            // Leg boundary: the natural cancellation point.
            if config.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
                return Err(PlanError::Cancelled.into());
            }

            let leg = self
                .search
                .search(self.network, prev, next, &avoid)
                .map_err(|_| AttemptFailure::Leg)?;
            if leg.is_trivial() {
                return Err(AttemptFailure::DegenerateVia);
            }

            avoid.record_path(&leg);
            total_m += leg.distance_m;
            legs.push(leg);
            prev = next;
        }

        let route = LoopRoute {
            legs,
            total_distance_m: total_m,
            attempts: 0, // filled in by plan()
        };
        if !route.is_closed() {
            return Err(AttemptFailure::Leg);
        }
        if (total_m - target_m).abs() > config.tolerance * target_m {
            return Err(AttemptFailure::Tolerance);
        }
        Ok(route)
    }
}

fn make_tour(
    variant: TourVariant,
    target_m: f64,
    rng: &mut TourRng,
) -> PlanResult<Box<dyn TourStrategy>> {
    match variant {
        TourVariant::SinglePoint => Ok(Box::new(SinglePointTour::new(target_m, rng)?)),
    }
}

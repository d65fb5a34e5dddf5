//! Via-point generation: where should a loop's intermediate stops roughly be?
//!
//! A tour strategy turns a target total distance into a bounded sequence of
//! (bearing, distance) proposals relative to the start point.  Proposals are
//! sampled once at construction and immutable afterwards; the planner builds
//! a fresh strategy (fresh draw) for every attempt, which is what gives
//! retries — and repeated requests — their route diversity.

use tour_core::TourRng;

use crate::{PlanError, PlanResult};

// ── Strategy capability ───────────────────────────────────────────────────────

/// A generated tour plan: `point_count()` via-point proposals, each a bearing
/// and a distance offset from the start point.
pub trait TourStrategy {
    /// Number of via points this strategy generated (≥ 1).
    fn point_count(&self) -> usize;

    /// Bearing of proposal `i` in degrees `[0, 360)`.
    fn bearing_for(&self, i: usize) -> PlanResult<f64>;

    /// Distance of proposal `i` from the start point in metres (> 0).
    fn distance_for(&self, i: usize) -> PlanResult<f64>;
}

/// Selector for the tour strategy a planning request uses.
///
/// Closed for now; adding a multi-point variant means adding an arm here and
/// a constructor in the planner — the orchestration itself only speaks
/// [`TourStrategy`].
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum TourVariant {
    #[default]
    SinglePoint,
}

// ── Single-point tour ─────────────────────────────────────────────────────────

/// Lower bound of the sampling band, as a multiple of `target / 3`.
pub const DISTANCE_BAND_MIN: f64 = 0.87;
/// Upper bound of the sampling band, as a multiple of `target / 3`.
pub const DISTANCE_BAND_MAX: f64 = 1.11;

/// One via point at roughly a third of the target distance, in a uniformly
/// random direction.
///
/// A round trip through a single via point is approximately a triangle:
/// outbound leg, far vertex, return leg.  Placing the vertex at ~`target/3`
/// makes the two searched sides sum to roughly the target perimeter.  The
/// distance is drawn from `[DISTANCE_BAND_MIN, DISTANCE_BAND_MAX] × target/3`
/// so two requests for the same target do not produce the identical loop.
#[derive(Debug, Clone)]
pub struct SinglePointTour {
    bearing_deg: f64,
    distance_m: f64,
}

impl SinglePointTour {
    /// Sample a tour for `target_distance_m` metres of total loop length.
    ///
    /// Fails with [`PlanError::InvalidParameter`] if the target is not a
    /// positive finite distance.
    pub fn new(target_distance_m: f64, rng: &mut TourRng) -> PlanResult<Self> {
        if !target_distance_m.is_finite() || target_distance_m <= 0.0 {
            return Err(PlanError::InvalidParameter(format!(
                "target distance must be positive, got {target_distance_m}"
            )));
        }

        let third = target_distance_m / 3.0;
        Ok(Self {
            bearing_deg: rng.gen_range(0.0..360.0),
            distance_m: rng.gen_range(DISTANCE_BAND_MIN * third..=DISTANCE_BAND_MAX * third),
        })
    }
}

impl TourStrategy for SinglePointTour {
    fn point_count(&self) -> usize {
        1
    }

    fn bearing_for(&self, i: usize) -> PlanResult<f64> {
        if i >= 1 {
            return Err(PlanError::IndexOutOfRange { index: i, count: 1 });
        }
        Ok(self.bearing_deg)
    }

    fn distance_for(&self, i: usize) -> PlanResult<f64> {
        if i >= 1 {
            return Err(PlanError::IndexOutOfRange { index: i, count: 1 });
        }
        Ok(self.distance_m)
    }
}

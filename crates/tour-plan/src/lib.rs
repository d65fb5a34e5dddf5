//! `tour-plan` — round-trip planning on a road network.
//!
//! Given a start node and a target total distance, the planner assembles a
//! closed loop that approximates the target while avoiding significant
//! retracing: a tour strategy proposes where the loop's via point should
//! roughly be, each leg is searched with a cost function that penalizes
//! segments earlier legs already used, and a bounded retry loop re-samples
//! the proposals whenever a leg fails or the loop misses the tolerance band.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`avoid`]   | `AvoidEdgesCost` — visited-segment penalty decorator          |
//! | [`tour`]    | `TourStrategy`, `TourVariant`, `SinglePointTour`              |
//! | [`planner`] | `RoundTripPlanner`, `RoundTripConfig`, `LoopRoute`, `CancelFlag` |
//! | [`error`]   | `PlanError`, `PlanResult<T>`                                  |
//!
//! # Example
//!
//! ```no_run
//! use tour_graph::{AStarSearch, DistanceCost, RoadNetwork};
//! use tour_plan::{RoundTripConfig, RoundTripPlanner};
//!
//! # fn demo(network: &RoadNetwork, start: tour_core::NodeId) -> tour_plan::PlanResult<()> {
//! let planner = RoundTripPlanner::new(network, AStarSearch);
//! let config = RoundTripConfig::default();
//! let loop_route = planner.plan(start, 10_000.0, &DistanceCost, &config)?;
//! assert!(loop_route.is_closed());
//! # Ok(())
//! # }
//! ```
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                |
//! |-----------|-------------------------------------------------------|
//! | `fx-hash` | FxHash instead of SipHash for the visited-edge set.   |

pub mod avoid;
pub mod error;
pub mod planner;
pub mod tour;

#[cfg(test)]
mod tests;

pub use avoid::{AvoidEdgesCost, VISITED_EDGE_PENALTY};
pub use error::{PlanError, PlanResult};
pub use planner::{
    CancelFlag, LoopRoute, RoundTripConfig, RoundTripPlanner, DEFAULT_MAX_RETRIES,
    DEFAULT_TOLERANCE,
};
pub use tour::{
    SinglePointTour, TourStrategy, TourVariant, DISTANCE_BAND_MAX, DISTANCE_BAND_MIN,
};

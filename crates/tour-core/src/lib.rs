//! `tour-core` — foundational types for the `rust_tour` routing engine.
//!
//! This crate is a dependency of every other `tour-*` crate.  It intentionally
//! has no `tour-*` dependencies and minimal external ones (only `rand`, plus
//! optional `serde`).  Error types live with the subsystems that raise them
//! (`tour_graph::GraphError`, `tour_plan::PlanError`).
//!
//! # What lives here
//!
//! | Module  | Contents                                         |
//! |---------|--------------------------------------------------|
//! | [`ids`] | `NodeId`, `EdgeId`, `ArcId`                      |
//! | [`geo`] | `GeoPoint`, haversine distance, bearing offsets  |
//! | [`rng`] | `TourRng` (seedable random source)               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod geo;
pub mod ids;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::GeoPoint;
pub use ids::{ArcId, EdgeId, NodeId};
pub use rng::TourRng;

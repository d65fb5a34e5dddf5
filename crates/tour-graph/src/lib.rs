//! `tour-graph` — road network, spatial indexing, and shortest-path search.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`network`] | `RoadNetwork` (CSR + R-tree), `RoadNetworkBuilder`        |
//! | [`cost`]    | `CostFunction`, `EdgeRef`, `Direction`, `DistanceCost`    |
//! | [`search`]  | `PathSearch` trait, `Path`, `AStarSearch`                 |
//! | [`error`]   | `GraphError`, `GraphResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                             |
//! |---------|----------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types. |

pub mod cost;
pub mod error;
pub mod network;
pub mod search;


pub use cost::{CostFunction, Direction, DistanceCost, EdgeRef};
pub use error::{GraphError, GraphResult};
pub use network::{RoadNetwork, RoadNetworkBuilder};
pub use search::{AStarSearch, Path, PathSearch};

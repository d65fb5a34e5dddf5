//! Graph-subsystem error type.

use thiserror::Error;

use tour_core::NodeId;

/// Errors produced by `tour-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("no path from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),
}

pub type GraphResult<T> = Result<T, GraphError>;

//! Core error types for pact-core.
//!
//! Uses `thiserror` for structured, matchable error variants. Every variant
//! that concerns a specific graph or vertex carries that identity so callers
//! can report precisely which pattern failed (§7 propagation rule: errors
//! surface with the offending graph/pattern id, not just a message).

use thiserror::Error;

use crate::id::VertexId;

/// Errors produced while constructing or querying graphs and hypergraphs.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A graph6/sparse6/directed-format byte string did not parse.
    #[error("malformed graph encoding: {reason}")]
    DecodingError { reason: String },

    /// The primal graph of a pattern is disconnected; rejected before planning.
    #[error("pattern primal graph is disconnected ({component_count} components)")]
    DisconnectedPattern { component_count: usize },

    /// A vertex id was not found in the graph.
    #[error("vertex not found: VertexId({id})", id = id.0)]
    VertexNotFound { id: VertexId },

    /// A hyperedge name was not found in the hypergraph.
    #[error("hyperedge not found: {name}")]
    EdgeNotFound { name: String },

    /// An internal invariant of the graph/hypergraph/decomposition model was violated.
    #[error("graph inconsistency: {reason}")]
    GraphInconsistency { reason: String },
}

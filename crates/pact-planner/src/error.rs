//! Planner and execution error types (§7).
//!
//! Propagation rule: only [`PlannerError::SolverTimeout`] and the cheap
//! isomorphism filter's negative result get local recovery. Every other
//! variant surfaces to the caller with the offending pattern/graph id
//! attached rather than a bare message.

use thiserror::Error;

use pact_core::CoreError;

/// Errors from decomposition acquisition, plan compilation, and execution.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// §4.A/§4.B: the pattern's primal graph failed to decompose.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// §4.C: neither the GYO fast path nor any HTD-solver attempt produced
    /// a decomposition for this pattern.
    #[error("no decomposition found for pattern {pattern_id}")]
    NoDecomposition { pattern_id: String },

    /// §4.C: the primal graph of the pattern is disconnected, rejected
    /// before planning.
    #[error("pattern {pattern_id} primal graph is disconnected ({component_count} components)")]
    DisconnectedPattern { pattern_id: String, component_count: usize },

    /// §4.G: a quotient was not found in the spasm space and
    /// `expand_space = forbid`.
    #[error("basis incomplete for target graph {target_id}: quotient not in spasm space")]
    BasisIncomplete { target_id: String },

    /// §4.H: predicted overflow with graceful bigint promotion disabled.
    #[error("integer overflow predicted in relation {relation} and graceful promotion is disabled")]
    IntegerOverflow { relation: String },

    /// §4.C/§6: one HTD-solver attempt exceeded its wall-clock budget. Not
    /// fatal unless every attempt times out.
    #[error("HTD solver attempt {attempt} timed out after {elapsed_ms}ms")]
    SolverTimeout { attempt: usize, elapsed_ms: u128 },

    /// §6: the solver emitted non-JSON, or a decomposition violating the
    /// §3 tree-decomposition invariants.
    #[error("HTD solver protocol error on attempt {attempt}: {reason}")]
    SolverProtocolError { attempt: usize, reason: String },
}

//! A trivial, always-correct [`DecompositionSolver`] for property tests: one
//! bag containing every vertex, one cover containing every hyperedge. This
//! is a valid hypertree decomposition for any hypergraph (running
//! intersection holds vacuously with a single node) -- just not a narrow
//! one, so it stands in for the external HTD binary in tests that only
//! care about plan/executor correctness, not decomposition width.

use std::time::Duration;

use pact_core::Hypergraph;
use pact_planner::error::PlannerError;
use pact_planner::solver::{DecompositionSolver, RawTd, RawTdNode};

pub struct NaiveWideSolver;

impl DecompositionSolver for NaiveWideSolver {
    fn decompose(&self, hg: &Hypergraph, _seed: u64, _timeout: Duration) -> Result<RawTd, PlannerError> {
        let bag: Vec<u32> = hg.vertices().into_iter().map(|v| v.0).collect();
        let cover: Vec<String> = hg.edge_names().map(|n| n.0.clone()).collect();
        Ok(RawTd { root: RawTdNode { bag, cover, children: None } })
    }
}

//! Runs the full decomposition -> refinement -> compilation -> execution
//! pipeline end to end, the thing the property tests check against the
//! brute-force reference.

use std::time::Duration;

use pact_core::{Graph, Hypergraph};
use pact_planner::config::PactConfig;
use pact_planner::error::PlannerError;
use pact_planner::multiplicity::Multiplicity;
use pact_planner::solver::DecompositionSolver;
use pact_planner::{acquire_decomposition, compile_plan, refine_tree, run_and_total};

/// Runs `pattern` against `host` through every planner stage and returns the
/// total homomorphism count.
pub fn count_via_pipeline(
    pattern: &Graph,
    host: &Graph,
    solver: &dyn DecompositionSolver,
    config: &PactConfig,
) -> Result<Multiplicity, PlannerError> {
    let hg = Hypergraph::from_graph(pattern);
    let pattern_id = pattern.stable_id().to_hex().to_string();

    let mut root = acquire_decomposition(&hg, solver, config.solver_attempts, config.solver_timeout, &pattern_id)?;
    refine_tree(&mut root, &hg)?;
    let (ops, final_relation) = compile_plan(&root, pattern, config)?;
    Ok(run_and_total(host, &ops, &final_relation))
}

/// Like [`count_via_pipeline`] but with a generous default timeout, for
/// tests that don't care about the solver's wall-clock budget.
pub fn count_via_pipeline_default(
    pattern: &Graph,
    host: &Graph,
    solver: &dyn DecompositionSolver,
) -> Result<Multiplicity, PlannerError> {
    count_via_pipeline(pattern, host, solver, &PactConfig { solver_timeout: Duration::from_secs(5), ..PactConfig::default() })
}

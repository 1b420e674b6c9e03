//! Brute-force reference implementations, seeded random generators, and
//! property-based contract tests for the pattern-counting pipeline.
//!
//! Mirrors `lmlang-check`'s role relative to `lmlang-core`/`lmlang-ir`: an
//! independent, deliberately naive ground truth that the planner and
//! executor are checked against rather than trusted by construction.

pub mod brute_force;
pub mod contracts;
pub mod generators;
pub mod naive_solver;
pub mod pipeline;

pub use brute_force::{count_homomorphisms, count_subgraph_isomorphisms};
pub use contracts::property::{run_property_tests, PropertyTestConfig, PropertyTestFailure, PropertyTestResult};
pub use generators::{random_connected_graph, random_host, random_pattern};
pub use naive_solver::NaiveWideSolver;
pub use pipeline::{count_via_pipeline, count_via_pipeline_default};

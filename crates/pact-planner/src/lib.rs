//! Decomposition, compilation, and execution of pattern-counting plans.
//!
//! This crate turns a pattern graph into a homomorphism count against a host
//! graph: acquire a tree decomposition (§4.C), refine its covers into
//! connected covers (§4.D), compile a relational plan (§4.E), and run it
//! against a host seeded into the relational executor (§4.H). The
//! homomorphism basis builder (§4.G) composes counts from a spasm space of
//! smaller basis graphs for the harder subgraph-isomorphism-adjacent queries.
//!
//! # Modules
//!
//! - [`error`] -- PlannerError, covering every failure mode below
//! - [`config`] -- PactConfig: solver timeout/attempts, overflow and
//!   expand-space policy, early-semijoin toggle
//! - [`acquirer`] -- GYO join-tree fast path plus HTD-solver fallback
//! - [`refiner`] -- cover refinement into connected covers
//! - [`solver`] -- the external HTD-solver subprocess protocol
//! - [`ops`] -- the six-operation relational IR
//! - [`compiler`] -- decomposition -> relational plan
//! - [`multiplicity`] -- overflow-safe count arithmetic
//! - [`executor`] -- relational plan execution against a host graph
//! - [`basis`] -- homomorphism basis builder

pub mod acquirer;
pub mod basis;
pub mod compiler;
pub mod config;
pub mod error;
pub mod executor;
pub mod multiplicity;
pub mod ops;
pub mod refiner;
pub mod solver;

pub use acquirer::acquire_decomposition;
pub use basis::build_hom_basis;
pub use compiler::compile_plan;
pub use config::{ExpandSpacePolicy, OverflowPolicy, PactConfig};
pub use error::PlannerError;
pub use executor::{run_and_total, ExecState};
pub use multiplicity::Multiplicity;
pub use ops::Op;
pub use refiner::refine_tree;
pub use solver::{DecompositionSolver, ExternalHtdSolver, StubSolver};

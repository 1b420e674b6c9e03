//! PACT graph pattern counting CLI.
//!
//! Provides the `pact` binary with subcommands for counting pattern
//! occurrences in a host graph. `count` computes the homomorphism count
//! directly; `subgraph` additionally builds the pattern's spasm basis and
//! combines homomorphism counts into a subgraph-isomorphism count.
//!
//! Both subcommands drive the same `acquire_decomposition` -> `refine_tree`
//! -> `compile_plan` -> `run_and_total` pipeline the library crate exposes,
//! ensuring identical counting behavior from the CLI as from any embedder.

use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};

use pact_core::{decode_graph6, decode_sparse6, Graph, Hypergraph};
use pact_planner::config::{ExpandSpacePolicy, PactConfig};
use pact_planner::solver::{DecompositionSolver, ExternalHtdSolver};
use pact_planner::{acquire_decomposition, build_hom_basis, compile_plan, refine_tree, run_and_total};
use pact_storage::{InMemoryStore, PactStore, SpasmSpace};

/// PACT: count pattern occurrences in a host graph.
#[derive(Parser)]
#[command(name = "pact", about = "Graph pattern counting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Count homomorphisms of a pattern graph into a host graph.
    Count {
        /// Path to the pattern graph file (graph6 or sparse6).
        #[arg(short, long)]
        pattern: PathBuf,

        /// Path to the host graph file (graph6 or sparse6).
        #[arg(short = 'H', long)]
        host: PathBuf,

        /// Number of parallel HTD-solver attempts for cyclic patterns.
        #[arg(short = 'a', long, default_value_t = 1)]
        attempts: u32,

        /// Wall-clock budget per solver attempt, in milliseconds.
        #[arg(short = 't', long, default_value_t = 30_000)]
        timeout_ms: u64,

        /// Path to the `htd` solver binary for cyclic patterns; omit to
        /// rely solely on the acyclic join-tree fast path.
        #[arg(long)]
        solver: Option<PathBuf>,
    },
    /// Count subgraph isomorphisms of a pattern graph in a host graph via
    /// the spasm basis (§4.G): a signed sum of homomorphism counts.
    Subgraph {
        #[arg(short, long)]
        pattern: PathBuf,

        #[arg(short = 'H', long)]
        host: PathBuf,

        #[arg(short = 'a', long, default_value_t = 1)]
        attempts: u32,

        #[arg(short = 't', long, default_value_t = 30_000)]
        timeout_ms: u64,

        #[arg(long)]
        solver: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Count { pattern, host, attempts, timeout_ms, solver } => {
            tracing::info!(pattern = %pattern.display(), host = %host.display(), "counting homomorphisms");
            run_count(&pattern, &host, attempts, timeout_ms, solver)
        }
        Commands::Subgraph { pattern, host, attempts, timeout_ms, solver } => {
            tracing::info!(pattern = %pattern.display(), host = %host.display(), "counting subgraph isomorphisms");
            run_subgraph(&pattern, &host, attempts, timeout_ms, solver)
        }
    };
    process::exit(exit_code);
}

/// Loads a graph from `path`, trying graph6 then sparse6 (§9 format
/// detection: sparse6 files start with `:`, decided by the decoder, not the
/// caller, so both are attempted in the order most inputs favor).
fn load_graph(path: &PathBuf) -> Result<Graph, String> {
    let bytes = fs::read(path).map_err(|e| format!("failed to read '{}': {e}", path.display()))?;
    let trimmed: &[u8] = bytes.strip_suffix(b"\n").unwrap_or(&bytes);
    if trimmed.first() == Some(&b':') {
        decode_sparse6(trimmed).map_err(|e| format!("invalid sparse6 in '{}': {e}", path.display()))
    } else {
        decode_graph6(trimmed).map_err(|e| format!("invalid graph6 in '{}': {e}", path.display()))
    }
}

fn build_config(attempts: u32, timeout_ms: u64, expand_space: ExpandSpacePolicy) -> PactConfig {
    PactConfig {
        solver_timeout: Duration::from_millis(timeout_ms),
        solver_attempts: attempts,
        expand_space,
        ..PactConfig::default()
    }
}

fn resolve_solver(solver: Option<PathBuf>) -> Box<dyn DecompositionSolver> {
    match solver {
        Some(binary_path) => Box::new(ExternalHtdSolver { binary_path }),
        None => Box::new(pact_planner::solver::StubSolver::default()),
    }
}

/// Runs a single pattern/host pair through the full pipeline, caching the
/// pattern and its decomposition in an in-memory store keyed by content
/// hash so repeated CLI invocations within a script share nothing across
/// process boundaries but still exercise the same storage contract an
/// embedder would use for a long-lived cache.
fn run_count(pattern_path: &PathBuf, host_path: &PathBuf, attempts: u32, timeout_ms: u64, solver: Option<PathBuf>) -> i32 {
    let pattern = match load_graph(pattern_path) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {e}");
            return 3;
        }
    };
    let host = match load_graph(host_path) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {e}");
            return 3;
        }
    };

    let config = build_config(attempts, timeout_ms, ExpandSpacePolicy::Forbid);
    let solver = resolve_solver(solver);
    let mut store = InMemoryStore::new();

    match count_pattern(&pattern, &host, solver.as_ref(), &config, &mut store) {
        Ok(count) => {
            println!("{count}");
            0
        }
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}

fn run_subgraph(pattern_path: &PathBuf, host_path: &PathBuf, attempts: u32, timeout_ms: u64, solver: Option<PathBuf>) -> i32 {
    let pattern = match load_graph(pattern_path) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {e}");
            return 3;
        }
    };
    let host = match load_graph(host_path) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {e}");
            return 3;
        }
    };

    let config = build_config(attempts, timeout_ms, ExpandSpacePolicy::Allow);
    let solver = resolve_solver(solver);
    let mut store = InMemoryStore::new();

    let oracle = pact_core::RefinementOracle;
    let mut space = SpasmSpace::new();
    let coeffs = match build_hom_basis(&pattern, &mut space, &oracle, config.expand_space, false) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: failed to build spasm basis: {e}");
            return 1;
        }
    };

    let mut total = num_rational::BigRational::from_integer(0.into());
    for (id, coeff) in &coeffs {
        let basis_graph = match space.get(*id) {
            Some(g) => g,
            None => {
                eprintln!("Error: spasm basis referenced unknown member {id:?}");
                return 1;
            }
        };
        let hom_count = match count_pattern(basis_graph, &host, solver.as_ref(), &config, &mut store) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {e}");
                return 1;
            }
        };
        total += coeff * num_rational::BigRational::from_integer(hom_count.as_bigint());
    }

    if !total.is_integer() {
        eprintln!("Error: spasm sum {total} is not an integer; basis is incomplete");
        return 1;
    }
    println!("{}", total.to_integer());
    0
}

fn count_pattern(
    pattern: &Graph,
    host: &Graph,
    solver: &dyn DecompositionSolver,
    config: &PactConfig,
    store: &mut InMemoryStore,
) -> Result<pact_planner::Multiplicity, String> {
    let pattern_id = store.put_pattern(pattern).map_err(|e| e.to_string())?;
    let hg = Hypergraph::from_graph(pattern);

    let root = acquire_decomposition(&hg, solver, config.solver_attempts, config.solver_timeout, &pattern_id.to_string())
        .map_err(|e| e.to_string())?;
    let mut root = root;
    refine_tree(&mut root, &hg).map_err(|e| e.to_string())?;

    let (ops, final_relation) = compile_plan(&root, pattern, config).map_err(|e| e.to_string())?;
    Ok(run_and_total(host, &ops, &final_relation))
}

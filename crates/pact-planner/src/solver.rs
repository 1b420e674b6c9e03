//! External hypertree-decomposition solver capability (§4.C, §6).
//!
//! The acquirer reaches the solver only through the [`DecompositionSolver`]
//! trait, so its cost-ranking and multi-attempt-selection logic is testable
//! against [`StubSolver`] without an external binary
//! (`balgowrapper.py`'s separation between `call_balanced_go_solver` and the
//! pure cost/selection logic around it).

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use pact_core::{EdgeName, Hypergraph, VertexId};
use serde::Deserialize;

use crate::error::PlannerError;

/// Raw decomposition as emitted over the wire (§6): vertex ids as plain
/// integers and edge names as strings, before name resolution against the
/// pattern's hypergraph.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTdNode {
    #[serde(rename = "Bag")]
    pub bag: Vec<u32>,
    #[serde(rename = "Cover")]
    pub cover: Vec<String>,
    #[serde(rename = "Children")]
    pub children: Option<Vec<RawTdNode>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTd {
    #[serde(rename = "Root")]
    pub root: RawTdNode,
}

/// Resolves a [`RawTd`] against the hypergraph's edge-name map into a
/// [`pact_core::TdNode`], validating the §3 edge-cover invariant (every
/// cover edge name exists and the cover's incident vertices cover the bag).
pub fn resolve_raw_td(raw: &RawTd, ecmap: &IndexMap<EdgeName, (VertexId, VertexId)>) -> Result<pact_core::TdNode, PlannerError> {
    resolve_raw_node(&raw.root, ecmap)
}

fn resolve_raw_node(raw: &RawTdNode, ecmap: &IndexMap<EdgeName, (VertexId, VertexId)>) -> Result<pact_core::TdNode, PlannerError> {
    let bag: std::collections::HashSet<VertexId> = raw.bag.iter().map(|&v| VertexId(v)).collect();

    let mut cover = IndexMap::new();
    let mut covered_vertices = std::collections::HashSet::new();
    for name in &raw.cover {
        let edge_name = EdgeName(name.clone());
        let &(u, v) = ecmap.get(&edge_name).ok_or_else(|| PlannerError::SolverProtocolError {
            attempt: 0,
            reason: format!("solver referenced unknown edge name {name}"),
        })?;
        covered_vertices.insert(u);
        covered_vertices.insert(v);
        cover.insert(edge_name, (u, v));
    }
    if !bag.is_subset(&covered_vertices) {
        return Err(PlannerError::SolverProtocolError {
            attempt: 0,
            reason: "solver cover does not cover its own bag".to_string(),
        });
    }

    let mut node = pact_core::TdNode::new(bag, cover);
    if let Some(children) = &raw.children {
        for child in children {
            node.children.push(resolve_raw_node(child, ecmap)?);
        }
    }
    Ok(node)
}

/// Capability trait over the external exact hypertree-decomposition solver.
pub trait DecompositionSolver: Send + Sync {
    fn decompose(&self, hg: &Hypergraph, seed: u64, timeout: Duration) -> Result<RawTd, PlannerError>;
}

/// Spawns the external HTD solver subprocess per §6: writes one
/// `NAME(u, v)` line per hyperedge to stdin, closes it, and parses a single
/// JSON line `{"Root": ...}` from stdout.
pub struct ExternalHtdSolver {
    pub binary_path: PathBuf,
}

impl DecompositionSolver for ExternalHtdSolver {
    fn decompose(&self, hg: &Hypergraph, _seed: u64, timeout: Duration) -> Result<RawTd, PlannerError> {
        let mut child = Command::new(&self.binary_path)
            .args(["-shellio", "-exact", "-heuristic", "1", "-local", "-complete"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| PlannerError::SolverProtocolError { attempt: 0, reason: format!("failed to spawn solver: {e}") })?;

        {
            let mut stdin = child.stdin.take().expect("piped stdin");
            for (name, &(u, v)) in hg.edges() {
                writeln!(stdin, "{}({}, {})", name.0, u.0, v.0)
                    .map_err(|e| PlannerError::SolverProtocolError { attempt: 0, reason: e.to_string() })?;
            }
        }

        let mut stdout = child.stdout.take().expect("piped stdout");
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = stdout.read_to_string(&mut buf);
            let _ = tx.send(buf);
        });

        let start = Instant::now();
        loop {
            if let Ok(Some(_status)) = child.try_wait() {
                break;
            }
            if start.elapsed() >= timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(PlannerError::SolverTimeout { attempt: 0, elapsed_ms: start.elapsed().as_millis() });
            }
            thread::sleep(Duration::from_millis(10));
        }

        let output = rx
            .recv_timeout(Duration::from_secs(5))
            .map_err(|e| PlannerError::SolverProtocolError { attempt: 0, reason: e.to_string() })?;
        let first_line = output.lines().next().unwrap_or("");
        serde_json::from_str::<RawTd>(first_line)
            .map_err(|e| PlannerError::SolverProtocolError { attempt: 0, reason: format!("invalid JSON from solver: {e}") })
    }
}

/// Deterministic stand-in for property tests: returns the `seed`-th canned
/// attempt (wrapping), independent of `hg` and `timeout`.
#[derive(Debug, Clone, Default)]
pub struct StubSolver {
    pub attempts: Vec<RawTd>,
}

impl StubSolver {
    pub fn single(raw: RawTd) -> Self {
        StubSolver { attempts: vec![raw] }
    }

    pub fn by_seed(attempts: HashMap<u64, RawTd>) -> Self {
        let mut ordered: Vec<(u64, RawTd)> = attempts.into_iter().collect();
        ordered.sort_by_key(|(seed, _)| *seed);
        StubSolver { attempts: ordered.into_iter().map(|(_, td)| td).collect() }
    }
}

impl DecompositionSolver for StubSolver {
    fn decompose(&self, _hg: &Hypergraph, seed: u64, _timeout: Duration) -> Result<RawTd, PlannerError> {
        if self.attempts.is_empty() {
            return Err(PlannerError::SolverProtocolError { attempt: seed as usize, reason: "stub solver has no attempts configured".to_string() });
        }
        Ok(self.attempts[seed as usize % self.attempts.len()].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_node_raw(bag: Vec<u32>, cover: Vec<&str>) -> RawTd {
        RawTd {
            root: RawTdNode { bag, cover: cover.into_iter().map(String::from).collect(), children: None },
        }
    }

    #[test]
    fn resolve_raw_td_accepts_valid_cover() {
        let mut ecmap = IndexMap::new();
        ecmap.insert(EdgeName::new(0), (VertexId(0), VertexId(1)));
        let raw = single_node_raw(vec![0, 1], vec!["E_0"]);
        let node = resolve_raw_td(&raw, &ecmap).unwrap();
        assert_eq!(node.cover.len(), 1);
    }

    #[test]
    fn resolve_raw_td_rejects_unknown_edge() {
        let ecmap: IndexMap<EdgeName, (VertexId, VertexId)> = IndexMap::new();
        let raw = single_node_raw(vec![0, 1], vec!["E_0"]);
        assert!(resolve_raw_td(&raw, &ecmap).is_err());
    }

    #[test]
    fn resolve_raw_td_rejects_uncovered_bag() {
        let mut ecmap = IndexMap::new();
        ecmap.insert(EdgeName::new(0), (VertexId(0), VertexId(1)));
        let raw = single_node_raw(vec![0, 1, 2], vec!["E_0"]);
        assert!(resolve_raw_td(&raw, &ecmap).is_err());
    }

    #[test]
    fn stub_solver_cycles_through_attempts_by_seed() {
        let a = single_node_raw(vec![0], vec![]);
        let b = single_node_raw(vec![1], vec![]);
        let stub = StubSolver { attempts: vec![a, b] };
        let hg = Hypergraph::new(false);
        let first = stub.decompose(&hg, 0, Duration::from_secs(1)).unwrap();
        let second = stub.decompose(&hg, 1, Duration::from_secs(1)).unwrap();
        assert_eq!(first.root.bag, vec![0]);
        assert_eq!(second.root.bag, vec![1]);
    }
}

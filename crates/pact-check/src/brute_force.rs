//! Brute-force reference implementations (§8) used to check the plan
//! compiler/executor against ground truth on small patterns and hosts.

use pact_core::{Graph, VertexId};

/// Counts homomorphisms `P -> H`: every map `V(P) -> V(H)` that preserves
/// every edge of `P` (edges of `P` may collapse onto one edge of `H`).
///
/// Exhaustive backtracking search, exponential in `|V(P)|`; callers keep
/// `P` to at most a handful of vertices (§8 pins `|V(P)| <= 5`).
pub fn count_homomorphisms(pattern: &Graph, host: &Graph) -> u64 {
    let pattern_vertices: Vec<VertexId> = pattern.vertices().collect();
    let pattern_edges: Vec<(VertexId, VertexId)> = pattern.edges().collect();
    let host_vertices: Vec<VertexId> = host.vertices().collect();
    let host_edges: std::collections::HashSet<(VertexId, VertexId)> = host.edges().collect();

    let mut count = 0u64;
    let mut assignment = vec![None; pattern_vertices.len()];
    search(
        0,
        &pattern_vertices,
        &pattern_edges,
        &host_vertices,
        &host_edges,
        host.directed(),
        &mut assignment,
        &mut count,
        false,
    );
    count
}

/// Counts injective homomorphisms `G -> H` (subgraph isomorphisms): like
/// [`count_homomorphisms`] but the assignment must be injective.
pub fn count_subgraph_isomorphisms(pattern: &Graph, host: &Graph) -> u64 {
    let pattern_vertices: Vec<VertexId> = pattern.vertices().collect();
    let pattern_edges: Vec<(VertexId, VertexId)> = pattern.edges().collect();
    let host_vertices: Vec<VertexId> = host.vertices().collect();
    let host_edges: std::collections::HashSet<(VertexId, VertexId)> = host.edges().collect();

    let mut count = 0u64;
    let mut assignment = vec![None; pattern_vertices.len()];
    search(
        0,
        &pattern_vertices,
        &pattern_edges,
        &host_vertices,
        &host_edges,
        host.directed(),
        &mut assignment,
        &mut count,
        true,
    );
    count
}

#[allow(clippy::too_many_arguments)]
fn search(
    idx: usize,
    pattern_vertices: &[VertexId],
    pattern_edges: &[(VertexId, VertexId)],
    host_vertices: &[VertexId],
    host_edges: &std::collections::HashSet<(VertexId, VertexId)>,
    directed: bool,
    assignment: &mut Vec<Option<VertexId>>,
    count: &mut u64,
    injective: bool,
) {
    if idx == pattern_vertices.len() {
        *count += 1;
        return;
    }
    for &candidate in host_vertices {
        if injective && assignment[..idx].iter().any(|&a| a == Some(candidate)) {
            continue;
        }
        assignment[idx] = Some(candidate);
        if edges_consistent(idx, pattern_vertices, pattern_edges, host_edges, directed, assignment) {
            search(
                idx + 1,
                pattern_vertices,
                pattern_edges,
                host_vertices,
                host_edges,
                directed,
                assignment,
                count,
                injective,
            );
        }
        assignment[idx] = None;
    }
}

fn edges_consistent(
    idx: usize,
    pattern_vertices: &[VertexId],
    pattern_edges: &[(VertexId, VertexId)],
    host_edges: &std::collections::HashSet<(VertexId, VertexId)>,
    directed: bool,
    assignment: &[Option<VertexId>],
) -> bool {
    let just_assigned = pattern_vertices[idx];
    for &(u, v) in pattern_edges {
        if u != just_assigned && v != just_assigned {
            continue;
        }
        let pu = pattern_vertices.iter().position(|&x| x == u).unwrap();
        let pv = pattern_vertices.iter().position(|&x| x == v).unwrap();
        let (Some(hu), Some(hv)) = (assignment[pu], assignment[pv]) else {
            continue;
        };
        let present = if directed {
            host_edges.contains(&(hu, hv))
        } else {
            host_edges.contains(&(hu, hv)) || host_edges.contains(&(hv, hu))
        };
        if !present {
            return false;
        }
    }
    true
}

//! Homomorphism basis builder (§4.G): decomposes hom-counting into a
//! rational-coefficient sum over subgraph-isomorphism counts against a
//! spasm space of quotient graphs, mirroring `hombase.py::hombase_coeffs_nauty`.

use std::collections::{BTreeMap, HashMap, HashSet};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use pact_core::{BasisId, CanonicalOracle, Graph, VertexId};
use pact_storage::SpasmSpace;

use crate::config::ExpandSpacePolicy;
use crate::error::PlannerError;

/// A set-partition of `V(G)`, represented as disjoint blocks. Block order
/// and element order within a block do not affect the algorithm.
type Partition = Vec<Vec<VertexId>>;

/// Enumerates every set-partition of `elems` (the Bell-number blow-up is
/// intentional -- `G` here is a small pattern/target graph, never a host).
fn enumerate_set_partitions(elems: &[VertexId]) -> Vec<Partition> {
    fn go(elems: &[VertexId], idx: usize, current: &mut Partition, out: &mut Vec<Partition>) {
        if idx == elems.len() {
            if !current.is_empty() {
                out.push(current.clone());
            }
            return;
        }
        let v = elems[idx];
        let n_blocks = current.len();
        // Place `v` into each existing block in turn...
        for b in 0..n_blocks {
            current[b].push(v);
            go(elems, idx + 1, current, out);
            current[b].pop();
        }
        // ...or start a new block with it.
        current.push(vec![v]);
        go(elems, idx + 1, current, out);
        current.pop();
    }

    if elems.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut current = Vec::new();
    go(elems, 0, &mut current, &mut out);
    out
}

/// True iff some edge of `g` has both endpoints in the same block of `rho`.
fn has_loop_in_partition(g: &Graph, rho: &Partition) -> bool {
    let mut block_of: HashMap<VertexId, usize> = HashMap::new();
    for (i, block) in rho.iter().enumerate() {
        for &v in block {
            block_of.insert(v, i);
        }
    }
    g.edges().any(|(u, v)| block_of[&u] == block_of[&v])
}

/// Forms `g / rho`: one vertex per block, one edge per distinct block-pair
/// an original edge maps onto (multi-edges collapse, the spasm space stores
/// simple graphs).
fn quotient_graph(g: &Graph, rho: &Partition) -> Graph {
    let mut block_of: HashMap<VertexId, usize> = HashMap::new();
    for (i, block) in rho.iter().enumerate() {
        for &v in block {
            block_of.insert(v, i);
        }
    }
    let mut quotient = Graph::new(g.directed());
    let new_vertices = quotient.add_n_vertices(rho.len());

    let mut seen: HashSet<(VertexId, VertexId)> = HashSet::new();
    for (u, v) in g.edges() {
        let (bu, bv) = (new_vertices[block_of[&u]], new_vertices[block_of[&v]]);
        let key = if quotient.directed() || bu <= bv { (bu, bv) } else { (bv, bu) };
        if seen.insert(key) {
            quotient.add_edge(key.0, key.1).expect("loop-free by has_loop_in_partition check");
        }
    }
    quotient
}

/// True iff `g` (directed) has some pair of vertices with edges in both directions.
fn has_bidirected_edge(g: &Graph) -> bool {
    if !g.directed() {
        return false;
    }
    let edges: HashSet<(VertexId, VertexId)> = g.edges().collect();
    edges.iter().any(|&(u, v)| u != v && edges.contains(&(v, u)))
}

fn factorial(n: usize) -> BigInt {
    (1..=n as u64).fold(BigInt::one(), |acc, k| acc * BigInt::from(k))
}

/// Builds the coefficient map `id(S) -> Q` for target graph `g` (§4.G).
///
/// `skip_bidirected` only has effect when `g` is directed.
pub fn build_hom_basis(
    g: &Graph,
    space: &mut SpasmSpace,
    oracle: &dyn CanonicalOracle,
    expand_space: ExpandSpacePolicy,
    skip_bidirected: bool,
) -> Result<BTreeMap<BasisId, BigRational>, PlannerError> {
    let vertices: Vec<VertexId> = g.vertices().collect();
    let mut partition_base: HashMap<BasisId, BigInt> = HashMap::new();

    for rho in enumerate_set_partitions(&vertices) {
        if has_loop_in_partition(g, &rho) {
            continue;
        }
        let quotient = quotient_graph(g, &rho);
        if skip_bidirected && g.directed() && has_bidirected_edge(&quotient) {
            continue;
        }

        let contribution: BigInt =
            rho.iter().fold(BigInt::one(), |acc, block| acc * factorial(block.len() - 1));

        let id = match space.find_isomorphic(&quotient, oracle) {
            Some(id) => id,
            None => match expand_space {
                ExpandSpacePolicy::Allow => space.insert(quotient),
                ExpandSpacePolicy::Forbid => {
                    return Err(PlannerError::BasisIncomplete {
                        target_id: format!("{:?}", quotient.stable_id()),
                    });
                }
            },
        };

        // A freshly-discovered quotient has no prior contribution, so this
        // entry starts at zero regardless of which branch above produced
        // `id`; `hombase_coeffs_nauty`'s `else` branch likewise just
        // assigns the current partition's contribution for a new id.
        *partition_base.entry(id).or_insert_with(BigInt::zero) += &contribution;
    }

    let automorphisms = BigInt::from(oracle.automorphism_count(g));
    let sign_exponent = vertices.len();

    let mut coefficients = BTreeMap::new();
    for (id, base) in partition_base {
        let basis_graph = space.get(id).expect("id was just looked up or inserted");
        let exponent = sign_exponent.saturating_sub(basis_graph.vertex_count());
        let sign = if exponent % 2 == 0 { BigInt::one() } else { -BigInt::one() };
        let coeff = BigRational::new(sign * base, automorphisms.clone());
        coefficients.insert(id, coeff);
    }
    Ok(coefficients)
}

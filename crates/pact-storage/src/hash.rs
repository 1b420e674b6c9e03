//! Content hashing for storage identities (§7, §4.F persistence note).
//!
//! Per-graph hashing already lives on `Graph::stable_id()` in pact-core;
//! this module only composes those hashes for the aggregates storage owns:
//! patterns (a thin wrapper) and spasm spaces (a sorted composition over
//! member graphs, so insertion order never leaks into identity).

use pact_core::{BasisId, Graph};

use crate::types::{PatternId, SpasmSpaceId};

/// Storage identity of a pattern: just its stable content hash, hex-encoded.
pub fn pattern_id(g: &Graph) -> PatternId {
    PatternId(g.stable_id().to_hex().to_string())
}

/// Storage identity of a spasm space: a blake3 hash over the sorted
/// `(id, stable_id)` pairs of every member graph. Sorting by id makes this
/// depend only on which graphs are present and under which ids, not on
/// hash-map iteration order.
pub fn spasm_space_id<'a>(members: impl Iterator<Item = (BasisId, &'a Graph)>) -> SpasmSpaceId {
    let mut pairs: Vec<(u32, String)> =
        members.map(|(id, g)| (id.0, g.stable_id().to_hex().to_string())).collect();
    pairs.sort_unstable();
    let bytes = serde_json::to_vec(&pairs).expect("pairs are always serializable");
    SpasmSpaceId(blake3::hash(&bytes).to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_graph() -> Graph {
        let mut g = Graph::new(false);
        let vs = g.add_n_vertices(2);
        g.add_edge(vs[0], vs[1]).unwrap();
        g
    }

    #[test]
    fn pattern_id_is_deterministic() {
        assert_eq!(pattern_id(&edge_graph()), pattern_id(&edge_graph()));
    }

    #[test]
    fn spasm_space_id_independent_of_iteration_order() {
        let a = edge_graph();
        let mut triangle = Graph::new(false);
        let vs = triangle.add_n_vertices(3);
        triangle.add_edge(vs[0], vs[1]).unwrap();
        triangle.add_edge(vs[1], vs[2]).unwrap();
        triangle.add_edge(vs[2], vs[0]).unwrap();

        let forward = vec![(BasisId(0), &a), (BasisId(1), &triangle)];
        let backward = vec![(BasisId(1), &triangle), (BasisId(0), &a)];
        assert_eq!(
            spasm_space_id(forward.into_iter()),
            spasm_space_id(backward.into_iter())
        );
    }
}

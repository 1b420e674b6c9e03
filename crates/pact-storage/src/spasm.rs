//! Spasm space (§3, §4.F): content-addressed registry of basis graphs,
//! indexed by `(|E|, |V|)` for fast isomorphism-candidate lookup. Invariant
//! (not re-verified on insert, preserved by callers): no two stored graphs
//! are isomorphic; ids are never reused.

use std::collections::HashMap;

use pact_core::{BasisId, CanonicalOracle, Graph};

use crate::error::StorageError;

#[derive(Debug, Clone, Default)]
pub struct SpasmSpace {
    graphs: Vec<Graph>,
    size_index: HashMap<(usize, usize), Vec<BasisId>>,
}

impl SpasmSpace {
    pub fn new() -> Self {
        SpasmSpace::default()
    }

    /// Inserts `g` under a fresh id and indexes it by `(|E|, |V|)`.
    pub fn insert(&mut self, g: Graph) -> BasisId {
        let id = BasisId(self.graphs.len() as u32);
        let key = (g.edge_count(), g.vertex_count());
        self.graphs.push(g);
        self.size_index.entry(key).or_default().push(id);
        id
    }

    pub fn get(&self, id: BasisId) -> Option<&Graph> {
        self.graphs.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BasisId, &Graph)> {
        self.graphs.iter().enumerate().map(|(i, g)| (BasisId(i as u32), g))
    }

    /// Iterates only the candidates sharing `g`'s `(|E|, |V|)` bucket.
    pub fn iter_by_size(&self, edges: usize, vertices: usize) -> impl Iterator<Item = (BasisId, &Graph)> {
        self.size_index
            .get(&(edges, vertices))
            .into_iter()
            .flatten()
            .map(move |&id| (id, self.get(id).expect("indexed id always present")))
    }

    /// Iterates graphs satisfying an arbitrary predicate, independent of
    /// the size index.
    pub fn iter_filtered<'a>(&'a self, pred: impl Fn(&Graph) -> bool + 'a) -> impl Iterator<Item = (BasisId, &'a Graph)> {
        self.iter().filter(move |(_, g)| pred(g))
    }

    /// Looks up `g` by isomorphism among same-size candidates, using the
    /// cheap degree-sequence filter before invoking the oracle (§4.A).
    pub fn find_isomorphic(&self, g: &Graph, oracle: &dyn CanonicalOracle) -> Option<BasisId> {
        self.iter_by_size(g.edge_count(), g.vertex_count())
            .find(|(_, candidate)| oracle.are_isomorphic(g, candidate))
            .map(|(id, _)| id)
    }

    /// Bulk import from graph6-encoded lines (HyperBench-style corpora,
    /// §4.F). Blank lines are skipped; malformed lines fail the whole call
    /// so a partially-imported space is never observed.
    pub fn load_graph6_lines<I: IntoIterator<Item = S>, S: AsRef<str>>(&mut self, lines: I) -> Result<Vec<BasisId>, StorageError> {
        let mut ids = Vec::new();
        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() {
                continue;
            }
            let g = Graph::from_graph6(line.as_bytes())
                .map_err(|e| StorageError::IntegrityError { reason: e.to_string() })?;
            ids.push(self.insert(g));
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pact_core::RefinementOracle;

    fn edge_graph() -> Graph {
        let mut g = Graph::new(false);
        let vs = g.add_n_vertices(2);
        g.add_edge(vs[0], vs[1]).unwrap();
        g
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let mut space = SpasmSpace::new();
        let a = space.insert(edge_graph());
        let b = space.insert(edge_graph());
        assert_eq!(a, BasisId(0));
        assert_eq!(b, BasisId(1));
        assert_eq!(space.len(), 2);
    }

    #[test]
    fn find_isomorphic_matches_same_size_structurally_equal_graph() {
        let mut space = SpasmSpace::new();
        let id = space.insert(edge_graph());
        let oracle = RefinementOracle;
        let found = space.find_isomorphic(&edge_graph(), &oracle);
        assert_eq!(found, Some(id));
    }

    #[test]
    fn find_isomorphic_misses_different_size() {
        let mut space = SpasmSpace::new();
        space.insert(edge_graph());
        let mut triangle = Graph::new(false);
        let vs = triangle.add_n_vertices(3);
        triangle.add_edge(vs[0], vs[1]).unwrap();
        triangle.add_edge(vs[1], vs[2]).unwrap();
        triangle.add_edge(vs[2], vs[0]).unwrap();
        let oracle = RefinementOracle;
        assert_eq!(space.find_isomorphic(&triangle, &oracle), None);
    }

    #[test]
    fn iter_by_size_only_yields_matching_bucket() {
        let mut space = SpasmSpace::new();
        space.insert(edge_graph());
        let mut triangle = Graph::new(false);
        let vs = triangle.add_n_vertices(3);
        triangle.add_edge(vs[0], vs[1]).unwrap();
        triangle.add_edge(vs[1], vs[2]).unwrap();
        triangle.add_edge(vs[2], vs[0]).unwrap();
        space.insert(triangle);
        assert_eq!(space.iter_by_size(1, 2).count(), 1);
        assert_eq!(space.iter_by_size(3, 3).count(), 1);
        assert_eq!(space.iter_by_size(2, 2).count(), 0);
    }
}

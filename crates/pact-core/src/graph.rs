//! The [`Graph`] type: pattern, host, and basis graphs share one representation.
//!
//! Graphs here are small (patterns rarely exceed a dozen vertices; basis
//! graphs are quotients of patterns) and are always rebuilt wholesale rather
//! than diffed in place, so vertex identity is a plain dense index rather than
//! a stable-across-edits handle. `directed` is fixed at construction and never
//! inferred.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::CoreError;
use crate::id::VertexId;

/// Lazily computed, cached structural flags used as fast-path triggers and
/// cache keys (§3). They never replace a correctness check -- a positive flag
/// only ever unlocks a fast path whose result is also derivable by the slow
/// path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShapeFlags {
    pub is_star: Option<u32>,
    pub is_cycle: bool,
    pub is_small_complete_bipartite: Option<(u32, u32)>,
    pub is_clique_on_n: Option<u32>,
}

#[derive(Debug, Clone, Default)]
struct GraphCache {
    stable_id: Option<blake3::Hash>,
    shape: Option<ShapeFlags>,
    automorphisms: Option<u64>,
}

/// An attributed graph: vertex set, edge list, optional per-vertex label
/// tokens, directed or undirected (fixed). Self-loops are never inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    directed: bool,
    vertex_labels: Vec<SmallVec<[String; 2]>>,
    /// Edges as inserted. For undirected graphs each edge is stored exactly
    /// once; callers asking for neighbors/degree get the symmetric view.
    edges: Vec<(VertexId, VertexId)>,
    #[serde(skip)]
    cache: RefCell<GraphCache>,
}

impl Graph {
    pub fn new(directed: bool) -> Self {
        Graph {
            directed,
            vertex_labels: Vec::new(),
            edges: Vec::new(),
            cache: RefCell::new(GraphCache::default()),
        }
    }

    pub fn directed(&self) -> bool {
        self.directed
    }

    /// Adds a fresh vertex with no labels and returns its id.
    pub fn add_vertex(&mut self) -> VertexId {
        let id = VertexId(self.vertex_labels.len() as u32);
        self.vertex_labels.push(SmallVec::new());
        self.invalidate_cache();
        id
    }

    pub fn add_n_vertices(&mut self, n: usize) -> Vec<VertexId> {
        (0..n).map(|_| self.add_vertex()).collect()
    }

    /// Adds an edge. Rejects self-loops (forbidden in hosts and basis graphs, §3).
    pub fn add_edge(&mut self, u: VertexId, v: VertexId) -> Result<(), CoreError> {
        if u == v {
            return Err(CoreError::GraphInconsistency {
                reason: format!("self-loop at vertex {u} is not permitted"),
            });
        }
        self.require_vertex(u)?;
        self.require_vertex(v)?;
        self.edges.push((u, v));
        self.invalidate_cache();
        Ok(())
    }

    pub fn add_label(&mut self, v: VertexId, label: impl Into<String>) -> Result<(), CoreError> {
        self.require_vertex(v)?;
        self.vertex_labels[v.0 as usize].push(label.into());
        self.invalidate_cache();
        Ok(())
    }

    pub fn labels(&self, v: VertexId) -> &[String] {
        &self.vertex_labels[v.0 as usize]
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_labels.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertex_labels.len() as u32).map(VertexId)
    }

    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.edges.iter().copied()
    }

    pub fn has_vertex(&self, v: VertexId) -> bool {
        (v.0 as usize) < self.vertex_labels.len()
    }

    fn require_vertex(&self, v: VertexId) -> Result<(), CoreError> {
        if self.has_vertex(v) {
            Ok(())
        } else {
            Err(CoreError::VertexNotFound { id: v })
        }
    }

    /// Neighbors reachable by a single edge, symmetric for undirected graphs.
    pub fn neighbors(&self, v: VertexId) -> Vec<VertexId> {
        let mut out = Vec::new();
        for &(a, b) in &self.edges {
            if a == v {
                out.push(b);
            } else if !self.directed && b == v {
                out.push(a);
            }
        }
        out
    }

    /// Total degree. For directed graphs this is in-degree + out-degree.
    pub fn degree(&self, v: VertexId) -> usize {
        self.edges
            .iter()
            .filter(|&&(a, b)| a == v || b == v)
            .count()
    }

    pub fn out_degree(&self, v: VertexId) -> usize {
        self.edges.iter().filter(|&&(a, _)| a == v).count()
    }

    pub fn in_degree(&self, v: VertexId) -> usize {
        self.edges.iter().filter(|&&(_, b)| b == v).count()
    }

    /// Sorted (descending) degree sequence, the cheap isomorphism pre-filter's input.
    pub fn degree_sequence(&self) -> Vec<usize> {
        let mut seq: Vec<usize> = self.vertices().map(|v| self.degree(v)).collect();
        seq.sort_unstable_by(|a, b| b.cmp(a));
        seq
    }

    /// Number of weakly-connected components of the primal (undirected-view) graph.
    pub fn component_count(&self) -> usize {
        let n = self.vertex_count();
        if n == 0 {
            return 0;
        }
        let mut parent: Vec<usize> = (0..n).collect();
        fn find(parent: &mut [usize], x: usize) -> usize {
            if parent[x] != x {
                parent[x] = find(parent, parent[x]);
            }
            parent[x]
        }
        for &(a, b) in &self.edges {
            let (ra, rb) = (find(&mut parent, a.0 as usize), find(&mut parent, b.0 as usize));
            if ra != rb {
                parent[ra] = rb;
            }
        }
        let mut roots: Vec<usize> = (0..n).map(|i| find(&mut parent, i)).collect();
        roots.sort_unstable();
        roots.dedup();
        roots.len()
    }

    pub fn is_connected(&self) -> bool {
        self.component_count() <= 1
    }

    /// Content-free stable identity: a blake3 hash over the directed flag,
    /// sorted edge list, and sorted per-vertex label sets. Two structurally
    /// identical graphs compare equal regardless of construction history.
    pub fn stable_id(&self) -> blake3::Hash {
        if let Some(id) = self.cache.borrow().stable_id {
            return id;
        }
        let mut sorted_edges: Vec<(u32, u32)> =
            self.edges.iter().map(|(a, b)| (a.0, b.0)).collect();
        if !self.directed {
            for e in sorted_edges.iter_mut() {
                if e.0 > e.1 {
                    std::mem::swap(&mut e.0, &mut e.1);
                }
            }
        }
        sorted_edges.sort_unstable();

        let mut sorted_labels: Vec<Vec<String>> = self
            .vertex_labels
            .iter()
            .map(|ls| {
                let mut v: Vec<String> = ls.iter().cloned().collect();
                v.sort();
                v
            })
            .collect();
        // Label sets are per-vertex but vertex identity is not meant to
        // leak into the content hash beyond ordering, so the multiset of
        // label-set values is hashed rather than the index->labels map.
        sorted_labels.sort();

        let payload = (self.directed, self.vertex_count(), sorted_edges, sorted_labels);
        let bytes = serde_json::to_vec(&payload).expect("payload is always serializable");
        let hash = blake3::hash(&bytes);
        self.cache.borrow_mut().stable_id = Some(hash);
        hash
    }

    pub fn cached_automorphisms(&self) -> Option<u64> {
        self.cache.borrow().automorphisms
    }

    pub fn set_cached_automorphisms(&self, count: u64) {
        self.cache.borrow_mut().automorphisms = Some(count);
    }

    pub fn shape_flags(&self) -> ShapeFlags {
        if let Some(shape) = self.cache.borrow().shape {
            return shape;
        }
        let shape = self.compute_shape_flags();
        self.cache.borrow_mut().shape = Some(shape);
        shape
    }

    fn compute_shape_flags(&self) -> ShapeFlags {
        ShapeFlags {
            is_star: self.detect_star(),
            is_cycle: self.detect_cycle(),
            is_small_complete_bipartite: self.detect_complete_bipartite(),
            is_clique_on_n: self.detect_clique(),
        }
    }

    /// An undirected star has one center of degree n-1 and n-1 leaves of degree 1.
    fn detect_star(&self) -> Option<u32> {
        if self.directed || self.vertex_count() < 2 {
            return None;
        }
        let n = self.vertex_count();
        let center = self.vertices().find(|&v| self.degree(v) == n - 1)?;
        let leaves_ok = self
            .vertices()
            .filter(|&v| v != center)
            .all(|v| self.degree(v) == 1);
        if leaves_ok && self.edge_count() == n - 1 {
            Some((n - 1) as u32)
        } else {
            None
        }
    }

    fn detect_cycle(&self) -> bool {
        if self.directed {
            return false;
        }
        let n = self.vertex_count();
        n >= 3
            && self.edge_count() == n
            && self.vertices().all(|v| self.degree(v) == 2)
            && self.is_connected()
    }

    fn detect_complete_bipartite(&self) -> Option<(u32, u32)> {
        if self.directed || self.vertex_count() > 8 || self.vertex_count() == 0 {
            return None;
        }
        let n = self.vertex_count();
        let mut color: Vec<Option<bool>> = vec![None; n];
        color[0] = Some(false);
        let mut queue = vec![VertexId(0)];
        while let Some(v) = queue.pop() {
            let cv = color[v.0 as usize].unwrap();
            for u in self.neighbors(v) {
                match color[u.0 as usize] {
                    None => {
                        color[u.0 as usize] = Some(!cv);
                        queue.push(u);
                    }
                    Some(cu) if cu == cv => return None,
                    _ => {}
                }
            }
        }
        if color.iter().any(|c| c.is_none()) {
            return None; // disconnected: not a (connected) complete bipartite graph
        }
        let a = color.iter().filter(|c| **c == Some(false)).count();
        let b = n - a;
        if a > 0 && b > 0 && self.edge_count() == a * b {
            Some((a as u32, b as u32))
        } else {
            None
        }
    }

    fn detect_clique(&self) -> Option<u32> {
        if self.directed {
            return None;
        }
        let n = self.vertex_count();
        if n < 1 {
            return None;
        }
        let expected = n * n.saturating_sub(1) / 2;
        if self.edge_count() == expected && self.vertices().all(|v| self.degree(v) == n - 1) {
            Some(n as u32)
        } else {
            None
        }
    }

    fn invalidate_cache(&mut self) {
        self.cache = RefCell::new(GraphCache::default());
    }
}

//! Hypergraph and tree-decomposition node model (§3, §4.B).
//!
//! PACT's hyperedges are always binary (they are pattern edges viewed as
//! hyperedges), so `Hypergraph` stores `(VertexId, VertexId)` pairs keyed by
//! a stable [`EdgeName`] rather than arbitrary-arity vertex sets. The primal
//! graph of such a hypergraph coincides with the pair-graph itself.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::id::{EdgeName, VertexId};

/// A hypergraph over binary hyperedges, keyed by stable name and iterated in
/// insertion order (join-tree root selection and cover refinement both rely
/// on "first inserted" semantics, see §4.C/§4.D).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hypergraph {
    directed: bool,
    edges: IndexMap<EdgeName, (VertexId, VertexId)>,
}

impl Hypergraph {
    pub fn new(directed: bool) -> Self {
        Hypergraph { directed, edges: IndexMap::new() }
    }

    /// Builds the hyperedge-per-edge hypergraph of a pattern, naming edges
    /// `E_0, E_1, …` in edge-insertion order (`hypergraph.py::Hypergraph.__init__`).
    pub fn from_graph(g: &Graph) -> Self {
        let mut hg = Hypergraph::new(g.directed());
        for (i, (u, v)) in g.edges().enumerate() {
            hg.add_edge(EdgeName::new(i), u, v);
        }
        hg
    }

    pub fn directed(&self) -> bool {
        self.directed
    }

    pub fn add_edge(&mut self, name: EdgeName, u: VertexId, v: VertexId) {
        self.edges.insert(name, (u, v));
    }

    pub fn remove_edge(&mut self, name: &EdgeName) -> Option<(VertexId, VertexId)> {
        self.edges.shift_remove(name)
    }

    pub fn edge(&self, name: &EdgeName) -> Option<(VertexId, VertexId)> {
        self.edges.get(name).copied()
    }

    pub fn edge_names(&self) -> impl Iterator<Item = &EdgeName> {
        self.edges.keys()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&EdgeName, &(VertexId, VertexId))> {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Vertex set: the union of all edge endpoints.
    pub fn vertices(&self) -> HashSet<VertexId> {
        let mut vs = HashSet::new();
        for &(u, v) in self.edges.values() {
            vs.insert(u);
            vs.insert(v);
        }
        vs
    }

    /// Degree map: number of incident hyperedges per vertex (`hypergraph.py::degrees`).
    pub fn degrees(&self) -> HashMap<VertexId, usize> {
        let mut deg = HashMap::new();
        for &(u, v) in self.edges.values() {
            *deg.entry(u).or_insert(0) += 1;
            *deg.entry(v).or_insert(0) += 1;
        }
        deg
    }

    /// Sub-hypergraph induced by a vertex set: edges whose both endpoints survive.
    pub fn vertex_induced_subgraph(&self, keep: &HashSet<VertexId>) -> Hypergraph {
        let mut hg = Hypergraph::new(self.directed);
        for (name, &(u, v)) in self.edges.iter() {
            if keep.contains(&u) && keep.contains(&v) {
                hg.add_edge(name.clone(), u, v);
            }
        }
        hg
    }

    /// Sub-hypergraph induced by a set of edge names.
    pub fn edge_induced_subgraph(&self, names: &HashSet<EdgeName>) -> Hypergraph {
        let mut hg = Hypergraph::new(self.directed);
        for (name, &(u, v)) in self.edges.iter() {
            if names.contains(name) {
                hg.add_edge(name.clone(), u, v);
            }
        }
        hg
    }

    /// Materializes the primal graph: same vertices, an edge between any two
    /// vertices that co-occur in some hyperedge (here, just the pair graph).
    pub fn primal_graph(&self) -> Graph {
        let mut g = Graph::new(self.directed);
        let mut index_of: HashMap<VertexId, VertexId> = HashMap::new();
        let mut verts: Vec<VertexId> = self.vertices().into_iter().collect();
        verts.sort();
        for v in &verts {
            let new_id = g.add_vertex();
            index_of.insert(*v, new_id);
        }
        for &(u, v) in self.edges.values() {
            let _ = g.add_edge(index_of[&u], index_of[&v]);
        }
        g
    }

    /// True iff the primal graph of this hypergraph is connected (weakly, if directed).
    pub fn is_connected(&self) -> bool {
        self.primal_graph().is_connected()
    }

    /// Connected components of the primal graph after removing `separator`
    /// vertices, each returned as the induced sub-hypergraph on
    /// `component ∪ separator` restricted to edges not wholly inside the
    /// separator (`hypergraph.py::separate`/`separation_subg`).
    pub fn components_after_removing(&self, separator: &HashSet<VertexId>) -> Vec<Hypergraph> {
        let remaining: HashSet<VertexId> =
            self.vertices().into_iter().filter(|v| !separator.contains(v)).collect();

        let mut parent: HashMap<VertexId, VertexId> =
            remaining.iter().map(|&v| (v, v)).collect();
        fn find(parent: &mut HashMap<VertexId, VertexId>, x: VertexId) -> VertexId {
            let p = parent[&x];
            if p != x {
                let r = find(parent, p);
                parent.insert(x, r);
                r
            } else {
                x
            }
        }
        for &(u, v) in self.edges.values() {
            if remaining.contains(&u) && remaining.contains(&v) {
                let (ru, rv) = (find(&mut parent, u), find(&mut parent, v));
                if ru != rv {
                    parent.insert(ru, rv);
                }
            }
        }

        let mut groups: HashMap<VertexId, HashSet<VertexId>> = HashMap::new();
        for &v in &remaining {
            let root = find(&mut parent, v);
            groups.entry(root).or_default().insert(v);
        }

        groups
            .into_values()
            .map(|component| {
                let cover = component.union(separator).copied().collect::<HashSet<_>>();
                let mut hg = Hypergraph::new(self.directed);
                for (name, &(u, v)) in self.edges.iter() {
                    let both_in_cover = cover.contains(&u) && cover.contains(&v);
                    let both_in_separator = separator.contains(&u) && separator.contains(&v);
                    if both_in_cover && !both_in_separator {
                        hg.add_edge(name.clone(), u, v);
                    }
                }
                hg
            })
            .collect()
    }
}

/// A node of a rooted hypertree decomposition (§3).
///
/// `con_cover` starts absent; a cover is connected-by-construction until the
/// refiner (§4.D) runs, at which point `con_cover` is always populated
/// (`effective_cover` falls back to `cover` before that point).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TdNode {
    pub bag: HashSet<VertexId>,
    pub cover: IndexMap<EdgeName, (VertexId, VertexId)>,
    pub con_cover: Option<IndexMap<EdgeName, (VertexId, VertexId)>>,
    pub children: Vec<TdNode>,
}

impl TdNode {
    pub fn new(bag: HashSet<VertexId>, cover: IndexMap<EdgeName, (VertexId, VertexId)>) -> Self {
        TdNode { bag, cover, con_cover: None, children: Vec::new() }
    }

    /// `con_cover` if refined, else `cover` (a singleton/trivially-connected cover).
    pub fn effective_cover(&self) -> &IndexMap<EdgeName, (VertexId, VertexId)> {
        self.con_cover.as_ref().unwrap_or(&self.cover)
    }

    pub fn set_connected_cover(&mut self, con_cover: IndexMap<EdgeName, (VertexId, VertexId)>) {
        self.con_cover = Some(con_cover);
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Generalized hypertree width: max cover size over this subtree.
    pub fn ghw(&self) -> usize {
        self.bfs_iter().map(|n| n.cover.len()).max().unwrap_or(0)
    }

    /// Tree width: max `|bag| - 1` over this subtree.
    pub fn tw(&self) -> usize {
        self.bfs_iter().map(|n| n.bag.len().saturating_sub(1)).max().unwrap_or(0)
    }

    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(TdNode::depth).max().unwrap_or(0)
    }

    /// Breadth-first iteration order over this subtree, root first.
    pub fn bfs_iter(&self) -> BfsIter<'_> {
        BfsIter { frontier: VecDeque::from([self]) }
    }
}

pub struct BfsIter<'a> {
    frontier: VecDeque<&'a TdNode>,
}

impl<'a> Iterator for BfsIter<'a> {
    type Item = &'a TdNode;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.frontier.pop_front()?;
        for c in &n.children {
            self.frontier.push_back(c);
        }
        Some(n)
    }
}

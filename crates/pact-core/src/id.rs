//! Stable ID newtypes for graph and hypergraph entities.
//!
//! Vertex identity is a plain index (graphs here are small and rebuilt
//! wholesale, never diffed in place), but edge names and spasm-space ids are
//! distinct newtypes so that a `BasisId` cannot be accidentally used where a
//! `VertexId` is expected.

use std::fmt;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// A vertex of a pattern, host, or basis graph. Maps to a petgraph `NodeIndex<u32>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub u32);

/// A stable hyperedge name, drawn from the disjoint name space `E_0, E_1, …`.
///
/// Stored as an owned string rather than an index because plan compilation
/// (§4.E) mints new relation names derived from edge names (e.g. per-label
/// semijoin inputs) and those derived names must remain legible in persisted
/// plans and in `SolverProtocolError` diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeName(pub String);

/// Identity of a graph stored in a [`crate::spasm::SpasmSpace`].
///
/// Assigned on insertion; never reused even if the owning graph is later
/// considered unreachable (the space is append-only, see §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BasisId(pub u32);

/// Identity of a tree-decomposition node, assigned in pre-order (§4.E naming rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TdNodeId(pub u32);

impl EdgeName {
    pub fn new(index: usize) -> Self {
        EdgeName(format!("E_{index}"))
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EdgeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for BasisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TdNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node${}", self.0)
    }
}

// Bridge between VertexId and petgraph's NodeIndex<u32>.

impl From<NodeIndex<u32>> for VertexId {
    fn from(idx: NodeIndex<u32>) -> Self {
        VertexId(idx.index() as u32)
    }
}

impl From<VertexId> for NodeIndex<u32> {
    fn from(id: VertexId) -> Self {
        NodeIndex::new(id.0 as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_id_to_node_index_roundtrip() {
        let idx = NodeIndex::<u32>::new(7);
        let v = VertexId::from(idx);
        assert_eq!(v.0, 7);
        let back: NodeIndex<u32> = v.into();
        assert_eq!(back.index(), 7);
    }

    #[test]
    fn edge_name_new_follows_naming_rule() {
        assert_eq!(EdgeName::new(0).0, "E_0");
        assert_eq!(EdgeName::new(12).0, "E_12");
    }

    #[test]
    fn td_node_id_display() {
        assert_eq!(format!("{}", TdNodeId(3)), "node$3");
    }

    #[test]
    fn ids_are_distinct_types_with_equal_inner_values() {
        let v = VertexId(1);
        let b = BasisId(1);
        assert_eq!(v.0, b.0);
    }

    #[test]
    fn serde_roundtrip() {
        let name = EdgeName::new(4);
        let json = serde_json::to_string(&name).unwrap();
        let back: EdgeName = serde_json::from_str(&json).unwrap();
        assert_eq!(name, back);
    }
}

//! The six-op relational IR consumed by the executor (§3, §4.I).
//!
//! Each operation names its own output relation plus up to two input
//! relation names. The compiler guarantees topological ordering: every input
//! name is produced before it is read (§5).

use std::collections::BTreeSet;

use pact_core::{EdgeName, VertexId};

/// Name of a relation inside one plan's execution state. Distinct from
/// [`EdgeName`] even though edge relations are frequently named after their
/// hyperedge, because plan compilation also mints derived names (label
/// semijoin inputs, `node$i` relations).
pub type RelName = String;

pub const BASE_RELATION: &str = "_edge_base";
pub const LABEL_RELATION_PREFIX: &str = "_vlabel_base_";

/// A tagged sum type over the six relational primitives (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Renames `input`'s columns per `column_map` (old -> new), writing `output`.
    Rename { output: RelName, input: RelName, column_map: Vec<(String, String)> },
    /// Inner-joins `left` and `right` on the shared attribute `key`.
    Join { output: RelName, left: RelName, right: RelName, key: BTreeSet<String> },
    /// Restricts `left` to tuples whose `key` projection appears in `right`;
    /// `left`'s count column survives, `right`'s is discarded.
    Semijoin { output: RelName, left: RelName, right: RelName, key: BTreeSet<String> },
    /// Groups `input` by `key`, keeping the max count per group (dedup, §4.E).
    Project { output: RelName, input: RelName, key: BTreeSet<String> },
    /// Groups `input` by `key`, summing counts into a single `count` column.
    CountExt { output: RelName, input: RelName, key: BTreeSet<String> },
    /// Inner-joins `left` and `right` (the latter must carry a `COUNT_EXT`
    /// output) on `key`, multiplying counts.
    SumCount { output: RelName, left: RelName, right: RelName, key: BTreeSet<String> },
}

impl Op {
    pub fn output(&self) -> &str {
        match self {
            Op::Rename { output, .. }
            | Op::Join { output, .. }
            | Op::Semijoin { output, .. }
            | Op::Project { output, .. }
            | Op::CountExt { output, .. }
            | Op::SumCount { output, .. } => output,
        }
    }
}

/// Builds the `RENAME(base -> en; s -> u, t -> v)` operation for a cover edge
/// (`planner.py::rename_op`). Directed hosts interpret `(u, v)` as
/// `(source, target)`.
pub fn rename_edge_op(edge_name: &EdgeName, u: VertexId, v: VertexId) -> Op {
    Op::Rename {
        output: edge_name.0.clone(),
        input: BASE_RELATION.to_string(),
        column_map: vec![("s".to_string(), u.to_string()), ("t".to_string(), v.to_string())],
    }
}

/// The per-label semijoin rename: copies the label relation under a
/// per-edge-vertex name so it can be semijoined into the edge relation.
pub fn rename_label_op(label: &str, vertex: VertexId, edge_rel: &str) -> Op {
    Op::Rename {
        output: format!("{LABEL_RELATION_PREFIX}{label}@{edge_rel}"),
        input: format!("{LABEL_RELATION_PREFIX}{label}"),
        column_map: vec![("vertex".to_string(), vertex.to_string())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_edge_op_maps_s_and_t() {
        let op = rename_edge_op(&EdgeName::new(0), VertexId(3), VertexId(4));
        match op {
            Op::Rename { output, input, column_map } => {
                assert_eq!(output, "E_0");
                assert_eq!(input, BASE_RELATION);
                assert_eq!(column_map, vec![("s".into(), "3".into()), ("t".into(), "4".into())]);
            }
            _ => panic!("expected Rename"),
        }
    }

    #[test]
    fn op_output_accessor_covers_all_variants() {
        let key: BTreeSet<String> = BTreeSet::new();
        let ops = vec![
            Op::Rename { output: "a".into(), input: "b".into(), column_map: vec![] },
            Op::Join { output: "a".into(), left: "b".into(), right: "c".into(), key: key.clone() },
            Op::Semijoin { output: "a".into(), left: "b".into(), right: "c".into(), key: key.clone() },
            Op::Project { output: "a".into(), input: "b".into(), key: key.clone() },
            Op::CountExt { output: "a".into(), input: "b".into(), key: key.clone() },
            Op::SumCount { output: "a".into(), left: "b".into(), right: "c".into(), key },
        ];
        for op in ops {
            assert_eq!(op.output(), "a");
        }
    }
}

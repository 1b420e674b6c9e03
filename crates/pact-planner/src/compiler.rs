//! Plan compiler (§4.E): walks a refined decomposition and emits an ordered
//! [`Op`] sequence such that running it over a host yields, in relation
//! `node$0`, one tuple per binding of the root's bag carrying its count of
//! homomorphic extensions into the whole pattern.

use std::collections::{BTreeSet, HashSet};

use pact_core::{EdgeName, Graph, TdNode, VertexId};

use crate::config::PactConfig;
use crate::error::PlannerError;
use crate::multiplicity::Multiplicity;
use crate::ops::{rename_edge_op, rename_label_op, Op, LABEL_RELATION_PREFIX};

struct ChildInfo {
    bag: HashSet<VertexId>,
    is_leaf: bool,
    relation: String,
}

fn fresh_name(node_id: usize, counter: &mut usize) -> String {
    let name = format!("node${node_id}$t{counter}");
    *counter += 1;
    name
}

fn rename_last_op_output(ops: &mut [Op], to: &str) {
    if let Some(last) = ops.last_mut() {
        match last {
            Op::Rename { output, .. }
            | Op::Join { output, .. }
            | Op::Semijoin { output, .. }
            | Op::Project { output, .. }
            | Op::CountExt { output, .. }
            | Op::SumCount { output, .. } => *output = to.to_string(),
        }
    }
}

fn vertex_set_to_columns(vs: &HashSet<VertexId>) -> BTreeSet<String> {
    vs.iter().map(|v| v.to_string()).collect()
}

/// Compiles `root` into an op sequence against `pattern` (needed for vertex
/// labels) under `config`'s early-semijoin toggle. Returns the ops and the
/// name of the root's final relation (always `node$0`).
pub fn compile_plan(root: &TdNode, pattern: &Graph, config: &PactConfig) -> Result<(Vec<Op>, String), PlannerError> {
    let mut ops = Vec::new();
    let mut temp_counter = 0usize;
    let mut next_id = 0usize;
    let info = compile_node(root, pattern, config, &mut ops, &mut temp_counter, &mut next_id)?;
    Ok((ops, info.relation))
}

fn compile_node(
    node: &TdNode,
    pattern: &Graph,
    config: &PactConfig,
    ops: &mut Vec<Op>,
    temp_counter: &mut usize,
    next_id: &mut usize,
) -> Result<ChildInfo, PlannerError> {
    let node_id = *next_id;
    *next_id += 1;

    let mut children_info = Vec::new();
    for child in &node.children {
        children_info.push(compile_node(child, pattern, config, ops, temp_counter, next_id)?);
    }

    let cover: Vec<(EdgeName, (VertexId, VertexId))> = node.effective_cover().iter().map(|(n, &e)| (n.clone(), e)).collect();
    if cover.is_empty() {
        return Err(PlannerError::NoDecomposition { pattern_id: "<empty-cover-node>".to_string() });
    }

    // Steps 1-2: RENAME each cover edge, then restrict by vertex label
    // (SEMIJOIN against a renamed per-vertex label relation) if the pattern
    // has any labels on that edge's endpoints.
    let mut edge_relations: Vec<(String, BTreeSet<String>)> = Vec::new();
    for (name, (u, v)) in &cover {
        ops.push(rename_edge_op(name, *u, *v));
        let columns: BTreeSet<String> = [u.to_string(), v.to_string()].into_iter().collect();
        let mut rel_name = name.0.clone();

        for &vertex in &[*u, *v] {
            for label in pattern.labels(vertex) {
                ops.push(rename_label_op(label, vertex, &rel_name));
                let renamed_label_rel = format!("{LABEL_RELATION_PREFIX}{label}@{rel_name}");
                let sj_out = fresh_name(node_id, temp_counter);
                ops.push(Op::Semijoin {
                    output: sj_out.clone(),
                    left: rel_name.clone(),
                    right: renamed_label_rel,
                    key: [vertex.to_string()].into_iter().collect(),
                });
                rel_name = sj_out;
            }
        }
        edge_relations.push((rel_name, columns));
    }

    let bag_cols = vertex_set_to_columns(&node.bag);
    let mut consumed: HashSet<String> = HashSet::new();

    let node_rel = if edge_relations.len() == 1 {
        let (name, _) = edge_relations.into_iter().next().unwrap();
        let target = format!("node${node_id}");
        if name == target {
            target
        } else {
            // The sole cover edge's RENAME becomes the node relation
            // directly (no JOIN is needed, §4.E step 3 case 1).
            rename_last_op_output(ops, &target);
            target
        }
    } else if edge_relations.len() == 2 {
        let (name_a, cols_a) = &edge_relations[0];
        let (name_b, cols_b) = &edge_relations[1];
        let key: BTreeSet<String> = cols_a.intersection(cols_b).cloned().collect();
        let join_out = fresh_name(node_id, temp_counter);
        ops.push(Op::Join { output: join_out.clone(), left: name_a.clone(), right: name_b.clone(), key });
        let final_name = format!("node${node_id}");
        ops.push(Op::Project { output: final_name.clone(), input: join_out, key: bag_cols.clone() });
        final_name
    } else {
        let mut remaining = edge_relations;
        let (mut acc_name, mut acc_cols) = remaining.remove(0);
        while !remaining.is_empty() {
            let idx = remaining
                .iter()
                .position(|(_, cols)| !cols.is_disjoint(&acc_cols))
                .ok_or_else(|| PlannerError::NoDecomposition { pattern_id: "<no-join-path>".to_string() })?;
            let (next_name, next_cols) = remaining.remove(idx);
            let key: BTreeSet<String> = acc_cols.intersection(&next_cols).cloned().collect();
            let out = fresh_name(node_id, temp_counter);
            ops.push(Op::Join { output: out.clone(), left: acc_name.clone(), right: next_name.clone(), key });
            acc_cols = acc_cols.union(&next_cols).cloned().collect();
            acc_name = out;

            if config.early_semijoin {
                for child in &children_info {
                    if consumed.contains(&child.relation) {
                        continue;
                    }
                    if child.is_leaf && child.bag.iter().all(|v| acc_cols.contains(&v.to_string())) {
                        let key2 = vertex_set_to_columns(&child.bag);
                        let sj_out = fresh_name(node_id, temp_counter);
                        ops.push(Op::Semijoin { output: sj_out.clone(), left: acc_name.clone(), right: child.relation.clone(), key: key2 });
                        acc_name = sj_out;
                        consumed.insert(child.relation.clone());
                    }
                }
            }
        }
        let final_name = format!("node${node_id}");
        ops.push(Op::Project { output: final_name.clone(), input: acc_name, key: bag_cols.clone() });
        final_name
    };

    // Step 5: fold in each remaining child.
    let mut current = node_rel;
    for child in &children_info {
        if consumed.contains(&child.relation) {
            continue;
        }
        if child.is_leaf && child.bag.is_subset(&node.bag) {
            let out = fresh_name(node_id, temp_counter);
            ops.push(Op::Semijoin {
                output: out.clone(),
                left: current.clone(),
                right: child.relation.clone(),
                key: vertex_set_to_columns(&child.bag),
            });
            current = out;
        } else {
            let key: HashSet<VertexId> = node.bag.intersection(&child.bag).copied().collect();
            let key_cols = vertex_set_to_columns(&key);
            let ext_out = fresh_name(node_id, temp_counter);
            ops.push(Op::CountExt { output: ext_out.clone(), input: child.relation.clone(), key: key_cols.clone() });
            let sc_out = fresh_name(node_id, temp_counter);
            ops.push(Op::SumCount { output: sc_out.clone(), left: current.clone(), right: ext_out, key: key_cols });
            current = sc_out;
        }
    }

    let final_name = format!("node${node_id}");
    if current != final_name {
        rename_last_op_output(ops, &final_name);
        current = final_name;
    }

    Ok(ChildInfo { bag: node.bag.clone(), is_leaf: node.is_leaf(), relation: current })
}

/// §4.E fast path: for an undirected star with center degree `k`, the
/// homomorphism count into `host` is `Σ_v deg_host(v)^k`, with no plan
/// execution at all.
pub fn star_fast_path_count(pattern: &Graph, host: &Graph) -> Option<Multiplicity> {
    if pattern.directed() || host.directed() {
        return None;
    }
    let k = pattern.shape_flags().is_star?;
    let total: u128 = host.vertices().map(|v| (host.degree(v) as u128).pow(k)).sum();
    Some(if total <= i64::MAX as u128 {
        Multiplicity::Small(total as i64)
    } else {
        Multiplicity::Big(num_bigint::BigInt::from(total))
    })
}

/// §4.E fast path: for an undirected clique on `n` vertices, restrict the
/// host to vertices of degree `>= n - 1` before the normal plan runs.
pub fn clique_fast_path_prefilter(pattern: &Graph, host: &Graph) -> Option<Graph> {
    if pattern.directed() || host.directed() {
        return None;
    }
    let n = pattern.shape_flags().is_clique_on_n?;
    if n < 3 {
        return None;
    }
    let keep: HashSet<VertexId> = host.vertices().filter(|&v| host.degree(v) as u32 >= n - 1).collect();

    let mut filtered = Graph::new(false);
    let mut reindex = std::collections::HashMap::new();
    let mut sorted_keep: Vec<VertexId> = keep.iter().copied().collect();
    sorted_keep.sort();
    for v in sorted_keep {
        reindex.insert(v, filtered.add_vertex());
    }
    for (u, v) in host.edges() {
        if keep.contains(&u) && keep.contains(&v) {
            let _ = filtered.add_edge(reindex[&u], reindex[&v]);
        }
    }
    Some(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn triangle_pattern() -> (Graph, TdNode) {
        let mut g = Graph::new(false);
        let vs = g.add_n_vertices(3);
        g.add_edge(vs[0], vs[1]).unwrap();
        g.add_edge(vs[1], vs[2]).unwrap();
        g.add_edge(vs[2], vs[0]).unwrap();

        let mut cover = IndexMap::new();
        cover.insert(EdgeName::new(0), (vs[0], vs[1]));
        cover.insert(EdgeName::new(1), (vs[1], vs[2]));
        cover.insert(EdgeName::new(2), (vs[2], vs[0]));
        let bag: HashSet<VertexId> = vs.iter().copied().collect();
        let mut node = TdNode::new(bag, cover.clone());
        node.set_connected_cover(cover);
        (g, node)
    }

    fn path_pattern() -> (Graph, TdNode) {
        let mut g = Graph::new(false);
        let vs = g.add_n_vertices(3);
        g.add_edge(vs[0], vs[1]).unwrap();
        g.add_edge(vs[1], vs[2]).unwrap();

        let mut leaf_cover = IndexMap::new();
        leaf_cover.insert(EdgeName::new(1), (vs[1], vs[2]));
        let leaf_bag: HashSet<VertexId> = [vs[1], vs[2]].into_iter().collect();
        let mut leaf = TdNode::new(leaf_bag, leaf_cover.clone());
        leaf.set_connected_cover(leaf_cover);

        let mut root_cover = IndexMap::new();
        root_cover.insert(EdgeName::new(0), (vs[0], vs[1]));
        let root_bag: HashSet<VertexId> = [vs[0], vs[1]].into_iter().collect();
        let mut root = TdNode::new(root_bag, root_cover.clone());
        root.set_connected_cover(root_cover);
        root.children.push(leaf);
        (g, root)
    }

    #[test]
    fn single_edge_node_needs_no_join() {
        let (g, root) = path_pattern();
        let config = PactConfig::default();
        let (ops, final_rel) = compile_plan(&root, &g, &config).unwrap();
        assert_eq!(final_rel, "node$0");
        // The child's bag isn't a subset of the root's, so it's folded in
        // via COUNT_EXT + SUM_COUNT rather than a SEMIJOIN.
        assert!(ops.iter().any(|op| matches!(op, Op::CountExt { .. })));
        assert!(ops.iter().any(|op| matches!(op, Op::SumCount { .. })));
    }

    #[test]
    fn three_edge_cover_builds_join_path_then_projects() {
        let (g, node) = triangle_pattern();
        let config = PactConfig::default();
        let (ops, final_rel) = compile_plan(&node, &g, &config).unwrap();
        assert_eq!(final_rel, "node$0");
        let join_count = ops.iter().filter(|op| matches!(op, Op::Join { .. })).count();
        assert_eq!(join_count, 2);
        assert!(matches!(ops.last(), Some(Op::Project { .. })));
    }

    #[test]
    fn star_fast_path_matches_sum_of_degree_powers() {
        let mut pattern = Graph::new(false);
        let vs = pattern.add_n_vertices(4);
        pattern.add_edge(vs[0], vs[1]).unwrap();
        pattern.add_edge(vs[0], vs[2]).unwrap();
        pattern.add_edge(vs[0], vs[3]).unwrap();

        let mut host = Graph::new(false);
        let hv = host.add_n_vertices(4);
        host.add_edge(hv[0], hv[1]).unwrap();
        host.add_edge(hv[0], hv[2]).unwrap();
        host.add_edge(hv[0], hv[3]).unwrap();

        let count = star_fast_path_count(&pattern, &host).unwrap();
        // deg(hv0)=3, others=1 => 3^3 + 1^3*3 = 30.
        assert_eq!(count.to_i64(), Some(30));
    }

    #[test]
    fn clique_prefilter_drops_low_degree_host_vertices() {
        let mut pattern = Graph::new(false);
        let vs = pattern.add_n_vertices(3);
        pattern.add_edge(vs[0], vs[1]).unwrap();
        pattern.add_edge(vs[1], vs[2]).unwrap();
        pattern.add_edge(vs[2], vs[0]).unwrap();

        let mut host = Graph::new(false);
        let hv = host.add_n_vertices(4);
        host.add_edge(hv[0], hv[1]).unwrap();
        host.add_edge(hv[1], hv[2]).unwrap();
        host.add_edge(hv[2], hv[0]).unwrap();
        // hv[3] is a pendant with degree 1, below n-1=2, and must be dropped.
        host.add_edge(hv[3], hv[0]).unwrap();

        let filtered = clique_fast_path_prefilter(&pattern, &host).unwrap();
        assert_eq!(filtered.vertex_count(), 3);
    }
}

//! Connected-cover refinement (§4.D).
//!
//! A tree-decomposition node's cover may be disconnected as a subgraph even
//! though its bag is valid; query compilation needs a *connected* cover so
//! that join order can walk it edge by edge without losing the running
//! intersection property. This splices in shortest paths (over the
//! pattern's full edge set) between whichever cover edges aren't already
//! joined, picking the shortest of the 4 endpoint combinations against the
//! most recently connected edge, in cover insertion order.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use pact_core::{EdgeName, Hypergraph, TdNode, VertexId};

use crate::error::PlannerError;

fn adjacency(hg: &Hypergraph) -> HashMap<VertexId, Vec<(VertexId, EdgeName)>> {
    let mut adj: HashMap<VertexId, Vec<(VertexId, EdgeName)>> = HashMap::new();
    for (name, &(u, v)) in hg.edges() {
        adj.entry(u).or_default().push((v, name.clone()));
        adj.entry(v).or_default().push((u, name.clone()));
    }
    adj
}

fn shortest_path(
    adj: &HashMap<VertexId, Vec<(VertexId, EdgeName)>>,
    from: VertexId,
    to: VertexId,
) -> Option<Vec<EdgeName>> {
    if from == to {
        return Some(Vec::new());
    }
    let mut visited = HashSet::new();
    visited.insert(from);
    let mut queue = VecDeque::new();
    queue.push_back(from);
    let mut came_from: HashMap<VertexId, (VertexId, EdgeName)> = HashMap::new();

    while let Some(cur) = queue.pop_front() {
        for (next, name) in adj.get(&cur).into_iter().flatten() {
            if visited.insert(*next) {
                came_from.insert(*next, (cur, name.clone()));
                if *next == to {
                    let mut path = Vec::new();
                    let mut node = to;
                    while node != from {
                        let (prev, edge_name) = came_from[&node].clone();
                        path.push(edge_name);
                        node = prev;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(*next);
            }
        }
    }
    None
}

/// Populates `node.con_cover` from `node.cover`, leaving children untouched
/// (see [`refine_tree`] for the whole-decomposition pass).
pub fn refine_cover(node: &mut TdNode, hg: &Hypergraph) -> Result<(), PlannerError> {
    let names: Vec<EdgeName> = node.cover.keys().cloned().collect();
    let mut con_cover: IndexMap<EdgeName, (VertexId, VertexId)> = IndexMap::new();

    let Some(first) = names.first().cloned() else {
        node.set_connected_cover(con_cover);
        return Ok(());
    };

    let adj = adjacency(hg);
    let (u0, v0) = node.cover[&first];
    con_cover.insert(first, (u0, v0));
    let mut component: HashSet<VertexId> = [u0, v0].into_iter().collect();

    for name in &names[1..] {
        let &(u, v) = &node.cover[name];
        if component.contains(&u) || component.contains(&v) {
            con_cover.insert(name.clone(), (u, v));
            component.insert(u);
            component.insert(v);
            continue;
        }

        let prev_name = con_cover.keys().next_back().cloned().unwrap();
        let (pu, pv) = con_cover[&prev_name];
        let candidates = [(pu, u), (pu, v), (pv, u), (pv, v)];
        let mut best: Option<Vec<EdgeName>> = None;
        for (from, to) in candidates {
            if let Some(path) = shortest_path(&adj, from, to) {
                if best.as_ref().map(|b| path.len() < b.len()).unwrap_or(true) {
                    best = Some(path);
                }
            }
        }
        let path = best.ok_or_else(|| PlannerError::NoDecomposition {
            pattern_id: "<disconnected-cover>".to_string(),
        })?;

        for edge_name in path {
            if let Some((eu, ev)) = hg.edge(&edge_name) {
                con_cover.insert(edge_name, (eu, ev));
                component.insert(eu);
                component.insert(ev);
            }
        }
        con_cover.insert(name.clone(), (u, v));
        component.insert(u);
        component.insert(v);
    }

    node.set_connected_cover(con_cover);
    Ok(())
}

/// Refines every node of the decomposition, root first.
pub fn refine_tree(node: &mut TdNode, hg: &Hypergraph) -> Result<(), PlannerError> {
    refine_cover(node, hg)?;
    for child in &mut node.children {
        refine_tree(child, hg)?;
    }
    Ok(())
}

//! The relational executor (§4.H): runs a compiled [`Op`] sequence over a
//! concrete host graph, seeded with the base edge relation and one unary
//! relation per distinct vertex label.
//!
//! Relations are multisets of tuples over pattern-variable columns (named
//! by stringified [`VertexId`]s) plus a `count` multiplicity, carried
//! alongside rather than as a column (`naive_exec.py::Relation`). Host
//! vertex values inside tuples are plain `u32`s — the host graph's own
//! vertex ids — kept separate from pattern variable names to avoid
//! confusing "the variable `3`" with "the host vertex `3`".

use std::collections::{BTreeMap, BTreeSet, HashMap};

use pact_core::Graph;

use crate::multiplicity::{sum_multiplicities, Multiplicity};
use crate::ops::{Op, BASE_RELATION, LABEL_RELATION_PREFIX};

pub type HostVertex = u32;
pub type Tuple = BTreeMap<String, HostVertex>;

#[derive(Debug, Clone, Default)]
pub struct Relation {
    pub columns: BTreeSet<String>,
    pub rows: Vec<(Tuple, Multiplicity)>,
}

impl Relation {
    pub fn empty(columns: BTreeSet<String>) -> Self {
        Relation { columns, rows: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn project_key(row: &Tuple, key: &BTreeSet<String>) -> Vec<HostVertex> {
        key.iter().map(|c| row[c]).collect()
    }
}

/// Execution state: named relations produced so far, keyed by [`Op::output`].
#[derive(Debug, Default)]
pub struct ExecState {
    relations: HashMap<String, Relation>,
}

impl ExecState {
    /// Seeds the state with the host graph's edge relation (columns `s`,
    /// `t`, count 1 per directed tuple — undirected hosts are closed under
    /// both orientations so pattern edges can bind either way) and one
    /// unary relation per distinct vertex label.
    pub fn seed(host: &Graph) -> Self {
        let mut base = Relation::empty(["s".to_string(), "t".to_string()].into_iter().collect());
        for (u, v) in host.edges() {
            let mut row = Tuple::new();
            row.insert("s".to_string(), u.0);
            row.insert("t".to_string(), v.0);
            base.rows.push((row.clone(), Multiplicity::Small(1)));
            if !host.directed() {
                let mut rev = Tuple::new();
                rev.insert("s".to_string(), v.0);
                rev.insert("t".to_string(), u.0);
                base.rows.push((rev, Multiplicity::Small(1)));
            }
        }

        let mut relations = HashMap::new();
        relations.insert(BASE_RELATION.to_string(), base);

        let mut by_label: HashMap<String, Relation> = HashMap::new();
        for v in host.vertices() {
            for label in host.labels(v) {
                let rel = by_label
                    .entry(label.to_string())
                    .or_insert_with(|| Relation::empty(["vertex".to_string()].into_iter().collect()));
                let mut row = Tuple::new();
                row.insert("vertex".to_string(), v.0);
                rel.rows.push((row, Multiplicity::Small(1)));
            }
        }
        for (label, rel) in by_label {
            relations.insert(format!("{LABEL_RELATION_PREFIX}{label}"), rel);
        }

        ExecState { relations }
    }

    pub fn get(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    fn require(&self, name: &str) -> &Relation {
        self.relations.get(name).unwrap_or_else(|| panic!("plan referenced undefined relation {name}"))
    }

    /// Runs one op, short-circuiting to an empty relation if either input is
    /// already empty (the empty-relation-halts-to-zero shortcut, §4.H).
    pub fn apply(&mut self, op: &Op) {
        let result = match op {
            Op::Rename { input, column_map, .. } => {
                let src = self.require(input);
                rename(src, column_map)
            }
            Op::Join { left, right, key, .. } => {
                let l = self.require(left);
                let r = self.require(right);
                if l.is_empty() || r.is_empty() {
                    Relation::empty(l.columns.union(&r.columns).cloned().collect())
                } else {
                    join(l, r, key)
                }
            }
            Op::Semijoin { left, right, key, .. } => {
                let l = self.require(left);
                let r = self.require(right);
                if l.is_empty() || r.is_empty() {
                    Relation::empty(l.columns.clone())
                } else {
                    semijoin(l, r, key)
                }
            }
            Op::Project { input, key, .. } => {
                let src = self.require(input);
                project_max(src, key)
            }
            Op::CountExt { input, key, .. } => {
                let src = self.require(input);
                count_ext(src, key)
            }
            Op::SumCount { left, right, key, .. } => {
                let l = self.require(left);
                let r = self.require(right);
                if l.is_empty() || r.is_empty() {
                    Relation::empty(l.columns.clone())
                } else {
                    sum_count(l, r, key)
                }
            }
        };
        self.relations.insert(op.output().to_string(), result);
    }

    pub fn apply_all(&mut self, ops: &[Op]) {
        for op in ops {
            self.apply(op);
        }
    }
}

fn rename(src: &Relation, column_map: &[(String, String)]) -> Relation {
    let mapping: HashMap<&str, &str> = column_map.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
    let columns: BTreeSet<String> = src.columns.iter().map(|c| mapping.get(c.as_str()).map(|s| s.to_string()).unwrap_or_else(|| c.clone())).collect();
    let rows = src
        .rows
        .iter()
        .map(|(row, count)| {
            let new_row: Tuple = row
                .iter()
                .map(|(c, v)| (mapping.get(c.as_str()).map(|s| s.to_string()).unwrap_or_else(|| c.clone()), *v))
                .collect();
            (new_row, count.clone())
        })
        .collect();
    Relation { columns, rows }
}

/// Inner-joins on `key`. `B`'s count is dropped and `A`'s carries forward
/// unchanged — JOIN composes edge relations without multiplicity inflation;
/// only SUM_COUNT multiplies.
fn join(l: &Relation, r: &Relation, key: &BTreeSet<String>) -> Relation {
    let mut index: HashMap<Vec<HostVertex>, Vec<&(Tuple, Multiplicity)>> = HashMap::new();
    for entry in &r.rows {
        index.entry(Relation::project_key(&entry.0, key)).or_default().push(entry);
    }

    let columns: BTreeSet<String> = l.columns.union(&r.columns).cloned().collect();
    let mut rows = Vec::new();
    for (lrow, lcount) in &l.rows {
        let k = Relation::project_key(lrow, key);
        if let Some(matches) = index.get(&k) {
            for (rrow, _rcount) in matches {
                let mut merged = lrow.clone();
                merged.extend(rrow.iter().map(|(c, v)| (c.clone(), *v)));
                // B's count is dropped: JOIN composes edge relations without
                // multiplicity inflation, A's count carries forward unchanged.
                rows.push((merged, lcount.clone()));
            }
        }
    }
    Relation { columns, rows }
}

/// Restricts `l` to tuples whose `key` projection appears in `r`; `l`'s
/// count survives unchanged and `r`'s columns are dropped.
fn semijoin(l: &Relation, r: &Relation, key: &BTreeSet<String>) -> Relation {
    let present: std::collections::HashSet<Vec<HostVertex>> = r.rows.iter().map(|(row, _)| Relation::project_key(row, key)).collect();
    let rows = l
        .rows
        .iter()
        .filter(|(row, _)| present.contains(&Relation::project_key(row, key)))
        .cloned()
        .collect();
    Relation { columns: l.columns.clone(), rows }
}

/// Groups by `key`, keeping the max count per group. This is the dedup
/// mechanism for automorphic sub-patterns: once two join paths reach the
/// same binding, only the larger partial count (never their sum) survives
/// (§9 Open Question, resolved in DESIGN.md).
fn project_max(src: &Relation, key: &BTreeSet<String>) -> Relation {
    let mut groups: HashMap<Vec<HostVertex>, (Tuple, Multiplicity)> = HashMap::new();
    for (row, count) in &src.rows {
        let k = Relation::project_key(row, key);
        let projected: Tuple = key.iter().map(|c| (c.clone(), row[c])).collect();
        groups
            .entry(k)
            .and_modify(|(_, best)| {
                if *count > *best {
                    *best = count.clone();
                }
            })
            .or_insert_with(|| (projected.clone(), count.clone()));
    }
    Relation { columns: key.clone(), rows: groups.into_values().collect() }
}

/// Groups by `key`, summing counts (§4.H `COUNT_EXT`: how many extensions
/// of each partial binding exist, not which one).
fn count_ext(src: &Relation, key: &BTreeSet<String>) -> Relation {
    let mut groups: HashMap<Vec<HostVertex>, (Tuple, Vec<Multiplicity>)> = HashMap::new();
    for (row, count) in &src.rows {
        let k = Relation::project_key(row, key);
        let projected: Tuple = key.iter().map(|c| (c.clone(), row[c])).collect();
        groups.entry(k).or_insert_with(|| (projected.clone(), Vec::new())).1.push(count.clone());
    }
    let rows = groups.into_values().map(|(row, counts)| (row, sum_multiplicities(counts))).collect();
    Relation { columns: key.clone(), rows }
}

/// Inner-joins `l` with `r` (a `COUNT_EXT` output) on `key`, multiplying
/// counts; `r`'s only non-key column is its count, so no columns are added.
fn sum_count(l: &Relation, r: &Relation, key: &BTreeSet<String>) -> Relation {
    let mut index: HashMap<Vec<HostVertex>, Multiplicity> = HashMap::new();
    for (row, count) in &r.rows {
        index.insert(Relation::project_key(row, key), count.clone());
    }
    let rows = l
        .rows
        .iter()
        .filter_map(|(row, count)| {
            let k = Relation::project_key(row, key);
            index.get(&k).map(|rcount| (row.clone(), count.clone() * rcount.clone()))
        })
        .collect();
    Relation { columns: l.columns.clone(), rows }
}

/// Runs `ops` over `host` and returns the final relation's total count
/// (summed over all surviving rows), or zero if the final relation is
/// missing or empty.
pub fn run_and_total(host: &Graph, ops: &[Op], final_relation: &str) -> Multiplicity {
    let mut state = ExecState::seed(host);
    state.apply_all(ops);
    match state.get(final_relation) {
        Some(rel) => sum_multiplicities(rel.rows.iter().map(|(_, c)| c.clone())),
        None => Multiplicity::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_host() -> Graph {
        let mut g = Graph::new(false);
        let vs = g.add_n_vertices(3);
        g.add_edge(vs[0], vs[1]).unwrap();
        g.add_edge(vs[1], vs[2]).unwrap();
        g.add_edge(vs[2], vs[0]).unwrap();
        g
    }

    #[test]
    fn seed_builds_symmetric_base_relation_for_undirected_host() {
        let host = triangle_host();
        let state = ExecState::seed(&host);
        let base = state.get(BASE_RELATION).unwrap();
        assert_eq!(base.rows.len(), 6);
    }

    #[test]
    fn rename_then_join_counts_a_single_edge_twice() {
        let host = triangle_host();
        let mut state = ExecState::seed(&host);
        let rename_u = Op::Rename {
            output: "E_0".to_string(),
            input: BASE_RELATION.to_string(),
            column_map: vec![("s".to_string(), "0".to_string()), ("t".to_string(), "1".to_string())],
        };
        state.apply(&rename_u);
        let e0 = state.get("E_0").unwrap();
        assert_eq!(e0.rows.len(), 3);
        assert!(e0.columns.contains("0") && e0.columns.contains("1"));
    }

    #[test]
    fn join_on_shared_variable_keeps_lefts_count_and_drops_rights() {
        let mut a = Relation::empty(["x".to_string()].into_iter().collect());
        a.rows.push((Tuple::from([("x".to_string(), 1)]), Multiplicity::Small(2)));
        let mut b = Relation::empty(["x".to_string()].into_iter().collect());
        b.rows.push((Tuple::from([("x".to_string(), 1)]), Multiplicity::Small(3)));
        let key: BTreeSet<String> = ["x".to_string()].into_iter().collect();
        let joined = join(&a, &b, &key);
        assert_eq!(joined.rows.len(), 1);
        assert_eq!(joined.rows[0].1, Multiplicity::Small(2));
    }

    #[test]
    fn project_max_keeps_larger_count_not_sum() {
        let mut src = Relation::empty(["x".to_string()].into_iter().collect());
        src.rows.push((Tuple::from([("x".to_string(), 1)]), Multiplicity::Small(2)));
        src.rows.push((Tuple::from([("x".to_string(), 1)]), Multiplicity::Small(5)));
        let key: BTreeSet<String> = ["x".to_string()].into_iter().collect();
        let out = project_max(&src, &key);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].1, Multiplicity::Small(5));
    }

    #[test]
    fn count_ext_sums_counts_within_group() {
        let mut src = Relation::empty(["x".to_string()].into_iter().collect());
        src.rows.push((Tuple::from([("x".to_string(), 1)]), Multiplicity::Small(2)));
        src.rows.push((Tuple::from([("x".to_string(), 1)]), Multiplicity::Small(5)));
        let key: BTreeSet<String> = ["x".to_string()].into_iter().collect();
        let out = count_ext(&src, &key);
        assert_eq!(out.rows[0].1, Multiplicity::Small(7));
    }

    #[test]
    fn semijoin_filters_without_multiplying() {
        let mut l = Relation::empty(["x".to_string()].into_iter().collect());
        l.rows.push((Tuple::from([("x".to_string(), 1)]), Multiplicity::Small(4)));
        l.rows.push((Tuple::from([("x".to_string(), 2)]), Multiplicity::Small(9)));
        let mut r = Relation::empty(["x".to_string()].into_iter().collect());
        r.rows.push((Tuple::from([("x".to_string(), 1)]), Multiplicity::Small(100)));
        let key: BTreeSet<String> = ["x".to_string()].into_iter().collect();
        let out = semijoin(&l, &r, &key);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].1, Multiplicity::Small(4));
    }

    #[test]
    fn empty_input_relation_short_circuits_join() {
        let empty = Relation::empty(["x".to_string()].into_iter().collect());
        let mut r = Relation::empty(["x".to_string()].into_iter().collect());
        r.rows.push((Tuple::from([("x".to_string(), 1)]), Multiplicity::Small(1)));
        let key: BTreeSet<String> = ["x".to_string()].into_iter().collect();

        let mut state = ExecState::default();
        state.relations.insert("empty".to_string(), empty);
        state.relations.insert("r".to_string(), r);
        let op = Op::Join { output: "out".to_string(), left: "empty".to_string(), right: "r".to_string(), key };
        state.apply(&op);
        assert!(state.get("out").unwrap().is_empty());
    }

    #[test]
    fn labeled_relation_is_seeded_per_distinct_label() {
        let mut host = Graph::new(false);
        let vs = host.add_n_vertices(2);
        host.add_label(vs[0], "Person".to_string()).unwrap();
        host.add_label(vs[1], "City".to_string()).unwrap();
        let state = ExecState::seed(&host);
        assert!(state.get(&format!("{LABEL_RELATION_PREFIX}Person")).is_some());
        assert!(state.get(&format!("{LABEL_RELATION_PREFIX}City")).is_some());
    }

    #[test]
    fn run_and_total_counts_triangle_homomorphisms_into_itself() {
        let host = triangle_host();
        let ops = vec![
            Op::Rename { output: "E_0".to_string(), input: BASE_RELATION.to_string(), column_map: vec![("s".to_string(), "0".to_string()), ("t".to_string(), "1".to_string())] },
            Op::Rename { output: "E_1".to_string(), input: BASE_RELATION.to_string(), column_map: vec![("s".to_string(), "1".to_string()), ("t".to_string(), "2".to_string())] },
            Op::Rename { output: "E_2".to_string(), input: BASE_RELATION.to_string(), column_map: vec![("s".to_string(), "2".to_string()), ("t".to_string(), "0".to_string())] },
            Op::Join { output: "J01".to_string(), left: "E_0".to_string(), right: "E_1".to_string(), key: ["1".to_string()].into_iter().collect() },
            Op::Join { output: "final".to_string(), left: "J01".to_string(), right: "E_2".to_string(), key: ["0".to_string(), "2".to_string()].into_iter().collect() },
        ];
        let total = run_and_total(&host, &ops, "final");
        // Every pair of the pattern's 3 vertices is adjacent, so a homomorphism
        // into the (symmetric) triangle host is exactly a permutation: 3! = 6.
        assert_eq!(total.to_i64(), Some(6));
    }
}

//! SQLite implementation of [`PactStore`].
//!
//! Each table stores its payload as a JSON text column (`graph_json`,
//! `decomposition_json`, `graphs_json`); the SQL layer is a content-addressed
//! key-value store, not a relational model of pattern internals -- there is
//! nothing to query by column here that isn't cheaper to query after loading
//! the JSON.

use rusqlite::{params, Connection, OptionalExtension};

use pact_core::{Graph, TdNode};

use crate::error::StorageError;
use crate::hash::{pattern_id, spasm_space_id};
use crate::schema::{open_database, open_in_memory};
use crate::spasm::SpasmSpace;
use crate::traits::PactStore;
use crate::types::{DecompositionId, PatternId, SpasmSpaceId};

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        Ok(SqliteStore { conn: open_database(path)? })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(SqliteStore { conn: open_in_memory()? })
    }
}

fn decomposition_id(pattern_id: &PatternId, config_fingerprint: &str) -> DecompositionId {
    let bytes = serde_json::to_vec(&(pattern_id, config_fingerprint))
        .expect("pattern id and fingerprint are always serializable");
    DecompositionId(blake3::hash(&bytes).to_hex().to_string())
}

impl PactStore for SqliteStore {
    fn put_pattern(&mut self, pattern: &Graph) -> Result<PatternId, StorageError> {
        let id = pattern_id(pattern);
        let graph_json = serde_json::to_string(pattern)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO patterns (id, graph_json) VALUES (?1, ?2)",
            params![id.0, graph_json],
        )?;
        Ok(id)
    }

    fn get_pattern(&self, id: &PatternId) -> Result<Graph, StorageError> {
        let graph_json: Option<String> = self
            .conn
            .query_row("SELECT graph_json FROM patterns WHERE id = ?1", params![id.0], |row| {
                row.get(0)
            })
            .optional()?;
        match graph_json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Err(StorageError::PatternNotFound { id: id.to_string() }),
        }
    }

    fn put_decomposition(
        &mut self,
        pattern_id: &PatternId,
        config_fingerprint: &str,
        decomposition: &TdNode,
    ) -> Result<DecompositionId, StorageError> {
        let id = decomposition_id(pattern_id, config_fingerprint);
        let decomposition_json = serde_json::to_string(decomposition)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO decompositions (id, pattern_id, config_fingerprint, decomposition_json)
             VALUES (?1, ?2, ?3, ?4)",
            params![id.0, pattern_id.0, config_fingerprint, decomposition_json],
        )?;
        Ok(id)
    }

    fn get_decomposition(
        &self,
        pattern_id: &PatternId,
        config_fingerprint: &str,
    ) -> Result<TdNode, StorageError> {
        let decomposition_json: Option<String> = self
            .conn
            .query_row(
                "SELECT decomposition_json FROM decompositions
                 WHERE pattern_id = ?1 AND config_fingerprint = ?2",
                params![pattern_id.0, config_fingerprint],
                |row| row.get(0),
            )
            .optional()?;
        match decomposition_json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Err(StorageError::PatternNotFound { id: pattern_id.to_string() }),
        }
    }

    fn put_spasm_space(&mut self, space: &SpasmSpace) -> Result<SpasmSpaceId, StorageError> {
        let id = spasm_space_id(space.iter());
        let graphs: Vec<&Graph> = space.iter().map(|(_, g)| g).collect();
        let graphs_json = serde_json::to_string(&graphs)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO spasm_spaces (id, graphs_json) VALUES (?1, ?2)",
            params![id.0, graphs_json],
        )?;
        Ok(id)
    }

    fn get_spasm_space(&self, id: &SpasmSpaceId) -> Result<SpasmSpace, StorageError> {
        let graphs_json: Option<String> = self
            .conn
            .query_row("SELECT graphs_json FROM spasm_spaces WHERE id = ?1", params![id.0], |row| {
                row.get(0)
            })
            .optional()?;
        match graphs_json {
            Some(json) => {
                let graphs: Vec<Graph> = serde_json::from_str(&json)?;
                let mut space = SpasmSpace::new();
                for g in graphs {
                    space.insert(g);
                }
                Ok(space)
            }
            None => Err(StorageError::SpasmSpaceNotFound { id: id.to_string() }),
        }
    }
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
    fn put_then_get_pattern_round_trips() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let g = edge_graph();
        let id = store.put_pattern(&g).unwrap();
        let back = store.get_pattern(&id).unwrap();
        assert_eq!(back.stable_id(), g.stable_id());
    }

    #[test]
    fn get_missing_pattern_errors() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store.get_pattern(&PatternId("nonexistent".into()));
        assert!(matches!(result, Err(StorageError::PatternNotFound { .. })));
    }

    #[test]
    fn put_pattern_twice_does_not_duplicate_row() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let g = edge_graph();
        store.put_pattern(&g).unwrap();
        store.put_pattern(&g).unwrap();
        let count: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM patterns", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn spasm_space_round_trips() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut space = SpasmSpace::new();
        space.insert(edge_graph());
        let id = store.put_spasm_space(&space).unwrap();
        let back = store.get_spasm_space(&id).unwrap();
        assert_eq!(back.len(), 1);
    }
}

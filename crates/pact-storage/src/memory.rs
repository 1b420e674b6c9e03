//! In-memory implementation of [`PactStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests and ephemeral
//! sessions. It stores all data in `HashMap`s with identical semantics to
//! the SQLite backend.

use std::collections::HashMap;

use pact_core::{Graph, TdNode};

use crate::error::StorageError;
use crate::hash::{pattern_id, spasm_space_id};
use crate::spasm::SpasmSpace;
use crate::traits::PactStore;
use crate::types::{DecompositionId, PatternId, SpasmSpaceId};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    patterns: HashMap<PatternId, Graph>,
    decompositions: HashMap<(PatternId, String), TdNode>,
    spasm_spaces: HashMap<SpasmSpaceId, SpasmSpace>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::default()
    }
}

fn decomposition_id(pattern_id: &PatternId, config_fingerprint: &str) -> DecompositionId {
    let bytes = serde_json::to_vec(&(pattern_id, config_fingerprint))
        .expect("pattern id and fingerprint are always serializable");
    DecompositionId(blake3::hash(&bytes).to_hex().to_string())
}

impl PactStore for InMemoryStore {
    fn put_pattern(&mut self, pattern: &Graph) -> Result<PatternId, StorageError> {
        let id = pattern_id(pattern);
        self.patterns.entry(id.clone()).or_insert_with(|| pattern.clone());
        Ok(id)
    }

    fn get_pattern(&self, id: &PatternId) -> Result<Graph, StorageError> {
        self.patterns
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::PatternNotFound { id: id.to_string() })
    }

    fn put_decomposition(
        &mut self,
        pattern_id: &PatternId,
        config_fingerprint: &str,
        decomposition: &TdNode,
    ) -> Result<DecompositionId, StorageError> {
        let key = (pattern_id.clone(), config_fingerprint.to_string());
        self.decompositions.entry(key).or_insert_with(|| decomposition.clone());
        Ok(decomposition_id(pattern_id, config_fingerprint))
    }

    fn get_decomposition(
        &self,
        pattern_id: &PatternId,
        config_fingerprint: &str,
    ) -> Result<TdNode, StorageError> {
        self.decompositions
            .get(&(pattern_id.clone(), config_fingerprint.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::PatternNotFound { id: pattern_id.to_string() })
    }

    fn put_spasm_space(&mut self, space: &SpasmSpace) -> Result<SpasmSpaceId, StorageError> {
        let id = spasm_space_id(space.iter());
        self.spasm_spaces.entry(id.clone()).or_insert_with(|| space.clone());
        Ok(id)
    }

    fn get_spasm_space(&self, id: &SpasmSpaceId) -> Result<SpasmSpace, StorageError> {
        self.spasm_spaces
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::SpasmSpaceNotFound { id: id.to_string() })
    }
}

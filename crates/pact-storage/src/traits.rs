//! The [`PactStore`] trait: the storage contract all backends implement.
//!
//! Three independent content-addressed tables (§2 components F, M):
//! patterns, decompositions (keyed by pattern + config fingerprint), and
//! spasm spaces. There is no update operation -- content addressing makes
//! "insert" idempotent, so callers never need to distinguish create from
//! overwrite.

use pact_core::{Graph, TdNode};

use crate::error::StorageError;
use crate::spasm::SpasmSpace;
use crate::types::{DecompositionId, PatternId, SpasmSpaceId};

/// The storage contract for patterns, their decompositions, and spasm spaces.
///
/// Synchronous, mirroring the single-threaded-per-plan-execution model (§5):
/// storage is never on the hot path of a plan execution, only of pattern
/// and spasm-space lifecycle management.
pub trait PactStore {
    /// Persists `pattern`, returning its content-derived id. Idempotent.
    fn put_pattern(&mut self, pattern: &Graph) -> Result<PatternId, StorageError>;

    /// Loads a previously persisted pattern.
    fn get_pattern(&self, id: &PatternId) -> Result<Graph, StorageError>;

    /// Persists a decomposition for `pattern_id` under `config_fingerprint`,
    /// returning the composite id. Re-persisting the same pair is a no-op.
    fn put_decomposition(
        &mut self,
        pattern_id: &PatternId,
        config_fingerprint: &str,
        decomposition: &TdNode,
    ) -> Result<DecompositionId, StorageError>;

    /// Loads a decomposition by pattern id and config fingerprint.
    fn get_decomposition(
        &self,
        pattern_id: &PatternId,
        config_fingerprint: &str,
    ) -> Result<TdNode, StorageError>;

    /// Persists a spasm space, returning its content-derived id.
    fn put_spasm_space(&mut self, space: &SpasmSpace) -> Result<SpasmSpaceId, StorageError>;

    /// Loads a previously persisted spasm space.
    fn get_spasm_space(&self, id: &SpasmSpaceId) -> Result<SpasmSpace, StorageError>;
}

//! Storage error types (§7).
//!
//! Persistence failures for patterns, decompositions, and spasm spaces:
//! serialization, sqlite, migration, and not-found variants, mirroring the
//! teacher's per-crate `StorageError` convention of attaching the offending
//! id rather than a bare message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("pattern not found: {id}")]
    PatternNotFound { id: String },

    #[error("spasm space not found: {id}")]
    SpasmSpaceNotFound { id: String },

    #[error("basis graph not found in spasm space {space}: id={basis_id}")]
    BasisGraphNotFound { space: String, basis_id: u32 },

    #[error("data integrity error: {reason}")]
    IntegrityError { reason: String },
}

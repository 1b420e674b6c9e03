//! Storage abstraction for PACT patterns, decompositions, and spasm spaces.
//!
//! Provides the [`PactStore`] trait defining the storage contract that all
//! backends implement, plus [`InMemoryStore`] and [`SqliteStore`] as
//! first-class backends. All three kinds of record are content-addressed
//! (§7): identity is derived from a blake3 hash, never assigned on insert.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`types`]: PatternId, DecompositionId, SpasmSpaceId
//! - [`traits`]: PactStore trait definition
//! - [`hash`]: content-hash composition for patterns and spasm spaces
//! - [`spasm`]: the in-memory SpasmSpace registry (§4.F)
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: SQL schema constants and migration setup
//! - [`sqlite`]: SqliteStore implementation

pub mod error;
pub mod hash;
pub mod memory;
pub mod schema;
pub mod spasm;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::StorageError;
pub use memory::InMemoryStore;
pub use spasm::SpasmSpace;
pub use sqlite::SqliteStore;
pub use traits::PactStore;
pub use types::{DecompositionId, PatternId, SpasmSpaceId};

//! Storage-layer identity types.
//!
//! Patterns and decompositions are content-addressed: identity is derived
//! from content (a blake3 hash), not assigned on insert, so re-saving the
//! same pattern twice is a no-op rather than a duplicate row.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A pattern's storage identity: the hex-encoded blake3 hash of `Graph::stable_id()`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PatternId(pub String);

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decomposition's storage identity: `PatternId` plus the fingerprint of
/// the config that produced it, hashed together.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DecompositionId(pub String);

impl fmt::Display for DecompositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A spasm space's storage identity: the hex-encoded blake3 hash over the
/// sorted `(BasisId, stable_id)` pairs of its member graphs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpasmSpaceId(pub String);

impl fmt::Display for SpasmSpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

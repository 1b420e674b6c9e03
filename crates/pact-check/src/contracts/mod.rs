//! Contract verification for the pattern-counting pipeline: property-based
//! checks of the invariants the design depends on, plus the seed corpus of
//! concrete end-to-end scenarios with known expected counts.

pub mod property;

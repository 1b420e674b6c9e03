//! Planner/execution configuration (§2 component L), analogous in spirit to
//! the teacher's `CompileOptions`: one struct, serde round-trippable, with
//! every policy knob the rest of the crate consults explicit rather than
//! inferred.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Policy for §4.G step 6 when a quotient is not found in the spasm space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpandSpacePolicy {
    /// Insert the new quotient and seed its partition_base with the current
    /// partition's contribution (`hombase_coeffs_nauty`'s non-zero seeding).
    Allow,
    /// Signal `PlannerError::BasisIncomplete` instead.
    Forbid,
}

/// Overflow handling for the relational executor (§4.H).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Promote predicted-overflowing counts to `BigInt` and continue.
    GracefulBigint,
    /// Signal `PlannerError::IntegerOverflow` instead of promoting.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PactConfig {
    /// Wall-clock budget per external HTD-solver attempt (§4.C, §5).
    #[serde(with = "duration_millis")]
    pub solver_timeout: Duration,
    /// `T`: number of parallel HTD-solver attempts for cyclic patterns.
    pub solver_attempts: u32,
    pub overflow_policy: OverflowPolicy,
    /// Toggles the early-semijoin plan-compilation variant (§4.E); both
    /// code paths are implemented regardless of this setting.
    pub early_semijoin: bool,
    pub expand_space: ExpandSpacePolicy,
}

impl Default for PactConfig {
    fn default() -> Self {
        PactConfig {
            solver_timeout: Duration::from_secs(30),
            solver_attempts: 1,
            overflow_policy: OverflowPolicy::GracefulBigint,
            early_semijoin: false,
            expand_space: ExpandSpacePolicy::Forbid,
        }
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

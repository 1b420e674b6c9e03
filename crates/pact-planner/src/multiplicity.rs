//! Overflow-safe relation counts (§4.H, §6): small counts stay plain `i64`
//! arithmetic; once a multiplication or sum could plausibly overflow, the
//! value is promoted to an arbitrary-precision [`BigInt`] and stays there.
//!
//! The promotion trigger is the empirical margin used by the original
//! implementation: `log2(a) + log2(b) >= 62.8`, i.e. just under the 63 bits
//! of headroom in a signed 64-bit accumulator (`util.py`'s overflow guard).

use std::fmt;
use std::ops::{Add, Mul};

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

const OVERFLOW_LOG2_THRESHOLD: f64 = 62.8;

fn log2_of(n: i64) -> f64 {
    if n <= 1 {
        0.0
    } else {
        (n as f64).log2()
    }
}

/// A count that escalates from `i64` to [`BigInt`] rather than wrapping or
/// panicking on overflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Multiplicity {
    Small(i64),
    Big(BigInt),
}

impl PartialOrd for Multiplicity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Multiplicity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self, other) {
            (Multiplicity::Small(a), Multiplicity::Small(b)) => a.cmp(b),
            _ => self.as_bigint().cmp(&other.as_bigint()),
        }
    }
}

impl Multiplicity {
    pub fn zero() -> Self {
        Multiplicity::Small(0)
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Multiplicity::Small(n) => *n == 0,
            Multiplicity::Big(n) => n.is_zero(),
        }
    }

    pub fn as_bigint(&self) -> BigInt {
        match self {
            Multiplicity::Small(n) => BigInt::from(*n),
            Multiplicity::Big(n) => n.clone(),
        }
    }

    /// Collapses back to `i64` if the value fits, used only for display and
    /// test assertions; the internal representation is never downgraded
    /// automatically.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Multiplicity::Small(n) => Some(*n),
            Multiplicity::Big(n) => n.to_i64(),
        }
    }

    fn would_overflow_sum(a: i64, b: i64) -> bool {
        log2_of(a.abs()) + log2_of(b.abs()) >= OVERFLOW_LOG2_THRESHOLD || a.checked_add(b).is_none()
    }

    fn would_overflow_product(a: i64, b: i64) -> bool {
        log2_of(a.abs()) + log2_of(b.abs()) >= OVERFLOW_LOG2_THRESHOLD || a.checked_mul(b).is_none()
    }
}

impl From<i64> for Multiplicity {
    fn from(n: i64) -> Self {
        Multiplicity::Small(n)
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Multiplicity::Small(n) => write!(f, "{n}"),
            Multiplicity::Big(n) => write!(f, "{n}"),
        }
    }
}

impl Add for Multiplicity {
    type Output = Multiplicity;

    fn add(self, rhs: Multiplicity) -> Multiplicity {
        match (self, rhs) {
            (Multiplicity::Small(a), Multiplicity::Small(b)) if !Multiplicity::would_overflow_sum(a, b) => {
                Multiplicity::Small(a + b)
            }
            (a, b) => Multiplicity::Big(a.as_bigint() + b.as_bigint()),
        }
    }
}

impl Mul for Multiplicity {
    type Output = Multiplicity;

    fn mul(self, rhs: Multiplicity) -> Multiplicity {
        match (self, rhs) {
            (Multiplicity::Small(a), Multiplicity::Small(b)) if !Multiplicity::would_overflow_product(a, b) => {
                Multiplicity::Small(a * b)
            }
            (a, b) => Multiplicity::Big(a.as_bigint() * b.as_bigint()),
        }
    }
}

/// Sums an iterator of multiplicities without the pairwise short-circuit
/// overflow checks re-evaluating on every intermediate (§4.H `COUNT_EXT`).
pub fn sum_multiplicities<I: IntoIterator<Item = Multiplicity>>(items: I) -> Multiplicity {
    items.into_iter().fold(Multiplicity::zero(), |acc, x| acc + x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_plus_small_stays_small_below_threshold() {
        let a = Multiplicity::Small(100);
        let b = Multiplicity::Small(200);
        assert_eq!(a + b, Multiplicity::Small(300));
    }

    #[test]
    fn product_near_i64_max_escalates_to_big() {
        let a = Multiplicity::Small(i64::MAX / 2);
        let b = Multiplicity::Small(4);
        match a * b {
            Multiplicity::Big(_) => {}
            Multiplicity::Small(n) => panic!("expected promotion to Big, got Small({n})"),
        }
    }

    #[test]
    fn overflowing_checked_mul_always_promotes() {
        let a = Multiplicity::Small(i64::MAX);
        let b = Multiplicity::Small(2);
        assert!(matches!(a * b, Multiplicity::Big(_)));
    }

    #[test]
    fn zero_is_zero() {
        assert!(Multiplicity::zero().is_zero());
        assert!(!Multiplicity::Small(1).is_zero());
        assert!(Multiplicity::Big(BigInt::from(0)).is_zero());
    }

    #[test]
    fn sum_multiplicities_promotes_when_total_overflows() {
        let items = vec![Multiplicity::Small(i64::MAX - 1), Multiplicity::Small(i64::MAX - 1)];
        assert!(matches!(sum_multiplicities(items), Multiplicity::Big(_)));
    }
}

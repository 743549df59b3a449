//! Strongly-typed time units.
//!
//! Traces are stored in microseconds, configuration thresholds are authored in milliseconds.
//! Keeping these as distinct newtypes instead of passing `i64` around prevents the kind of unit
//! mixup that would otherwise be trivial to introduce when comparing a node's `total` against a
//! configured threshold.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A duration or timestamp, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Microseconds(pub i64);

/// A duration, in milliseconds. Used exclusively by configuration thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Milliseconds(pub i64);

impl Microseconds {
    pub const ZERO: Microseconds = Microseconds(0);

    pub const fn new(value: i64) -> Self {
        Microseconds(value)
    }
}

impl Milliseconds {
    pub const fn new(value: i64) -> Self {
        Milliseconds(value)
    }

    /// Converts to microseconds for comparison against tree node durations.
    pub const fn as_micros(self) -> Microseconds {
        Microseconds(self.0 * 1000)
    }
}

impl fmt::Display for Microseconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

impl fmt::Display for Milliseconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

impl Add for Microseconds {
    type Output = Microseconds;
    fn add(self, rhs: Microseconds) -> Microseconds {
        Microseconds(self.0 + rhs.0)
    }
}

impl Sub for Microseconds {
    type Output = Microseconds;
    fn sub(self, rhs: Microseconds) -> Microseconds {
        Microseconds(self.0 - rhs.0)
    }
}

impl Neg for Microseconds {
    type Output = Microseconds;
    fn neg(self) -> Microseconds {
        Microseconds(-self.0)
    }
}

impl AddAssign for Microseconds {
    fn add_assign(&mut self, rhs: Microseconds) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Microseconds {
    fn sub_assign(&mut self, rhs: Microseconds) {
        self.0 -= rhs.0;
    }
}

impl Sum for Microseconds {
    fn sum<I: Iterator<Item = Microseconds>>(iter: I) -> Self {
        iter.fold(Microseconds::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milliseconds_convert_to_microseconds() {
        assert_eq!(Milliseconds::new(50).as_micros(), Microseconds::new(50_000));
    }

    #[test]
    fn microseconds_sum_over_an_iterator() {
        let total: Microseconds = [Microseconds::new(10), Microseconds::new(20), Microseconds::new(30)].into_iter().sum();
        assert_eq!(total, Microseconds::new(60));
    }

    #[test]
    fn ordering_matches_the_underlying_integer() {
        assert!(Microseconds::new(5) < Microseconds::new(10));
        assert!(Milliseconds::new(-1) < Milliseconds::new(0));
    }

    #[test]
    fn display_includes_the_unit_suffix() {
        assert_eq!(Microseconds::new(42).to_string(), "42us");
        assert_eq!(Milliseconds::new(42).to_string(), "42ms");
    }
}

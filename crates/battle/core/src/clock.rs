//! Explicit time values.
//!
//! The engine never reads a global clock. Every time-dependent component
//! receives a [`Millis`] delta from its caller, which keeps sequences and
//! action commands fully deterministic under test.

use core::fmt;
use core::ops::{Add, AddAssign, Div, Mul, Sub};

/// Elapsed or delta time in milliseconds.
///
/// Stored as `f64` because command timing windows are authored with
/// sub-millisecond precision and players can observe single-millisecond
/// boundary behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Millis(pub f64);

impl Millis {
    pub const ZERO: Self = Self(0.0);

    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Seconds, for display only.
    pub fn as_secs(self) -> f64 {
        self.0 / 1000.0
    }

    /// Normalized progress of `self` against `duration`, clamped to `[0, 1]`.
    ///
    /// A zero or negative duration counts as already complete.
    pub fn progress(self, duration: Millis) -> f64 {
        if duration.0 <= 0.0 {
            return 1.0;
        }
        (self.0 / duration.0).clamp(0.0, 1.0)
    }
}

impl Add for Millis {
    type Output = Millis;
    fn add(self, rhs: Millis) -> Millis {
        Millis(self.0 + rhs.0)
    }
}

impl AddAssign for Millis {
    fn add_assign(&mut self, rhs: Millis) {
        self.0 += rhs.0;
    }
}

impl Sub for Millis {
    type Output = Millis;
    fn sub(self, rhs: Millis) -> Millis {
        Millis(self.0 - rhs.0)
    }
}

impl Mul<f64> for Millis {
    type Output = Millis;
    fn mul(self, rhs: f64) -> Millis {
        Millis(self.0 * rhs)
    }
}

impl Div for Millis {
    type Output = f64;
    fn div(self, rhs: Millis) -> f64 {
        self.0 / rhs.0
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

//! Pattern library: the four analytic flow patterns.
//!
//! Each pattern maps a field-space coordinate `(x, y)` to a flow vector
//! `(u, v)`. `x` is the column-varying coordinate of the generated grid and
//! `y` the row-varying one.
//!
//! | pattern              | u           | v          |
//! |----------------------|-------------|------------|
//! | `Sinusoidal`         | sin(y)      | cos(x)     |
//! | `InverseSinusoidal`  | cos(x)      | sin(y)     |
//! | `Clockwise`          | -sqrt(y·K)  | sqrt(x·K)  |
//! | `AntiClockwise`      | sqrt(y·K)   | sqrt(x·K)  |
//!
//! with `K = (1/φ)·(1/π)`. Negative `sqrt` arguments yield `NaN`, which is
//! returned as-is.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::prng::Xorshift64;

/// The golden ratio φ = (1 + √5) / 2.
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Scaling constant of the rotational patterns: (1/φ)·(1/π).
pub const ROTATION_K: f64 = 1.0 / GOLDEN_RATIO / PI;

/// A flow vector produced by a pattern or returned by a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowVector {
    pub u: f64,
    pub v: f64,
}

impl FlowVector {
    /// Creates a flow vector from its components.
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    /// Euclidean length of the vector.
    pub fn magnitude(&self) -> f64 {
        self.u.hypot(self.v)
    }

    /// Returns the vector scaled by `factor`.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            u: self.u * factor,
            v: self.v * factor,
        }
    }
}

/// The named analytic flow patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pattern {
    Sinusoidal,
    InverseSinusoidal,
    Clockwise,
    AntiClockwise,
}

impl Pattern {
    /// Every pattern, in declaration order.
    pub const ALL: [Pattern; 4] = [
        Pattern::Sinusoidal,
        Pattern::InverseSinusoidal,
        Pattern::Clockwise,
        Pattern::AntiClockwise,
    ];

    /// Evaluates the pattern at field-space coordinate `(x, y)`.
    pub fn evaluate(self, x: f64, y: f64) -> FlowVector {
        match self {
            Pattern::Sinusoidal => FlowVector::new(y.sin(), x.cos()),
            Pattern::InverseSinusoidal => FlowVector::new(x.cos(), y.sin()),
            Pattern::Clockwise => {
                FlowVector::new(-(y * ROTATION_K).sqrt(), (x * ROTATION_K).sqrt())
            }
            Pattern::AntiClockwise => {
                FlowVector::new((y * ROTATION_K).sqrt(), (x * ROTATION_K).sqrt())
            }
        }
    }

    /// Canonical kebab-case name.
    pub fn name(self) -> &'static str {
        match self {
            Pattern::Sinusoidal => "sinusoidal",
            Pattern::InverseSinusoidal => "inverse-sinusoidal",
            Pattern::Clockwise => "clockwise",
            Pattern::AntiClockwise => "anti-clockwise",
        }
    }

    /// Names of all patterns.
    pub fn list_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|p| p.name()).collect()
    }

    /// Parses a pattern name.
    ///
    /// Accepts the kebab-case names and their SCREAMING_SNAKE aliases
    /// (`ANTI_CLOCKWISE`). Returns `FlowError::InvalidPattern` otherwise.
    pub fn from_name(name: &str) -> Result<Self, FlowError> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == normalized)
            .ok_or_else(|| FlowError::InvalidPattern(name.to_string()))
    }

    /// Draws a pattern uniformly at random, rejecting `current` until a
    /// different one comes up.
    pub fn shuffle_from(current: Pattern, rng: &mut Xorshift64) -> Pattern {
        loop {
            let candidate = Self::ALL[rng.next_usize(Self::ALL.len())];
            if candidate != current {
                return candidate;
            }
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pattern {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

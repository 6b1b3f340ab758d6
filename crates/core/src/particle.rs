//! Tracer particle and the per-tick advection step.
//!
//! Advection converts the particle's screen position to field space, looks
//! up the nearest flow vector, and blends the position toward the force
//! term `flow * resistance`:
//!
//! ```text
//! fx = x / scale
//! force = flow(fx, fy) * resistance        resistance = scale * fps_resistance
//! x' = interpolate(fx * scale, force.u, t)
//! ```
//!
//! This is a position-replacement blend, not a velocity integrator: at
//! `t = 1` the new position is exactly the force term. Each axis then wraps
//! once around the surface extent.

use serde::{Deserialize, Serialize};

use crate::field::Field;
use crate::interp::interpolate;
use crate::lookup::{lookup, LookupCache, LookupOptions, Nearest};
use crate::prng::Xorshift64;

/// Size of the drawing surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl Extent {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when both sides are finite and positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// The shorter side.
    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }
}

/// A tracer particle in screen-space coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub size: f64,
}

impl Particle {
    pub fn new(x: f64, y: f64, speed: f64, size: f64) -> Self {
        Self { x, y, speed, size }
    }

    /// Places a particle uniformly at random on `[0, width) x [0, height)`.
    pub fn random(extent: Extent, speed: f64, size: f64, rng: &mut Xorshift64) -> Self {
        let x = rng.next_range(0.0, extent.width);
        let y = rng.next_range(0.0, extent.height);
        Self::new(x, y, speed, size)
    }

    /// True when neither coordinate is `NaN` or infinite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Wraps one coordinate once around `[0, extent]`.
///
/// Assumes a single tick never moves further than one extent. `NaN` is
/// returned unchanged.
pub fn wrap(c: f64, extent: f64) -> f64 {
    if c < 0.0 {
        c + extent
    } else if c > extent {
        c - extent
    } else {
        c
    }
}

/// Parameters of one advection step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advection {
    /// Screen pixels per field-space unit.
    pub scale_factor: f64,
    /// Blend factor `t` in [0, 1].
    pub interpolation: f64,
    /// Multiplier turning a flow vector into a force term.
    pub resistance: f64,
    pub extent: Extent,
    pub lookup: LookupOptions,
}

impl Advection {
    /// Builds the step parameters, deriving
    /// `resistance = scale_factor * fps_resistance`.
    pub fn new(
        scale_factor: f64,
        interpolation: f64,
        fps_resistance: f64,
        extent: Extent,
        lookup: LookupOptions,
    ) -> Self {
        Self {
            scale_factor,
            interpolation,
            resistance: scale_factor * fps_resistance,
            extent,
            lookup,
        }
    }
}

/// Moves `particle` one tick through `field` and returns the field point
/// that supplied the flow vector.
pub fn advance(
    particle: &mut Particle,
    field: &Field,
    cache: Option<&mut LookupCache>,
    step: &Advection,
) -> Nearest {
    let scale = step.scale_factor;
    let fx = particle.x / scale;
    let fy = particle.y / scale;

    let matched = lookup(field, cache, fx, fy, step.lookup);
    let force = matched.flow().scaled(step.resistance);

    let x = interpolate(fx * scale, force.u, step.interpolation);
    let y = interpolate(fy * scale, force.v, step.interpolation);

    particle.x = wrap(x, step.extent.width);
    particle.y = wrap(y, step.extent.height);
    matched
}

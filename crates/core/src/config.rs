//! Simulation configuration.
//!
//! A [`SimulationConfig`] captures everything needed to reproduce a run:
//! pattern, field shape, frame budget, advection tuning, lookup options and
//! the PRNG seed. Two runs with equal configs and equal host input produce
//! identical particle trajectories.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FlowError;
use crate::lookup::{LookupOptions, Metric, Strategy};
use crate::params::{param_bool, param_f64, param_parsed, param_u64, param_usize};
use crate::pattern::Pattern;

/// Default field-space side length.
const DEFAULT_FIELD_SIZE: usize = 16;
/// Default samples per axis.
const DEFAULT_STEPS: usize = 16;
const DEFAULT_FPS: f64 = 60.0;
/// Default wall-clock budget of one run.
const DEFAULT_DURATION_SECS: f64 = 30.0;
/// Default blend factor of the advection step.
const DEFAULT_INTERPOLATION: f64 = 0.05;
const DEFAULT_FPS_RESISTANCE: f64 = 1.0;
/// Default lookup cache cell size in screen pixels.
const DEFAULT_CACHE_RESOLUTION_PX: f64 = 1.0;
const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 200;
const DEFAULT_PARTICLE_SPEED: f64 = 1.0;
const DEFAULT_PARTICLE_SIZE: f64 = 2.0;
const DEFAULT_SEED: u64 = 42;

/// Reproducible configuration of one simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub pattern: Pattern,
    /// Field-space side length (`cols == rows`).
    pub field_size: usize,
    /// Samples per axis; must be a power of two.
    pub steps: usize,
    pub fps: f64,
    pub duration_secs: f64,
    /// Advection blend factor in [0, 1].
    pub interpolation: f64,
    /// Per-frame resistance constant; multiplied by the scale factor.
    pub fps_resistance: f64,
    pub metric: Metric,
    pub strategy: Strategy,
    pub cache_enabled: bool,
    pub cache_resolution_px: f64,
    pub resize_debounce_ms: u64,
    pub particle_speed: f64,
    pub particle_size: f64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            pattern: Pattern::Sinusoidal,
            field_size: DEFAULT_FIELD_SIZE,
            steps: DEFAULT_STEPS,
            fps: DEFAULT_FPS,
            duration_secs: DEFAULT_DURATION_SECS,
            interpolation: DEFAULT_INTERPOLATION,
            fps_resistance: DEFAULT_FPS_RESISTANCE,
            metric: Metric::Euclidean,
            strategy: Strategy::Grid,
            cache_enabled: true,
            cache_resolution_px: DEFAULT_CACHE_RESOLUTION_PX,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
            particle_speed: DEFAULT_PARTICLE_SPEED,
            particle_size: DEFAULT_PARTICLE_SIZE,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimulationConfig {
    /// Overlays the keys present in a JSON params object onto the
    /// defaults.
    ///
    /// Scalars of the wrong JSON type fall back to the default; pattern,
    /// metric and strategy names that do not parse are errors.
    pub fn from_json(params: &Value) -> Result<Self, FlowError> {
        Self::default().merged(params)
    }

    /// Returns a copy with the keys present in `params` overriding `self`.
    pub fn merged(&self, params: &Value) -> Result<Self, FlowError> {
        Ok(Self {
            pattern: param_parsed(params, "pattern", self.pattern)?,
            field_size: param_usize(params, "field_size", self.field_size),
            steps: param_usize(params, "steps", self.steps),
            fps: param_f64(params, "fps", self.fps),
            duration_secs: param_f64(params, "duration_secs", self.duration_secs),
            interpolation: param_f64(params, "interpolation", self.interpolation),
            fps_resistance: param_f64(params, "fps_resistance", self.fps_resistance),
            metric: param_parsed(params, "metric", self.metric)?,
            strategy: param_parsed(params, "strategy", self.strategy)?,
            cache_enabled: param_bool(params, "cache_enabled", self.cache_enabled),
            cache_resolution_px: param_f64(
                params,
                "cache_resolution_px",
                self.cache_resolution_px,
            ),
            resize_debounce_ms: param_u64(params, "resize_debounce_ms", self.resize_debounce_ms),
            particle_speed: param_f64(params, "particle_speed", self.particle_speed),
            particle_size: param_f64(params, "particle_size", self.particle_size),
            seed: param_u64(params, "seed", self.seed),
        })
    }

    /// Checks field shape and numeric ranges.
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.field_size == 0 {
            return Err(FlowError::InvalidDimensions);
        }
        if !self.steps.is_power_of_two() {
            return Err(FlowError::InvalidSteps(self.steps));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(FlowError::InvalidConfig(format!(
                "fps must be positive, got {}",
                self.fps
            )));
        }
        if !(self.duration_secs.is_finite() && self.duration_secs >= 0.0) {
            return Err(FlowError::InvalidConfig(format!(
                "duration_secs must be non-negative, got {}",
                self.duration_secs
            )));
        }
        if !(0.0..=1.0).contains(&self.interpolation) {
            return Err(FlowError::InvalidConfig(format!(
                "interpolation must be in [0, 1], got {}",
                self.interpolation
            )));
        }
        if !self.fps_resistance.is_finite() {
            return Err(FlowError::InvalidConfig(format!(
                "fps_resistance must be finite, got {}",
                self.fps_resistance
            )));
        }
        if !(self.cache_resolution_px.is_finite() && self.cache_resolution_px > 0.0) {
            return Err(FlowError::InvalidConfig(format!(
                "cache_resolution_px must be positive, got {}",
                self.cache_resolution_px
            )));
        }
        Ok(())
    }

    /// Number of frames the run may execute: `round(fps * duration_secs)`.
    pub fn tick_limit(&self) -> u64 {
        (self.fps * self.duration_secs).round() as u64
    }

    pub fn lookup_options(&self) -> LookupOptions {
        LookupOptions {
            metric: self.metric,
            strategy: self.strategy,
        }
    }
}

//! Spatial lookup: nearest field point to a field-space position.
//!
//! Two strategies produce the same answer on a generated [`Field`]:
//!
//! - [`Strategy::Scan`] walks every point and keeps the strict minimum, so
//!   ties go to the first point in row-major order. O(steps²).
//! - [`Strategy::Grid`] exploits the regular layout and rounds each axis to
//!   its nearest sample, breaking exact midpoints toward the lower index.
//!   On a product grid the per-axis nearest sample is the nearest point
//!   under both metrics, and lower-index ties on each axis pick the first
//!   point in row-major order. O(1).
//!
//! [`LookupCache`] memoizes results by a quantized position key.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::field::{Field, FieldPoint};
use crate::pattern::FlowVector;

/// Distance metric used to rank field points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    #[default]
    Euclidean,
    Manhattan,
}

impl Metric {
    /// Distance for an offset `(dx, dy)`.
    pub fn distance(self, dx: f64, dy: f64) -> f64 {
        match self {
            Metric::Euclidean => dx.hypot(dy),
            Metric::Manhattan => dx.abs() + dy.abs(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Metric::Euclidean => "euclidean",
            Metric::Manhattan => "manhattan",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" => Ok(Metric::Euclidean),
            "manhattan" => Ok(Metric::Manhattan),
            _ => Err(FlowError::InvalidMetric(s.to_string())),
        }
    }
}

/// How the nearest point is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Linear scan over all points.
    Scan,
    /// Direct index arithmetic on the regular grid.
    #[default]
    Grid,
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Scan => "scan",
            Strategy::Grid => "grid",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scan" => Ok(Strategy::Scan),
            "grid" => Ok(Strategy::Grid),
            _ => Err(FlowError::InvalidStrategy(s.to_string())),
        }
    }
}

/// Metric and strategy for a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LookupOptions {
    pub metric: Metric,
    pub strategy: Strategy,
}

/// Result of a lookup: the matched point, its index in
/// [`Field::points`], and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub index: usize,
    pub point: FieldPoint,
    pub distance: f64,
}

impl Nearest {
    /// The matched point's flow vector.
    pub fn flow(&self) -> FlowVector {
        self.point.flow()
    }
}

/// Finds the field point nearest to field-space `(x, y)`.
///
/// `NaN` coordinates do not panic; the returned point is unspecified
/// beyond being a valid member of the field.
pub fn nearest(field: &Field, x: f64, y: f64, options: LookupOptions) -> Nearest {
    match options.strategy {
        Strategy::Scan => scan(field, x, y, options.metric),
        Strategy::Grid => grid(field, x, y, options.metric),
    }
}

fn scan(field: &Field, x: f64, y: f64, metric: Metric) -> Nearest {
    let points = field.points();
    let first = points[0];
    let mut best = Nearest {
        index: 0,
        point: first,
        distance: metric.distance(first.x - x, first.y - y),
    };
    for (index, p) in points.iter().enumerate().skip(1) {
        let d = metric.distance(p.x - x, p.y - y);
        if d < best.distance {
            best = Nearest {
                index,
                point: *p,
                distance: d,
            };
        }
    }
    best
}

fn grid(field: &Field, x: f64, y: f64, metric: Metric) -> Nearest {
    let steps = field.steps();
    let j = axis_index(x, field.step(), steps);
    let i = axis_index(y, field.step(), steps);
    let index = i * steps + j;
    let point = field.points()[index];
    Nearest {
        index,
        point,
        distance: metric.distance(point.x - x, point.y - y),
    }
}

/// Nearest sample index along one axis, ties toward the lower index.
fn axis_index(c: f64, step: f64, steps: usize) -> usize {
    let k = (c / step - 0.5).ceil();
    // Also catches NaN.
    if !(k > 0.0) {
        return 0;
    }
    (k as usize).min(steps - 1)
}

/// Hit/miss counters and current size of a [`LookupCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoizes lookups keyed by position quantized to `quantum` field-space
/// units.
///
/// A hit returns the result of the first query that landed in the same
/// quantization cell, so it matches a fresh search only up to the
/// quantum. Must be cleared whenever the field or scale factor changes.
#[derive(Debug, Clone)]
pub struct LookupCache {
    quantum: f64,
    entries: HashMap<(i64, i64), Nearest>,
    hits: u64,
    misses: u64,
}

impl LookupCache {
    /// Creates an empty cache with the given cell size.
    pub fn new(quantum: f64) -> Self {
        Self {
            quantum,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Cache whose cells span `resolution_px` screen pixels at
    /// `scale_factor` pixels per field-space unit.
    pub fn for_scale(resolution_px: f64, scale_factor: f64) -> Self {
        Self::new(resolution_px / scale_factor)
    }

    /// Field-space cell size.
    pub fn quantum(&self) -> f64 {
        self.quantum
    }

    /// Quantized key for `(x, y)`, or `None` for non-finite positions,
    /// which are never cached.
    pub fn key(&self, x: f64, y: f64) -> Option<(i64, i64)> {
        let kx = (x / self.quantum).round();
        let ky = (y / self.quantum).round();
        if kx.is_finite() && ky.is_finite() {
            Some((kx as i64, ky as i64))
        } else {
            None
        }
    }

    /// Drops every entry and resets the counters.
    pub fn clear(&mut self) {
        log::debug!("lookup cache cleared ({} entries)", self.entries.len());
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Switches to a new cell size. Existing entries are invalid under the
    /// new quantization and are dropped.
    pub fn rescale(&mut self, quantum: f64) {
        self.quantum = quantum;
        self.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

/// Nearest-point lookup, memoized through `cache` when one is given.
pub fn lookup(
    field: &Field,
    cache: Option<&mut LookupCache>,
    x: f64,
    y: f64,
    options: LookupOptions,
) -> Nearest {
    let Some(cache) = cache else {
        return nearest(field, x, y, options);
    };
    let Some(key) = cache.key(x, y) else {
        return nearest(field, x, y, options);
    };
    if let Some(hit) = cache.entries.get(&key).copied() {
        cache.hits += 1;
        return hit;
    }
    cache.misses += 1;
    let found = nearest(field, x, y, options);
    cache.entries.insert(key, found);
    found
}

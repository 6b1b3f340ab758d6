//! Discretized vector field built from a pattern over a square grid.
//!
//! A `Field` holds `steps * steps` points in row-major order. Row `i`,
//! column `j` sits at field-space `(x, y) = (j * step, i * step)` with
//! `step = rows / steps`. Fields are never mutated: a pattern or shape
//! change builds a new one.

use serde::Serialize;

use crate::error::FlowError;
use crate::pattern::{FlowVector, Pattern};

/// One sample of the field: a field-space coordinate and its flow vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldPoint {
    pub x: f64,
    pub y: f64,
    pub u: f64,
    pub v: f64,
}

impl FieldPoint {
    /// The flow vector at this point.
    pub fn flow(&self) -> FlowVector {
        FlowVector::new(self.u, self.v)
    }
}

/// A square grid of field points generated from a [`Pattern`].
#[derive(Debug, Clone)]
pub struct Field {
    cols: usize,
    rows: usize,
    steps: usize,
    step: f64,
    pattern: Pattern,
    points: Vec<FieldPoint>,
}

impl Field {
    /// Builds the field for `pattern` over a `cols x rows` field-space
    /// extent sampled at `steps` points per axis.
    ///
    /// Returns `FlowError::InvalidSteps` if `steps` is not a positive power
    /// of two, `FlowError::NonSquareGrid` if `cols != rows`, and
    /// `FlowError::InvalidDimensions` if `rows` is zero or `steps²`
    /// overflows.
    pub fn generate(
        cols: usize,
        rows: usize,
        steps: usize,
        pattern: Pattern,
    ) -> Result<Self, FlowError> {
        if !steps.is_power_of_two() {
            return Err(FlowError::InvalidSteps(steps));
        }
        if cols != rows {
            return Err(FlowError::NonSquareGrid { cols, rows });
        }
        if rows == 0 {
            return Err(FlowError::InvalidDimensions);
        }
        let len = steps
            .checked_mul(steps)
            .ok_or(FlowError::InvalidDimensions)?;

        let step = rows as f64 / steps as f64;
        let samples: Vec<f64> = (0..steps).map(|k| k as f64 * step).collect();

        let mut points = Vec::with_capacity(len);
        for &y in &samples {
            for &x in &samples {
                let flow = pattern.evaluate(x, y);
                points.push(FieldPoint {
                    x,
                    y,
                    u: flow.u,
                    v: flow.v,
                });
            }
        }
        debug_assert_eq!(points.len(), len);

        log::debug!(
            "generated {pattern} field: {cols}x{rows}, {steps} steps/axis, {len} points, step {step}"
        );

        Ok(Self {
            cols,
            rows,
            steps,
            step,
            pattern,
            points,
        })
    }

    /// Field-space width.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Field-space height.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Samples per axis.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Field-space spacing between neighbouring samples.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// The pattern the field was generated from.
    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    /// All points in row-major order.
    pub fn points(&self) -> &[FieldPoint] {
        &self.points
    }

    /// Point at grid row `i`, column `j`, if in range.
    pub fn point_at(&self, i: usize, j: usize) -> Option<&FieldPoint> {
        if i >= self.steps || j >= self.steps {
            return None;
        }
        self.points.get(i * self.steps + j)
    }

    /// Smallest and largest flow magnitude over all points, ignoring `NaN`.
    ///
    /// Returns `None` when no point has a comparable magnitude.
    pub fn magnitude_range(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .map(|p| p.flow().magnitude())
            .filter(|m| !m.is_nan())
            .fold(None, |acc, m| match acc {
                None => Some((m, m)),
                Some((lo, hi)) => Some((lo.min(m), hi.max(m))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generate_two_steps_has_four_points_in_row_major_order() {
        let field = Field::generate(2, 2, 2, Pattern::Sinusoidal).unwrap();
        let coords: Vec<(f64, f64)> = field.points().iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(coords, vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
    }

    #[test]
    fn generate_applies_pattern_to_each_point() {
        let field = Field::generate(8, 8, 4, Pattern::InverseSinusoidal).unwrap();
        for p in field.points() {
            let expected = Pattern::InverseSinusoidal.evaluate(p.x, p.y);
            assert_eq!(p.flow(), expected);
        }
    }

    #[test]
    fn step_is_rows_over_steps() {
        let field = Field::generate(16, 16, 4, Pattern::Clockwise).unwrap();
        assert!((field.step() - 4.0).abs() < f64::EPSILON);
        let last = field.points().last().unwrap();
        assert_eq!((last.x, last.y), (12.0, 12.0));
    }

    #[test]
    fn generate_rejects_non_power_of_two_steps() {
        for steps in [0, 3, 6, 12] {
            let result = Field::generate(8, 8, steps, Pattern::Sinusoidal);
            assert!(
                matches!(result, Err(FlowError::InvalidSteps(s)) if s == steps),
                "steps = {steps}"
            );
        }
    }

    #[test]
    fn generate_rejects_non_square_grid() {
        let result = Field::generate(8, 10, 4, Pattern::Sinusoidal);
        assert!(matches!(
            result,
            Err(FlowError::NonSquareGrid { cols: 8, rows: 10 })
        ));
    }

    #[test]
    fn generate_rejects_zero_extent() {
        let result = Field::generate(0, 0, 4, Pattern::Sinusoidal);
        assert!(matches!(result, Err(FlowError::InvalidDimensions)));
    }

    #[test]
    fn generate_rejects_overflowing_point_count() {
        let steps = 1_usize << (usize::BITS / 2);
        let result = Field::generate(4, 4, steps, Pattern::Sinusoidal);
        assert!(matches!(result, Err(FlowError::InvalidDimensions)));
    }

    #[test]
    fn point_at_matches_row_major_index() {
        let field = Field::generate(8, 8, 8, Pattern::Sinusoidal).unwrap();
        let p = field.point_at(3, 5).unwrap();
        assert_eq!((p.x, p.y), (5.0, 3.0));
        assert!(field.point_at(8, 0).is_none());
    }

    #[test]
    fn magnitude_range_of_sinusoidal_is_within_sqrt_two() {
        let field = Field::generate(16, 16, 16, Pattern::Sinusoidal).unwrap();
        let (lo, hi) = field.magnitude_range().unwrap();
        assert!(lo >= 0.0 && hi <= 2.0_f64.sqrt() + 1e-12, "({lo}, {hi})");
        assert!(lo <= hi);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn point_count_is_steps_squared(
                exp in 0_u32..7,
                size in 1_usize..64,
                idx in 0_usize..4,
            ) {
                let steps = 1_usize << exp;
                let field = Field::generate(size, size, steps, Pattern::ALL[idx]).unwrap();
                prop_assert_eq!(field.points().len(), steps * steps);
                prop_assert!(field.points().len().is_power_of_two());
            }

            #[test]
            fn every_coordinate_pair_appears_once(exp in 0_u32..6, size in 1_usize..32) {
                let steps = 1_usize << exp;
                let field = Field::generate(size, size, steps, Pattern::Sinusoidal).unwrap();
                let unique: HashSet<(u64, u64)> = field
                    .points()
                    .iter()
                    .map(|p| (p.x.to_bits(), p.y.to_bits()))
                    .collect();
                prop_assert_eq!(unique.len(), steps * steps);
            }
        }
    }
}

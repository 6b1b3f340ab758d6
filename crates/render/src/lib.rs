#![deny(unsafe_code)]
//! CPU rendering sink for the flow-field simulator.
//!
//! [`RasterSink`] implements [`RenderSink`] on an RGBA8 [`Raster`]: the field
//! is drawn as one short arrow per point, shaded by flow magnitude, and the
//! particle leaves a trail of dots with the matched field point
//! highlighted. PNG output lives in [`snapshot`] behind the `png` feature.

pub mod raster;

#[cfg(feature = "png")]
pub mod snapshot;

use flowfield_core::interp::remap;
use flowfield_core::{Field, FieldPoint, FlowError, Particle, RenderSink};

pub use raster::{Raster, Rgba};

pub const BACKGROUND: Rgba = [12, 14, 22, 255];
pub const PARTICLE: Rgba = [255, 196, 64, 255];
pub const MATCHED: Rgba = [96, 208, 255, 255];

/// Dimmest and brightest arrow channel values.
const ARROW_MIN: f64 = 80.0;
const ARROW_MAX: f64 = 255.0;
/// Arrow length as a fraction of the grid spacing.
const ARROW_FRACTION: f64 = 0.4;

/// Brightness of an arrow of magnitude `mag` within `[lo, hi]`.
///
/// A degenerate range (every arrow the same length) has no meaningful
/// position, so it draws at full brightness.
pub fn arrow_shade(mag: f64, lo: f64, hi: f64) -> u8 {
    let level = remap(mag, lo, hi, ARROW_MIN, ARROW_MAX);
    if level.is_finite() {
        level.clamp(0.0, 255.0).round() as u8
    } else {
        ARROW_MAX as u8
    }
}

/// [`RenderSink`] that rasterizes into an in-memory RGBA buffer.
#[derive(Debug, Clone)]
pub struct RasterSink {
    raster: Raster,
    scale_factor: f64,
    frames: u64,
}

impl RasterSink {
    pub fn new(width: u32, height: u32) -> Result<Self, FlowError> {
        let mut raster = Raster::new(width, height)?;
        raster.fill(BACKGROUND);
        Ok(Self {
            raster,
            scale_factor: 1.0,
            frames: 0,
        })
    }

    /// Replaces the buffer with a blank one of the new size. The next
    /// `draw_field` repaints it.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), FlowError> {
        self.raster = Raster::new(width, height)?;
        self.raster.fill(BACKGROUND);
        Ok(())
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Particle frames drawn since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderSink for RasterSink {
    fn draw_field(&mut self, field: &Field, scale_factor: f64) {
        self.raster.fill(BACKGROUND);
        self.scale_factor = scale_factor;

        let (lo, hi) = field.magnitude_range().unwrap_or((0.0, 0.0));
        let length = field.step() * scale_factor * ARROW_FRACTION;
        for p in field.points() {
            let flow = p.flow();
            let mag = flow.magnitude();
            if !mag.is_finite() || mag == 0.0 {
                continue;
            }
            let shade = arrow_shade(mag, lo, hi);
            let (sx, sy) = (p.x * scale_factor, p.y * scale_factor);
            let (ex, ey) = (sx + flow.u / mag * length, sy + flow.v / mag * length);
            self.raster.line(sx, sy, ex, ey, [shade, shade, shade, 255]);
        }
    }

    fn draw_particle(&mut self, particle: &Particle, matched: Option<&FieldPoint>) {
        if let Some(m) = matched {
            self.raster.dot(
                m.x * self.scale_factor,
                m.y * self.scale_factor,
                1.0,
                MATCHED,
            );
        }
        self.raster
            .dot(particle.x, particle.y, particle.size / 2.0, PARTICLE);
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowfield_core::{Extent, Pattern, QueuedFrameHost, Scheduler, SimulationConfig};

    #[test]
    fn arrow_shade_spans_range() {
        assert_eq!(arrow_shade(0.0, 0.0, 2.0), 80);
        assert_eq!(arrow_shade(2.0, 0.0, 2.0), 255);
    }

    #[test]
    fn arrow_shade_with_degenerate_range_is_full_brightness() {
        assert_eq!(arrow_shade(1.0, 1.0, 1.0), 255);
        assert_eq!(arrow_shade(f64::NAN, 0.0, 1.0), 255);
    }

    #[test]
    fn new_sink_is_background() {
        let sink = RasterSink::new(4, 4).unwrap();
        assert_eq!(sink.raster().pixel(0, 0), Some(BACKGROUND));
        assert_eq!(sink.frames(), 0);
    }

    #[test]
    fn draw_field_paints_arrows() {
        let field = Field::generate(8, 8, 8, Pattern::Sinusoidal).unwrap();
        let mut sink = RasterSink::new(64, 64).unwrap();
        sink.draw_field(&field, 8.0);
        // Arrows start at each grid point.
        let origin = sink.raster().pixel(0, 0).unwrap();
        assert_ne!(origin, BACKGROUND);
    }

    #[test]
    fn draw_particle_marks_position_and_match() {
        let field = Field::generate(8, 8, 8, Pattern::Clockwise).unwrap();
        let mut sink = RasterSink::new(64, 64).unwrap();
        sink.draw_field(&field, 8.0);
        let matched = field.point_at(2, 3).unwrap();
        let particle = Particle::new(40.5, 40.5, 1.0, 4.0);
        sink.draw_particle(&particle, Some(matched));
        assert_eq!(sink.raster().pixel(40, 40), Some(PARTICLE));
        assert_eq!(sink.raster().pixel(24, 16), Some(MATCHED));
        assert_eq!(sink.frames(), 1);
    }

    #[test]
    fn resize_reallocates_buffer() {
        let mut sink = RasterSink::new(4, 4).unwrap();
        sink.resize(8, 2).unwrap();
        assert_eq!(sink.raster().width(), 8);
        assert_eq!(sink.raster().height(), 2);
        assert!(sink.resize(0, 2).is_err());
    }

    #[test]
    fn drives_full_simulation() {
        let config = SimulationConfig {
            fps: 10.0,
            duration_secs: 2.0,
            ..SimulationConfig::default()
        };
        let mut scheduler = Scheduler::new(config, Extent::new(128.0, 128.0)).unwrap();
        let mut host = QueuedFrameHost::new();
        let mut sink = RasterSink::new(128, 128).unwrap();
        scheduler.start(&mut host, &mut sink);
        while host.next_frame().is_some() {
            scheduler.on_frame(&mut host, &mut sink);
        }
        assert_eq!(sink.frames(), 20);
    }
}

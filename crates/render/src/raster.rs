//! RGBA8 pixel buffer with the few primitives the sink needs.
//!
//! Always available (no feature gate) so the PNG path and any other host
//! can share the same buffer.

use flowfield_core::FlowError;

/// An RGBA color.
pub type Rgba = [u8; 4];

/// Row-major RGBA8 buffer. Writes outside the buffer are dropped.
#[derive(Debug, Clone)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    /// Creates a transparent black raster.
    ///
    /// Returns `FlowError::InvalidDimensions` if either side is zero or the
    /// byte length overflows `usize`.
    pub fn new(width: u32, height: u32) -> Result<Self, FlowError> {
        if width == 0 || height == 0 {
            return Err(FlowError::InvalidDimensions);
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or(FlowError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Paints every pixel with `color`.
    pub fn fill(&mut self, color: Rgba) {
        self.data
            .chunks_exact_mut(4)
            .for_each(|px| px.copy_from_slice(&color));
    }

    fn offset(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    /// Sets one pixel; ignored when out of bounds.
    pub fn put(&mut self, x: i64, y: i64, color: Rgba) {
        if let Some(i) = self.offset(x, y) {
            self.data[i..i + 4].copy_from_slice(&color);
        }
    }

    /// Reads one pixel.
    pub fn pixel(&self, x: i64, y: i64) -> Option<Rgba> {
        self.offset(x, y)
            .map(|i| [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Filled disc centred at `(cx, cy)`. Non-finite centres draw nothing.
    pub fn dot(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba) {
        if !(cx.is_finite() && cy.is_finite() && radius.is_finite()) {
            return;
        }
        let r = radius.max(0.5);
        let (x0, x1) = ((cx - r).floor() as i64, (cx + r).ceil() as i64);
        let (y0, y1) = ((cy - r).floor() as i64, (cy + r).ceil() as i64);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r * r {
                    self.put(x, y, color);
                }
            }
        }
    }

    /// Straight segment by DDA stepping. Non-finite endpoints draw nothing.
    pub fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba) {
        if ![x0, y0, x1, y1].iter().all(|c| c.is_finite()) {
            return;
        }
        let (dx, dy) = (x1 - x0, y1 - y0);
        let n = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for k in 0..=n {
            let t = k as f64 / n as f64;
            let x = x0 + dx * t;
            let y = y0 + dy * t;
            self.put(x.floor() as i64, y.floor() as i64, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = [255, 0, 0, 255];

    #[test]
    fn new_allocates_four_bytes_per_pixel() {
        let r = Raster::new(8, 4).unwrap();
        assert_eq!(r.data().len(), 8 * 4 * 4);
        assert!(r.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn new_rejects_zero_side() {
        assert!(matches!(Raster::new(0, 4), Err(FlowError::InvalidDimensions)));
        assert!(matches!(Raster::new(4, 0), Err(FlowError::InvalidDimensions)));
    }

    #[test]
    fn fill_and_put() {
        let mut r = Raster::new(3, 3).unwrap();
        r.fill([1, 2, 3, 255]);
        r.put(1, 2, RED);
        assert_eq!(r.pixel(0, 0), Some([1, 2, 3, 255]));
        assert_eq!(r.pixel(1, 2), Some(RED));
    }

    #[test]
    fn out_of_bounds_writes_are_dropped() {
        let mut r = Raster::new(2, 2).unwrap();
        r.put(-1, 0, RED);
        r.put(2, 0, RED);
        r.put(0, 5, RED);
        assert!(r.data().iter().all(|&b| b == 0));
        assert_eq!(r.pixel(2, 0), None);
    }

    #[test]
    fn line_covers_both_endpoints() {
        let mut r = Raster::new(10, 10).unwrap();
        r.line(1.0, 1.0, 8.0, 5.0, RED);
        assert_eq!(r.pixel(1, 1), Some(RED));
        assert_eq!(r.pixel(8, 5), Some(RED));
    }

    #[test]
    fn dot_marks_centre_pixel() {
        let mut r = Raster::new(10, 10).unwrap();
        r.dot(4.5, 4.5, 2.0, RED);
        assert_eq!(r.pixel(4, 4), Some(RED));
        assert_eq!(r.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn non_finite_geometry_draws_nothing() {
        let mut r = Raster::new(4, 4).unwrap();
        r.dot(f64::NAN, 1.0, 2.0, RED);
        r.line(0.0, 0.0, f64::INFINITY, 1.0, RED);
        assert!(r.data().iter().all(|&b| b == 0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn drawing_never_panics(
                x0 in -100.0_f64..100.0,
                y0 in -100.0_f64..100.0,
                x1 in -100.0_f64..100.0,
                y1 in -100.0_f64..100.0,
                radius in 0.0_f64..10.0,
            ) {
                let mut r = Raster::new(16, 16).unwrap();
                r.line(x0, y0, x1, y1, RED);
                r.dot(x0, y0, radius, RED);
                prop_assert_eq!(r.data().len(), 16 * 16 * 4);
            }
        }
    }
}

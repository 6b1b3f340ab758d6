//! PNG output of a [`Raster`].
//!
//! Feature-gated behind `png` (default on) so hosts that only need the
//! in-memory buffer do not pull in the `image` crate.

use std::path::Path;

use flowfield_core::FlowError;

use crate::raster::Raster;

/// Writes the raster as an RGBA PNG.
///
/// Returns `FlowError::Io` on encode or write failure.
pub fn write_png(raster: &Raster, path: &Path) -> Result<(), FlowError> {
    let img = image::RgbaImage::from_raw(raster.width(), raster.height(), raster.data().to_vec())
        .ok_or_else(|| FlowError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path)
        .map_err(|e| FlowError::Io(format!("{}: {e}", path.display())))
}

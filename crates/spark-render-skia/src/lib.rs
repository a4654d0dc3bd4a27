// File: crates/spark-render-skia/src/lib.rs
// Summary: Skia raster backend for the sparkline engine, plus the startup probe that picks a backend.

pub mod raster;
pub mod text;

use spark_core::surface::{SurfaceProvider, VectorProvider};

pub use raster::{RasterProvider, RasterSurface};
pub use text::TextShaper;

/// Pick the backend once at startup: raster when a CPU surface can be created, vector otherwise.
pub fn probe() -> Box<dyn SurfaceProvider> {
    if RasterProvider::available() {
        log::debug!("backend probe: skia raster");
        Box::new(RasterProvider)
    } else {
        log::debug!("backend probe: raster unavailable, using vector markup");
        Box::new(VectorProvider)
    }
}

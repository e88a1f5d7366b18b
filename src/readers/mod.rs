pub mod raster;
pub mod registry;

pub use raster::{GdalReader, RasterReader, RasterScan};
pub use registry::TowerRegistry;

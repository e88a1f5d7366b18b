use crate::error::{IngestError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use gdal::raster::Buffer;
use gdal::{Dataset, Metadata};
use std::path::Path;

/// One raster file reduced to the raw cell values at the sampled points.
#[derive(Debug, Clone)]
pub struct RasterScan {
    /// Band descriptions in ascending band order, format `YYYY-MM-DD_HH`.
    pub band_labels: Vec<String>,
    /// Parsed from the first band's description.
    pub base_time: NaiveDateTime,
    /// `samples[band][point]`: raw values in input point order, one inner
    /// vector per band up to the band cap.
    pub samples: Vec<Vec<f64>>,
}

impl RasterScan {
    pub fn band_count(&self) -> usize {
        self.samples.len()
    }
}

/// Raster access seam. The production implementation is GDAL-backed;
/// tests substitute an in-memory reader.
pub trait RasterReader: Send + Sync {
    /// Open the raster at `path` and extract raw values for every band
    /// (up to `max_bands`) at each (lon, lat) coordinate, preserving
    /// coordinate order.
    fn read(&self, path: &Path, coords: &[(f64, f64)], max_bands: usize) -> Result<RasterScan>;
}

/// GDAL-backed reader for GeoTIFF forecast products.
pub struct GdalReader;

impl RasterReader for GdalReader {
    fn read(&self, path: &Path, coords: &[(f64, f64)], max_bands: usize) -> Result<RasterScan> {
        let display = path.display().to_string();
        let dataset = Dataset::open(path)?;

        // Hard cap on per-file work; bands past the cap are never read.
        let band_count = dataset.raster_count().min(max_bands);

        let mut band_labels = Vec::with_capacity(band_count);
        for band_index in 1..=band_count {
            band_labels.push(dataset.rasterband(band_index)?.description()?);
        }

        let base_label = band_labels
            .first()
            .filter(|label| !label.trim().is_empty())
            .ok_or_else(|| IngestError::MalformedRaster {
                path: display.clone(),
                message: "raster exposes no band descriptions".to_string(),
            })?;

        let base_time =
            parse_band_time(base_label).ok_or_else(|| IngestError::MalformedRaster {
                path: display.clone(),
                message: format!("cannot parse base time from description '{base_label}'"),
            })?;

        let geo_transform = dataset.geo_transform()?;
        let (width, height) = dataset.raster_size();

        // Resolved once per file; the grid geometry is invariant across bands.
        let pixels = resolve_pixels(&geo_transform, (width, height), coords, &display)?;

        // All capped bands are pulled into memory before extraction,
        // trading memory for a single I/O pass.
        let mut buffers: Vec<Buffer<f64>> = Vec::with_capacity(band_count);
        for band_index in 1..=band_count {
            let band = dataset.rasterband(band_index)?;
            buffers.push(band.read_as::<f64>((0, 0), (width, height), (width, height), None)?);
        }

        let samples = buffers
            .iter()
            .map(|buffer| extract_at(buffer.data(), width, &pixels))
            .collect();

        Ok(RasterScan {
            band_labels,
            base_time,
            samples,
        })
    }
}

/// Parse a band description of the form `YYYY-MM-DD_HH`.
pub fn parse_band_time(label: &str) -> Option<NaiveDateTime> {
    let (date, hour) = label.trim().split_once('_')?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let hour: u32 = hour.parse().ok()?;
    date.and_hms_opt(hour, 0, 0)
}

/// Map (lon, lat) coordinates to integer (row, col) pixel indices by
/// inverting the affine geotransform. Fails if the transform is
/// degenerate or any point falls outside the grid; either condition is
/// fatal to the current file.
pub fn resolve_pixels(
    geo_transform: &[f64; 6],
    size: (usize, usize),
    coords: &[(f64, f64)],
    path: &str,
) -> Result<Vec<(usize, usize)>> {
    let [origin_x, pixel_width, row_rot, origin_y, col_rot, pixel_height] = *geo_transform;
    let (width, height) = size;

    let det = pixel_width * pixel_height - row_rot * col_rot;
    if det.abs() < f64::EPSILON {
        return Err(IngestError::CoordinateResolution {
            path: path.to_string(),
            message: "degenerate geotransform (zero determinant)".to_string(),
        });
    }

    let mut pixels = Vec::with_capacity(coords.len());
    for &(lon, lat) in coords {
        let dx = lon - origin_x;
        let dy = lat - origin_y;

        let col = ((dx * pixel_height - dy * row_rot) / det).floor();
        let row = ((dy * pixel_width - dx * col_rot) / det).floor();

        if col < 0.0 || row < 0.0 || col >= width as f64 || row >= height as f64 {
            return Err(IngestError::CoordinateResolution {
                path: path.to_string(),
                message: format!(
                    "point ({lon}, {lat}) resolves to pixel ({row}, {col}) outside the {width}x{height} grid"
                ),
            });
        }

        pixels.push((row as usize, col as usize));
    }

    Ok(pixels)
}

/// Pull values out of a row-major band buffer at the given (row, col)
/// indices, preserving index order.
pub fn extract_at(band_data: &[f64], width: usize, pixels: &[(usize, usize)]) -> Vec<f64> {
    pixels
        .iter()
        .map(|&(row, col)| band_data[row * width + col])
        .collect()
}

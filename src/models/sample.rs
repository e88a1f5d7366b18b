use serde::{Deserialize, Serialize};

/// One decoded value for a (tower, band) pair, queued for ingestion.
///
/// `band_time` is the raster's band description and doubles as the
/// forecast timestamp of the value; it is kept as a single field with two
/// consumers to avoid the two drifting apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub tower_serial: String,
    pub file_name: String,
    /// 1-based band index within the raster file.
    pub band: i32,
    /// Band description, format `YYYY-MM-DD_HH`.
    pub band_time: String,
    pub value: f32,
}

impl SampleRecord {
    pub fn new(
        tower_serial: impl Into<String>,
        file_name: impl Into<String>,
        band: i32,
        band_time: impl Into<String>,
        value: f32,
    ) -> Self {
        Self {
            tower_serial: tower_serial.into(),
            file_name: file_name.into(),
            band,
            band_time: band_time.into(),
            value,
        }
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A transmission-line tower as fetched from the registry. Coordinates
/// come from an external feed and may be missing or malformed; only
/// towers with geodetically valid positions are eligible for sampling.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, FromRow)]
pub struct Tower {
    pub serial: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

impl Tower {
    pub fn new(serial: impl Into<String>, latitude: Option<f64>, longitude: Option<f64>) -> Self {
        Self {
            serial: serial.into(),
            latitude,
            longitude,
        }
    }

    /// The (lon, lat) pair used to sample rasters, or `None` when either
    /// coordinate is missing, non-finite, or out of bounds.
    pub fn sampling_coords(&self) -> Option<(f64, f64)> {
        let lat = self.latitude.filter(|v| v.is_finite())?;
        let lon = self.longitude.filter(|v| v.is_finite())?;

        if self.validate().is_err() {
            return None;
        }

        Some((lon, lat))
    }
}

/// Decode scale for raster cell values (stored as decivalues)
pub const VALUE_SCALE: f64 = 0.1;

/// Offset applied to wind direction before wrapping into a compass bearing
pub const WIND_DIRECTION_OFFSET: f64 = 180.0;

/// Full circle, for the wind direction wrap
pub const DEGREES_IN_CIRCLE: f64 = 360.0;

/// Band description / forecast time label format
pub const BAND_TIME_FORMAT: &str = "%Y-%m-%d_%H";

/// Processing defaults
pub const DEFAULT_MAX_BANDS: usize = 6;
pub const DEFAULT_BATCH_SIZE: usize = 100_000;
pub const DEFAULT_MAX_DB_CONNECTIONS: u32 = 100;

/// Geographic bounds for a sampleable tower position
pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

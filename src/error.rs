use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Tower registry unavailable: {0}")]
    Registry(String),

    #[error("Raster error: {0}")]
    Raster(#[from] gdal::errors::GdalError),

    #[error("Malformed raster '{path}': {message}")]
    MalformedRaster { path: String, message: String },

    #[error("Coordinate resolution failed for '{path}': {message}")]
    CoordinateResolution { path: String, message: String },

    #[error("Persistence failure in procedure '{procedure}': {message}")]
    Persistence { procedure: String, message: String },

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl From<config::ConfigError> for IngestError {
    fn from(err: config::ConfigError) -> Self {
        IngestError::Config(err.to_string())
    }
}

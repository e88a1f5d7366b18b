use crate::error::Result;
use crate::models::DataType;
use crate::utils::constants::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_BANDS, DEFAULT_MAX_DB_CONNECTIONS};
use config::{Config, Environment, File};
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Process-wide settings, constructed once and passed by reference into
/// each worker. Pipeline code never reads the environment directly.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub raster: RasterSettings,

    /// Glob pattern per data-type key, relative to `raster.root_dir`.
    /// Data types without a pattern are skipped.
    #[serde(default)]
    pub patterns: HashMap<String, String>,

    /// Ingestion procedure overrides keyed by data-type key. An empty
    /// string disables ingestion for that type (batches are dropped with
    /// a warning).
    #[serde(default)]
    pub procedures: HashMap<String, String>,

    /// Upper bound on concurrent data-type workers. The effective worker
    /// count is also bounded by the data-type count, the CPU count, and
    /// `database.max_connections`.
    pub max_workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RasterSettings {
    /// Root directory that per-type glob patterns are resolved against.
    pub root_dir: PathBuf,

    /// Cap on bands read per raster file. Bands beyond the cap are never
    /// read or ingested.
    pub max_bands: usize,

    /// Records accumulated before a batch is flushed to the ingestion
    /// procedure.
    pub batch_size: usize,
}

impl Settings {
    /// Load settings from an optional TOML file layered under `PYLON_*`
    /// environment variables (e.g. `PYLON_DATABASE__URL`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("database.max_connections", DEFAULT_MAX_DB_CONNECTIONS as i64)?
            .set_default("raster.max_bands", DEFAULT_MAX_BANDS as i64)?
            .set_default("raster.batch_size", DEFAULT_BATCH_SIZE as i64)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(Environment::with_prefix("PYLON").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Glob pattern for a data type, if one is configured.
    pub fn pattern_for(&self, data_type: DataType) -> Option<&str> {
        self.patterns.get(data_type.key()).map(String::as_str)
    }

    /// Ingestion procedure for a data type. Falls back to the built-in
    /// procedure name; an empty override disables ingestion entirely.
    pub fn procedure_for(&self, data_type: DataType) -> Option<String> {
        match self.procedures.get(data_type.key()) {
            Some(name) if name.is_empty() => None,
            Some(name) => Some(name.clone()),
            None => Some(data_type.procedure().to_string()),
        }
    }
}

impl DatabaseSettings {
    /// Open a bounded connection pool. Workers acquire connections from
    /// the pool and release them on every exit path.
    pub async fn connect(&self) -> Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.url)
            .await?;
        Ok(pool)
    }
}

use crate::error::{IngestError, Result};
use crate::models::SampleRecord;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Destination for flushed batches. The production sink calls the
/// data type's ingestion stored procedure; tests and dry runs substitute
/// in-memory sinks.
#[async_trait]
pub trait BatchSink: Send + Sync {
    /// Persist one batch. Implementations must make the batch durable
    /// atomically: a failure must not leave a partial batch visible.
    async fn write(
        &self,
        procedure: &str,
        file_name: &str,
        base_time: NaiveDateTime,
        batch: &[SampleRecord],
    ) -> Result<()>;
}

/// Batch element as the ingestion procedures expect it. `band_description`
/// and `forecast_time` are both rendered from the record's single
/// `band_time` field.
#[derive(Serialize)]
struct WireRecord<'a> {
    tower_serial: &'a str,
    file_name: &'a str,
    band: i32,
    band_description: &'a str,
    forecast_time: &'a str,
    value: f32,
}

impl<'a> From<&'a SampleRecord> for WireRecord<'a> {
    fn from(record: &'a SampleRecord) -> Self {
        Self {
            tower_serial: &record.tower_serial,
            file_name: &record.file_name,
            band: record.band,
            band_description: &record.band_time,
            forecast_time: &record.band_time,
            value: record.value,
        }
    }
}

/// Writes batches through the per-type ingestion stored procedures.
/// Each write is one transaction: `CALL` then commit, nothing in
/// between. The procedures own upsert semantics, so retried batches are
/// safe.
pub struct PgIngestionWriter {
    pool: PgPool,
}

impl PgIngestionWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BatchSink for PgIngestionWriter {
    async fn write(
        &self,
        procedure: &str,
        file_name: &str,
        base_time: NaiveDateTime,
        batch: &[SampleRecord],
    ) -> Result<()> {
        let payload: Vec<WireRecord> = batch.iter().map(WireRecord::from).collect();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| persistence_error(procedure, &e))?;

        // Procedure names come from the closed DataType set or operator
        // configuration, never from data.
        let statement = format!("CALL {procedure}($1, $2, $3)");
        sqlx::query(&statement)
            .bind(file_name)
            .bind(base_time)
            .bind(Json(&payload))
            .execute(&mut *tx)
            .await
            .map_err(|e| persistence_error(procedure, &e))?;

        tx.commit()
            .await
            .map_err(|e| persistence_error(procedure, &e))?;

        debug!(procedure, file_name, records = batch.len(), "batch committed");
        Ok(())
    }
}

fn persistence_error(procedure: &str, err: &sqlx::Error) -> IngestError {
    IngestError::Persistence {
        procedure: procedure.to_string(),
        message: err.to_string(),
    }
}

/// Sink for dry runs: counts what would be written, persists nothing.
#[derive(Default)]
pub struct CountingSink {
    written: AtomicUsize,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records_written(&self) -> usize {
        self.written.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl BatchSink for CountingSink {
    async fn write(
        &self,
        _procedure: &str,
        _file_name: &str,
        _base_time: NaiveDateTime,
        batch: &[SampleRecord],
    ) -> Result<()> {
        self.written.fetch_add(batch.len(), Ordering::Relaxed);
        Ok(())
    }
}

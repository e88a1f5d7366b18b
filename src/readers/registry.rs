use crate::error::{IngestError, Result};
use crate::models::Tower;
use sqlx::PgPool;

/// Read-only access to the external tower registry. The pipeline never
/// writes to this table.
pub struct TowerRegistry {
    pool: PgPool,
}

impl TowerRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch all towers with non-null coordinates, ordered by serial.
    /// Called at the start of every file's processing so registry updates
    /// between files are picked up.
    pub async fn fetch_towers(&self) -> Result<Vec<Tower>> {
        sqlx::query_as::<_, Tower>(
            "SELECT tower_serial AS serial, \
                    mid_latitude AS latitude, \
                    mid_longitude AS longitude \
             FROM towers \
             WHERE mid_latitude IS NOT NULL \
               AND mid_longitude IS NOT NULL \
             ORDER BY tower_serial",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| IngestError::Registry(e.to_string()))
    }
}

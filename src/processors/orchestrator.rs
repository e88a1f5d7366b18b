use crate::config::Settings;
use crate::error::{IngestError, Result};
use crate::models::DataType;
use crate::processors::file_processor::FileProcessor;
use crate::readers::raster::RasterReader;
use crate::readers::registry::TowerRegistry;
use crate::utils::discovery::discover_files;
use crate::writers::ingestion::{BatchSink, CountingSink, PgIngestionWriter};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Per-data-type run summary. These counts are the primary success
/// signal of a run; individual file failures only show up in the logs.
#[derive(Debug, Clone)]
pub struct TypeReport {
    pub data_type: DataType,
    pub files_found: usize,
    pub files_failed: usize,
    pub records_written: usize,
}

impl TypeReport {
    fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            files_found: 0,
            files_failed: 0,
            records_written: 0,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} files found, {} failed, {} records written",
            self.data_type, self.files_found, self.files_failed, self.records_written
        )
    }
}

/// Fans data types out across independent workers and drives each
/// worker's files through the pipeline in sorted order. Workers share no
/// mutable state; database connections come from the bounded pool.
pub struct Orchestrator {
    settings: Arc<Settings>,
    pool: PgPool,
    reader: Arc<dyn RasterReader>,
    dry_run: bool,
}

impl Orchestrator {
    pub fn new(settings: Arc<Settings>, pool: PgPool, reader: Arc<dyn RasterReader>) -> Self {
        Self {
            settings,
            pool,
            reader,
            dry_run: false,
        }
    }

    /// Scan and count without calling any ingestion procedure.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process the given data types to completion. A worker that fails
    /// outright is logged and does not abort its siblings; the returned
    /// reports cover the workers that ran to completion.
    pub async fn run(&self, data_types: &[DataType]) -> Result<Vec<TypeReport>> {
        let worker_limit = self.worker_limit(data_types.len());
        info!(
            data_types = data_types.len(),
            workers = worker_limit,
            dry_run = self.dry_run,
            "starting ingestion run"
        );

        let semaphore = Arc::new(Semaphore::new(worker_limit));
        let mut handles = Vec::with_capacity(data_types.len());

        for &data_type in data_types {
            let semaphore = Arc::clone(&semaphore);
            let settings = Arc::clone(&self.settings);
            let reader = Arc::clone(&self.reader);
            let pool = self.pool.clone();
            let dry_run = self.dry_run;

            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| IngestError::Config("worker semaphore closed".to_string()))?;
                process_data_type(data_type, settings, pool, reader, dry_run).await
            }));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await? {
                Ok(report) => {
                    info!("{}", report.summary());
                    reports.push(report);
                }
                Err(e) => error!(error = %e, "data-type worker failed"),
            }
        }

        Ok(reports)
    }

    fn worker_limit(&self, data_type_count: usize) -> usize {
        let configured = self.settings.max_workers.unwrap_or(usize::MAX);
        data_type_count
            .min(num_cpus::get())
            .min(self.settings.database.max_connections as usize)
            .min(configured)
            .max(1)
    }
}

/// One worker: discover this data type's files and process them in
/// sorted order. Any per-file failure is logged and the next file runs.
async fn process_data_type(
    data_type: DataType,
    settings: Arc<Settings>,
    pool: PgPool,
    reader: Arc<dyn RasterReader>,
    dry_run: bool,
) -> Result<TypeReport> {
    let mut report = TypeReport::new(data_type);

    let Some(pattern) = settings.pattern_for(data_type) else {
        warn!(data_type = %data_type, "no file pattern configured; skipping");
        return Ok(report);
    };

    let files = discover_files(&settings.raster.root_dir, pattern)?;
    report.files_found = files.len();
    if files.is_empty() {
        info!(data_type = %data_type, pattern, "no raster files found");
        return Ok(report);
    }
    info!(data_type = %data_type, files = files.len(), "processing raster files");

    let registry = TowerRegistry::new(pool.clone());
    let sink: Box<dyn BatchSink> = if dry_run {
        Box::new(CountingSink::new())
    } else {
        Box::new(PgIngestionWriter::new(pool))
    };
    let processor = FileProcessor::new(data_type, reader, &settings);

    for path in &files {
        // Fresh registry read per file so tower updates are picked up
        let towers = match registry.fetch_towers().await {
            Ok(towers) => towers,
            Err(e) => {
                error!(
                    data_type = %data_type,
                    file = %path.display(),
                    error = %e,
                    "registry fetch failed; skipping file"
                );
                report.files_failed += 1;
                continue;
            }
        };

        match processor.process(path, &towers, sink.as_ref()).await {
            Ok(file_report) => report.records_written += file_report.records_written,
            Err(e) => {
                error!(
                    data_type = %data_type,
                    file = %path.display(),
                    error = %e,
                    "file processing failed; continuing with next file"
                );
                report.files_failed += 1;
            }
        }
    }

    Ok(report)
}

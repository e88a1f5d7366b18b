use crate::config::Settings;
use crate::error::Result;
use crate::models::{DataType, SampleRecord, Tower};
use crate::processors::batcher::BatchAccumulator;
use crate::processors::coordinate_filter::filter_valid;
use crate::processors::transform::decode_values;
use crate::readers::raster::RasterReader;
use crate::utils::filename::file_stem;
use crate::writers::ingestion::BatchSink;
use chrono::NaiveDateTime;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of one file's processing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub records_written: usize,
    pub batches_flushed: usize,
    pub towers_sampled: usize,
    pub bands_processed: usize,
}

/// Drives a single raster file through the sampling pipeline for one
/// data type: coordinate filtering, raster scan, per-band decode, batch
/// accumulation, and flushes to the sink.
pub struct FileProcessor {
    data_type: DataType,
    reader: Arc<dyn RasterReader>,
    procedure: Option<String>,
    max_bands: usize,
    batch_size: usize,
}

impl FileProcessor {
    pub fn new(data_type: DataType, reader: Arc<dyn RasterReader>, settings: &Settings) -> Self {
        Self {
            data_type,
            reader,
            procedure: settings.procedure_for(data_type),
            max_bands: settings.raster.max_bands,
            batch_size: settings.raster.batch_size,
        }
    }

    pub async fn process(
        &self,
        path: &Path,
        towers: &[Tower],
        sink: &dyn BatchSink,
    ) -> Result<FileReport> {
        let file_name = file_stem(path);
        let mut report = FileReport::default();

        let (valid_towers, coords) = filter_valid(towers);
        if valid_towers.is_empty() {
            info!(
                data_type = %self.data_type,
                file = %file_name,
                "no valid tower coordinates; file processed with no data"
            );
            return Ok(report);
        }
        report.towers_sampled = valid_towers.len();

        // GDAL handles stay inside the blocking section; only plain data
        // crosses back into the async context.
        let scan = {
            let reader = Arc::clone(&self.reader);
            let path = path.to_owned();
            let max_bands = self.max_bands;
            tokio::task::spawn_blocking(move || reader.read(&path, &coords, max_bands)).await??
        };
        report.bands_processed = scan.band_count();

        let mut batch = BatchAccumulator::new(self.batch_size);

        for (band_index, raw_values) in scan.samples.iter().enumerate() {
            let band_num = (band_index + 1) as i32;
            let band_time = &scan.band_labels[band_index];
            let decoded = decode_values(self.data_type, raw_values);

            for (tower, value) in valid_towers.iter().zip(decoded) {
                let full = batch.push(SampleRecord::new(
                    tower.serial.clone(),
                    file_name.clone(),
                    band_num,
                    band_time.clone(),
                    value,
                ));

                if full {
                    self.flush(&mut batch, &file_name, scan.base_time, sink, &mut report)
                        .await?;
                }
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch, &file_name, scan.base_time, sink, &mut report)
                .await?;
        }

        info!(
            data_type = %self.data_type,
            file = %file_name,
            records = report.records_written,
            bands = report.bands_processed,
            "file processed"
        );

        Ok(report)
    }

    async fn flush(
        &self,
        batch: &mut BatchAccumulator,
        file_name: &str,
        base_time: NaiveDateTime,
        sink: &dyn BatchSink,
        report: &mut FileReport,
    ) -> Result<()> {
        let records = batch.take();

        match &self.procedure {
            Some(procedure) => {
                sink.write(procedure, file_name, base_time, &records).await?;
                report.records_written += records.len();
                report.batches_flushed += 1;
                info!(
                    data_type = %self.data_type,
                    file = %file_name,
                    records = records.len(),
                    "batch written"
                );
            }
            None => {
                // Configuration gap, not a data problem: drop the batch.
                warn!(
                    data_type = %self.data_type,
                    file = %file_name,
                    dropped = records.len(),
                    "no ingestion procedure registered; batch dropped"
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseSettings, RasterSettings, Settings};
    use crate::error::IngestError;
    use crate::readers::raster::{parse_band_time, RasterScan};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Serves a synthetic raster: `declared_bands` bands, value
    /// `band_num * 1000 + point_index` at each point.
    struct FakeReader {
        declared_bands: usize,
    }

    impl RasterReader for FakeReader {
        fn read(
            &self,
            _path: &Path,
            coords: &[(f64, f64)],
            max_bands: usize,
        ) -> Result<RasterScan> {
            let band_count = self.declared_bands.min(max_bands);
            let band_labels: Vec<String> = (0..band_count)
                .map(|i| format!("2024-01-15_{i:02}"))
                .collect();
            let samples = (0..band_count)
                .map(|band| {
                    (0..coords.len())
                        .map(|point| ((band + 1) * 1000 + point) as f64)
                        .collect()
                })
                .collect();

            Ok(RasterScan {
                base_time: parse_band_time(&band_labels[0]).unwrap(),
                band_labels,
                samples,
            })
        }
    }

    /// Captures every flushed batch.
    #[derive(Default)]
    struct RecordingSink {
        batches: Mutex<Vec<Vec<SampleRecord>>>,
    }

    impl RecordingSink {
        fn batches(&self) -> Vec<Vec<SampleRecord>> {
            self.batches.lock().unwrap().clone()
        }

        fn records(&self) -> Vec<SampleRecord> {
            self.batches().into_iter().flatten().collect()
        }
    }

    #[async_trait]
    impl BatchSink for RecordingSink {
        async fn write(
            &self,
            _procedure: &str,
            _file_name: &str,
            _base_time: NaiveDateTime,
            batch: &[SampleRecord],
        ) -> Result<()> {
            self.batches.lock().unwrap().push(batch.to_vec());
            Ok(())
        }
    }

    /// Fails on the nth write call (1-based), succeeds otherwise.
    struct FailingSink {
        fail_on: usize,
        calls: AtomicUsize,
        committed: AtomicUsize,
    }

    impl FailingSink {
        fn new(fail_on: usize) -> Self {
            Self {
                fail_on,
                calls: AtomicUsize::new(0),
                committed: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BatchSink for FailingSink {
        async fn write(
            &self,
            procedure: &str,
            _file_name: &str,
            _base_time: NaiveDateTime,
            batch: &[SampleRecord],
        ) -> Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call == self.fail_on {
                return Err(IngestError::Persistence {
                    procedure: procedure.to_string(),
                    message: "connection reset".to_string(),
                });
            }
            self.committed.fetch_add(batch.len(), Ordering::SeqCst);
            Ok(())
        }
    }

    fn settings(max_bands: usize, batch_size: usize) -> Settings {
        Settings {
            database: DatabaseSettings {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 4,
            },
            raster: RasterSettings {
                root_dir: PathBuf::from("/tmp"),
                max_bands,
                batch_size,
            },
            patterns: HashMap::new(),
            procedures: HashMap::new(),
            max_workers: None,
        }
    }

    fn towers(count: usize) -> Vec<Tower> {
        (0..count)
            .map(|n| Tower::new(format!("T-{n:03}"), Some(40.0 + n as f64 * 0.01), Some(29.0)))
            .collect()
    }

    fn processor(data_type: DataType, declared_bands: usize, settings: &Settings) -> FileProcessor {
        FileProcessor::new(
            data_type,
            Arc::new(FakeReader { declared_bands }),
            settings,
        )
    }

    #[tokio::test]
    async fn test_band_cap_excludes_trailing_bands() {
        // 8 declared bands, cap of 6: bands 7 and 8 never appear
        let settings = settings(6, 100_000);
        let processor = processor(DataType::WindSpeed, 8, &settings);
        let sink = RecordingSink::default();

        let report = processor
            .process(Path::new("/tmp/forecast.tif"), &towers(3), &sink)
            .await
            .unwrap();

        assert_eq!(report.bands_processed, 6);
        assert_eq!(report.records_written, 18);
        let max_band = sink.records().iter().map(|r| r.band).max().unwrap();
        assert_eq!(max_band, 6);
    }

    #[tokio::test]
    async fn test_zero_valid_towers_short_circuits() {
        let settings = settings(6, 100_000);
        let processor = processor(DataType::IceMass, 4, &settings);
        let sink = RecordingSink::default();

        let invalid = vec![Tower::new("T-1", Some(95.0), Some(10.0))];
        let report = processor
            .process(Path::new("/tmp/forecast.tif"), &invalid, &sink)
            .await
            .unwrap();

        assert_eq!(report, FileReport::default());
        assert!(sink.batches().is_empty());
    }

    #[tokio::test]
    async fn test_batch_bound_forces_intermediate_flush() {
        // 2 bands x 5 towers = 10 records against a bound of 4:
        // flushes of 4, 4, then the remainder of 2 at end-of-file
        let settings = settings(6, 4);
        let processor = processor(DataType::WindGust, 2, &settings);
        let sink = RecordingSink::default();

        let report = processor
            .process(Path::new("/tmp/forecast.tif"), &towers(5), &sink)
            .await
            .unwrap();

        let sizes: Vec<usize> = sink.batches().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(report.records_written, 10);
        assert_eq!(report.batches_flushed, 3);
    }

    #[tokio::test]
    async fn test_records_ordered_tower_within_band() {
        let settings = settings(6, 100_000);
        let processor = processor(DataType::WindSpeed, 2, &settings);
        let sink = RecordingSink::default();

        processor
            .process(Path::new("/tmp/forecast.tif"), &towers(2), &sink)
            .await
            .unwrap();

        let records = sink.records();
        let keys: Vec<(i32, &str)> = records
            .iter()
            .map(|r| (r.band, r.tower_serial.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![(1, "T-000"), (1, "T-001"), (2, "T-000"), (2, "T-001")]
        );

        // Band label is carried as the record's forecast time
        assert_eq!(records[0].band_time, "2024-01-15_00");
        assert_eq!(records[2].band_time, "2024-01-15_01");
        // File name is the path stem
        assert!(records.iter().all(|r| r.file_name == "forecast"));
    }

    #[tokio::test]
    async fn test_values_are_decoded() {
        let settings = settings(6, 100_000);
        let processor = processor(DataType::WindSpeed, 1, &settings);
        let sink = RecordingSink::default();

        processor
            .process(Path::new("/tmp/forecast.tif"), &towers(2), &sink)
            .await
            .unwrap();

        // Raw 1000 and 1001 scaled by 0.1
        let values: Vec<f32> = sink.records().iter().map(|r| r.value).collect();
        assert_eq!(values, vec![100.0, 100.1]);
    }

    #[tokio::test]
    async fn test_missing_procedure_drops_batch_without_error() {
        let mut settings = settings(6, 100_000);
        settings
            .procedures
            .insert("wind_speed".to_string(), String::new());
        let processor = processor(DataType::WindSpeed, 2, &settings);
        let sink = RecordingSink::default();

        let report = processor
            .process(Path::new("/tmp/forecast.tif"), &towers(3), &sink)
            .await
            .unwrap();

        assert!(sink.batches().is_empty());
        assert_eq!(report.records_written, 0);
        assert_eq!(report.bands_processed, 2);
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_earlier_batches() {
        // Bound of 3 over 3 bands x 3 towers: the first flush commits,
        // the second fails and aborts the file
        let settings = settings(6, 3);
        let processor = processor(DataType::IceThickness, 3, &settings);
        let sink = FailingSink::new(2);

        let result = processor
            .process(Path::new("/tmp/forecast.tif"), &towers(3), &sink)
            .await;

        assert!(matches!(result, Err(IngestError::Persistence { .. })));
        assert_eq!(sink.committed.load(Ordering::SeqCst), 3);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reprocessing_is_deterministic() {
        let settings = settings(6, 100_000);
        let processor = processor(DataType::WindDirection, 3, &settings);

        let first = RecordingSink::default();
        let second = RecordingSink::default();
        let registry = towers(4);

        processor
            .process(Path::new("/tmp/forecast.tif"), &registry, &first)
            .await
            .unwrap();
        processor
            .process(Path::new("/tmp/forecast.tif"), &registry, &second)
            .await
            .unwrap();

        assert_eq!(first.records(), second.records());
    }
}

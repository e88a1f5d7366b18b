pub mod ingestion;

pub use ingestion::{BatchSink, CountingSink, PgIngestionWriter};

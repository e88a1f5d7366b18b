use crate::models::DataType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pylon-ingestor")]
#[command(about = "Samples forecast rasters at transmission tower locations and ingests per-tower time series")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Configuration file path")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest every configured data type
    Run {
        #[arg(long, help = "Override the raster root directory")]
        root_dir: Option<PathBuf>,

        #[arg(long, help = "Cap on bands read per raster file")]
        max_bands: Option<usize>,

        #[arg(long, help = "Records accumulated per ingestion batch")]
        batch_size: Option<usize>,

        #[arg(long, help = "Upper bound on concurrent data-type workers")]
        max_workers: Option<usize>,
    },

    /// Ingest a single data type
    Process {
        #[arg(value_enum, help = "Data type to ingest")]
        data_type: DataType,

        #[arg(long, help = "Override the glob pattern for this data type")]
        pattern: Option<String>,

        #[arg(long, help = "Override the raster root directory")]
        root_dir: Option<PathBuf>,

        #[arg(long, help = "Cap on bands read per raster file")]
        max_bands: Option<usize>,

        #[arg(long, help = "Records accumulated per ingestion batch")]
        batch_size: Option<usize>,
    },

    /// Scan rasters and report what would be ingested, without writing
    Check {
        #[arg(value_enum, help = "Restrict the check to one data type")]
        data_type: Option<DataType>,
    },
}

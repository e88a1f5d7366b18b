use crate::cli::args::{Cli, Commands};
use crate::config::Settings;
use crate::error::Result;
use crate::models::DataType;
use crate::processors::Orchestrator;
use crate::readers::GdalReader;
use crate::utils::progress::ProgressReporter;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.verbose);

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            root_dir,
            max_bands,
            batch_size,
            max_workers,
        } => {
            let settings = apply_overrides(settings, root_dir, max_bands, batch_size, max_workers);
            execute(settings, &DataType::ALL, false).await?;
        }

        Commands::Process {
            data_type,
            pattern,
            root_dir,
            max_bands,
            batch_size,
        } => {
            let mut settings = apply_overrides(settings, root_dir, max_bands, batch_size, None);
            if let Some(pattern) = pattern {
                settings.patterns.insert(data_type.key().to_string(), pattern);
            }
            execute(settings, &[data_type], false).await?;
        }

        Commands::Check { data_type } => {
            let types: Vec<DataType> = match data_type {
                Some(dt) => vec![dt],
                None => DataType::ALL.to_vec(),
            };
            println!("Dry run: no ingestion procedures will be called");
            execute(settings, &types, true).await?;
        }
    }

    Ok(())
}

async fn execute(settings: Settings, data_types: &[DataType], dry_run: bool) -> Result<()> {
    println!("Raster root: {}", settings.raster.root_dir.display());
    println!(
        "Band cap: {}, batch size: {}",
        settings.raster.max_bands, settings.raster.batch_size
    );

    let pool = settings.database.connect().await?;
    let progress = ProgressReporter::new_spinner("Processing raster files...", false);

    let orchestrator = Orchestrator::new(Arc::new(settings), pool, Arc::new(GdalReader))
        .with_dry_run(dry_run);
    let reports = orchestrator.run(data_types).await?;

    progress.finish_with_message("Run complete");

    println!();
    for report in &reports {
        println!("{}", report.summary());
    }
    let total: usize = reports.iter().map(|r| r.records_written).sum();
    println!(
        "\n{} record(s) {} across {} data type(s)",
        total,
        if dry_run { "would be written" } else { "written" },
        reports.len()
    );

    Ok(())
}

fn apply_overrides(
    mut settings: Settings,
    root_dir: Option<PathBuf>,
    max_bands: Option<usize>,
    batch_size: Option<usize>,
    max_workers: Option<usize>,
) -> Settings {
    if let Some(root_dir) = root_dir {
        settings.raster.root_dir = root_dir;
    }
    if let Some(max_bands) = max_bands {
        settings.raster.max_bands = max_bands;
    }
    if let Some(batch_size) = batch_size {
        settings.raster.batch_size = batch_size;
    }
    if max_workers.is_some() {
        settings.max_workers = max_workers;
    }
    settings
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

use clap::Parser;
use pylon_ingestor::cli::{run, Cli};
use pylon_ingestor::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}

//! AssetLens: HTML asset extraction and enhanced URL scraping over HTTP.
//!
//! `assetlens serve` runs the JSON service; `extract` and `scrape` run the
//! same operations once from the command line.

mod commands;
mod routes;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}

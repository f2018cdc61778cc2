//! report-matrix - run a fixture build across framework versions and verify
//! the XML test reports of every run.

use std::path::PathBuf;

use clap::Parser;
use report_matrix::commands::Commands;
use report_matrix::common::{config::Config, logging};
use report_matrix::{cli, Result};

#[derive(Parser)]
#[command(name = "report-matrix", about = "Version-matrix test report checker")]
#[command(version, long_about = None)]
struct Cli {
    /// Config file (default: platform config dir / config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });
    logging::init_cli(verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli::dispatch(cli.command, config).await
}

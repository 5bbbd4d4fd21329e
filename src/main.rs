//! apicase - spreadsheet-driven HTTP API tests
//!
//! Reads test cases from an .xls/.xlsx fixture, sends one request per row
//! and asserts the response status.

use apicase::{cli, commands::Commands, common::logging};
use clap::Parser;

#[derive(Parser)]
#[command(name = "apicase", about = "Spreadsheet-driven HTTP API test runner")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Held until exit so the file sink is flushed
    let log = logging::init();
    if let Some(path) = &log.path {
        tracing::debug!("Logging to {}", path.display());
    }

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        drop(log);
        std::process::exit(1);
    }
}

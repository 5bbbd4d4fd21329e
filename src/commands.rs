//! CLI command definitions
//!
//! Defines the clap commands for the apicase CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::fixture::ReadOptions;

#[derive(Subcommand)]
pub enum Commands {
    /// Run every test case in a fixture file
    Run {
        /// Path to the .xls or .xlsx fixture
        fixture: PathBuf,

        #[command(flatten)]
        sheet: SheetArgs,

        /// Configuration file (default: <project root>/config/config.yaml)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Number of cases to run at once (default: `concurrency` from config, or 1)
        #[arg(long, short)]
        jobs: Option<usize>,

        /// Remove every space from parameter expressions before parsing,
        /// including spaces inside strings
        #[arg(long)]
        strip_param_spaces: bool,
    },

    /// Print the rows of a fixture as JSON
    Show {
        /// Path to the .xls or .xlsx fixture
        fixture: PathBuf,

        #[command(flatten)]
        sheet: SheetArgs,
    },

    /// Evaluate a parameter expression and print the result as JSON
    Parse {
        /// Expression, e.g. "{'user': 'alice'}"
        expression: String,

        /// Remove every space before parsing
        #[arg(long)]
        strip_param_spaces: bool,
    },
}

/// Sheet selection shared by fixture commands
#[derive(Args, Debug, Clone)]
pub struct SheetArgs {
    /// Sheet name; falls back to --sheet-index when the workbook has no such sheet
    #[arg(long)]
    pub sheet: Option<String>,

    /// Sheet position, starting at 0
    #[arg(long, default_value = "0")]
    pub sheet_index: usize,

    /// The first row is data, not column names
    #[arg(long)]
    pub no_header: bool,
}

impl SheetArgs {
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            sheet_name: self.sheet.clone(),
            sheet_index: self.sheet_index,
            skip_header: !self.no_header,
        }
    }
}

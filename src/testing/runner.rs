//! Test runner implementation
//!
//! Drives each fixture row through parse, dispatch and assert. Rows are
//! independent: a failing row never stops the others.

use colored::Colorize;
use futures_util::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tracing::Instrument;

use crate::common::{Config, Error, Result};
use crate::fixture::{self, FixtureRow, ReadOptions};
use crate::http::{Dispatch, Dispatcher, Payload};
use crate::params::ParamParser;

use super::case::TestCase;

/// Outcome of one test case
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Passed,
    Failed(String),
}

/// Result of one test case
#[derive(Debug, Clone)]
pub struct CaseResult {
    /// 0-based data row index
    pub index: usize,
    pub name: String,
    pub outcome: Outcome,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }
}

/// Results of a whole fixture, in row order
#[derive(Debug, Default)]
pub struct RunSummary {
    pub results: Vec<CaseResult>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

/// Run every row of a fixture file
///
/// Fixture errors (missing file, unsupported format, unreadable workbook)
/// are returned before any request is made.
pub async fn run_file(
    path: &Path,
    options: &ReadOptions,
    config: Arc<Config>,
    parser: ParamParser,
    concurrency: usize,
) -> Result<RunSummary> {
    let rows = fixture::read(path, options)?;

    println!(
        "\n{} {} ({} cases)",
        "Running fixture:".blue().bold(),
        path.display().to_string().white().bold(),
        rows.len()
    );

    let dispatcher = Dispatcher::new(config)?;
    let summary = run_rows(&rows, &dispatcher, &parser, concurrency).await;
    print_summary(&summary);
    Ok(summary)
}

/// Run rows with at most `concurrency` cases in flight
pub async fn run_rows(
    rows: &[FixtureRow],
    dispatcher: &dyn Dispatch,
    parser: &ParamParser,
    concurrency: usize,
) -> RunSummary {
    let mut results: Vec<CaseResult> = stream::iter(rows.iter().enumerate())
        .map(|(index, row)| async move {
            let result = execute_case(dispatcher, parser, index, row).await;
            print_case(&result);
            result
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    results.sort_by_key(|r| r.index);
    RunSummary { results }
}

/// Execute one row and turn any error into a failed case
pub async fn execute_case(
    dispatcher: &dyn Dispatch,
    parser: &ParamParser,
    index: usize,
    row: &FixtureRow,
) -> CaseResult {
    let case = match TestCase::from_row(index, row) {
        Ok(case) => case,
        Err(e) => {
            tracing::error!("Row {} is not a valid test case: {}", index + 1, e);
            return CaseResult {
                index,
                name: format!("row {}", index + 1),
                outcome: Outcome::Failed(e.to_string()),
            };
        }
    };

    let span = tracing::info_span!("case", name = %case.name);
    let outcome = match run_case(dispatcher, parser, &case).instrument(span).await {
        Ok(()) => Outcome::Passed,
        Err(e) => {
            tracing::error!("Case '{}' failed: {}", case.name, e);
            Outcome::Failed(e.to_string())
        }
    };

    CaseResult {
        index,
        name: case.name,
        outcome,
    }
}

async fn run_case(
    dispatcher: &dyn Dispatch,
    parser: &ParamParser,
    case: &TestCase,
) -> Result<()> {
    let params = parser.parse(case.parameters.as_deref());
    let payload = Payload::new(case.payload_kind, params.clone());

    let response = dispatcher.send(&case.method, &case.url, &payload).await?;

    tracing::info!("Parameters: {:?}", params);
    tracing::info!("{}", response);

    tracing::info!("{}", response.diagnostics());
    let expected = case.expected_status()?;

    if i64::from(response.status) != expected {
        return Err(Error::TestAssertion(format!(
            "HTTP status assertion failed: expected {}, actual {}",
            expected, response.status
        )));
    }
    Ok(())
}

fn print_case(result: &CaseResult) {
    match &result.outcome {
        Outcome::Passed => println!("  {} {}", "✓".green(), result.name),
        Outcome::Failed(message) => {
            println!("  {} {}: {}", "✗".red(), result.name, message.dimmed())
        }
    }
}

fn print_summary(summary: &RunSummary) {
    if summary.all_passed() {
        println!(
            "\n{} {}\n",
            "✓".green().bold(),
            format!("All {} cases passed", summary.total()).green().bold()
        );
        return;
    }

    println!("\n{}", "Failures:".red());
    for result in summary.results.iter().filter(|r| !r.passed()) {
        if let Outcome::Failed(message) = &result.outcome {
            println!("  {} {}: {}", "✗".red(), result.name, message);
        }
    }
    println!(
        "\n{} {} passed, {} failed\n",
        "✗".red().bold(),
        summary.passed(),
        summary.failed().to_string().red().bold()
    );
}

//! Spreadsheet-driven test execution
//!
//! Each fixture row is one test case: its parameters are parsed, the
//! request is dispatched, and the response status is asserted against the
//! row's expectation.

mod case;
mod runner;

pub use case::*;
pub use runner::{execute_case, run_file, run_rows, CaseResult, Outcome, RunSummary};

//! apicase - spreadsheet-driven HTTP API test runner
//!
//! Test cases live in spreadsheet rows (method, URL, parameters, expected
//! status). This library reads the rows, parses the parameter expressions,
//! sends the requests against a configured base URL and asserts the
//! outcome of each case independently.

pub mod cli;
pub mod commands;
pub mod common;
pub mod fixture;
pub mod http;
pub mod params;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Config, Error, Result};
pub use fixture::{Cell, FixtureRow, ReadOptions};
pub use params::ParamParser;

//! Test case fields read from fixture rows
//!
//! Each logical field can come from any of several column names, so both
//! English and legacy Chinese headers work. The first column present wins.

use crate::common::{Error, Result};
use crate::fixture::{Cell, FixtureRow};
use crate::http::PayloadKind;

/// Columns holding the HTTP method
pub const METHOD_COLUMNS: &[&str] = &["method", "http_method", "请求方式"];
/// Columns holding the path appended to `base_url`
pub const URL_COLUMNS: &[&str] = &["url", "path", "接口URL"];
/// Columns holding the parameter expression
pub const PARAMETER_COLUMNS: &[&str] = &["parameters", "params", "URL参数"];
/// Columns holding the expected status code
pub const EXPECTED_STATUS_COLUMNS: &[&str] = &["expected_status", "status", "预期状态码"];
/// Columns holding a human-readable case name
pub const NAME_COLUMNS: &[&str] = &["name", "case_name", "title", "用例名称"];
/// Columns selecting how parameters are sent
pub const PAYLOAD_TYPE_COLUMNS: &[&str] = &["payload_type", "body_type"];

/// One test case, as described by a fixture row
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub name: String,
    pub method: String,
    pub url: String,
    /// Raw parameter expression, if the cell is not empty
    pub parameters: Option<String>,
    pub payload_kind: PayloadKind,
    /// Expected status cell, validated when the case is asserted
    pub expected_status: Option<Cell>,
}

impl TestCase {
    /// Build a case from the `index`-th data row (0-based)
    pub fn from_row(index: usize, row: &FixtureRow) -> Result<Self> {
        let method = required_text(row, METHOD_COLUMNS)?;
        let url = required_text(row, URL_COLUMNS)?;

        let parameters = match row.get_any(PARAMETER_COLUMNS) {
            None | Some(Cell::Null) => None,
            Some(cell) => Some(cell.to_string()),
        };

        let payload_kind = match row.get_any(PAYLOAD_TYPE_COLUMNS) {
            None | Some(Cell::Null) => PayloadKind::default(),
            Some(cell) => cell.to_string().parse()?,
        };

        let name = row
            .get_any(NAME_COLUMNS)
            .map(Cell::to_string)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("row {}", index + 1));

        Ok(Self {
            name,
            method,
            url,
            parameters,
            payload_kind,
            expected_status: row.get_any(EXPECTED_STATUS_COLUMNS).cloned(),
        })
    }

    /// Expected status code as an integer
    pub fn expected_status(&self) -> Result<i64> {
        match &self.expected_status {
            None | Some(Cell::Null) => Err(Error::MissingField(EXPECTED_STATUS_COLUMNS[0].into())),
            Some(cell) => cell
                .as_i64()
                .ok_or_else(|| Error::invalid_field(EXPECTED_STATUS_COLUMNS[0], cell)),
        }
    }
}

fn required_text(row: &FixtureRow, columns: &[&str]) -> Result<String> {
    match row.get_any(columns) {
        None | Some(Cell::Null) => Err(Error::MissingField(columns[0].to_string())),
        Some(cell) => {
            let text = cell.to_string().trim().to_string();
            if text.is_empty() {
                Err(Error::MissingField(columns[0].to_string()))
            } else {
                Ok(text)
            }
        }
    }
}

//! Spreadsheet fixture reader
//!
//! Loads one sheet of a `.xls` or `.xlsx` workbook into row records. The
//! format is chosen by file extension; each format is a [`SheetSource`]
//! and everything past that point is format-independent.

mod cell;
mod grid;
mod xls;
mod xlsx;

use std::path::Path;

use crate::common::{Error, Result};

pub use cell::{Cell, FixtureRow};
pub use grid::Grid;
pub use xls::XlsSource;
pub use xlsx::XlsxSource;

/// Which sheet to read and how to treat its first row
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Sheet to read; takes priority over `sheet_index` when it exists
    pub sheet_name: Option<String>,
    /// Sheet position (0 = first), used when `sheet_name` is absent or unknown
    pub sheet_index: usize,
    /// Treat the first row as column names
    pub skip_header: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            sheet_name: None,
            sheet_index: 0,
            skip_header: true,
        }
    }
}

/// A resolved sheet reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetRef {
    Name(String),
    Index(usize),
}

/// An open workbook of one on-disk format
pub trait SheetSource {
    /// Names of all sheets, in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Load a sheet as a grid anchored at the sheet's top-left cell
    fn grid(&mut self, sheet: &SheetRef) -> Result<Grid>;

    /// Whether a cell counts as empty when deciding to drop a row
    fn is_blank_cell(&self, cell: &Cell) -> bool {
        cell.is_null()
    }
}

/// Pick the sheet to read: a known `sheet_name` wins, otherwise `sheet_index`
pub fn select_sheet(names: &[String], options: &ReadOptions) -> SheetRef {
    match &options.sheet_name {
        Some(name) if names.iter().any(|n| n == name) => SheetRef::Name(name.clone()),
        _ => SheetRef::Index(options.sheet_index),
    }
}

/// Open a workbook with the reader matching its extension
pub fn open_source(path: &Path) -> Result<Box<dyn SheetSource>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xlsm" => Ok(Box::new(XlsxSource::open(path)?)),
        "xls" => Ok(Box::new(XlsSource::open(path)?)),
        _ => Err(Error::UnsupportedFormat(format!(".{}", ext))),
    }
}

/// Read a fixture file into row records
///
/// The workbook is opened and released within this call.
pub fn read(path: impl AsRef<Path>, options: &ReadOptions) -> Result<Vec<FixtureRow>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::not_found(path));
    }

    let mut source = open_source(path)?;
    let names = source.sheet_names();
    let sheet = select_sheet(&names, options);
    if let (Some(wanted), SheetRef::Index(index)) = (&options.sheet_name, &sheet) {
        tracing::warn!(
            "Sheet '{}' not found in {}, reading sheet {} instead",
            wanted,
            path.display(),
            index
        );
    }

    let grid = source.grid(&sheet)?;
    let rows = grid.into_rows(options.skip_header, |cell| source.is_blank_cell(cell));
    tracing::debug!(
        "Read {} rows from {} ({:?})",
        rows.len(),
        path.display(),
        sheet
    );
    Ok(rows)
}

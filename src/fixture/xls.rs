//! Reader for legacy binary workbooks (`.xls`)
//!
//! Legacy sheets commonly store untouched cells as empty strings, so a row
//! made only of empty strings counts as blank here.

use calamine::{open_workbook, Reader, Xls};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::cell::Cell;
use super::grid::Grid;
use super::{SheetRef, SheetSource};
use crate::common::{Error, Result};

pub struct XlsSource {
    workbook: Xls<BufReader<File>>,
}

impl XlsSource {
    pub fn open(path: &Path) -> Result<Self> {
        let workbook: Xls<_> = open_workbook(path)?;
        Ok(Self { workbook })
    }
}

impl SheetSource for XlsSource {
    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    fn grid(&mut self, sheet: &SheetRef) -> Result<Grid> {
        let range = match sheet {
            SheetRef::Name(name) => self.workbook.worksheet_range(name)?,
            SheetRef::Index(index) => self
                .workbook
                .worksheet_range_at(*index)
                .ok_or_else(|| Error::Workbook(format!("no sheet at index {}", index)))??,
        };
        Ok(Grid::from_range(&range))
    }

    fn is_blank_cell(&self, cell: &Cell) -> bool {
        cell.is_empty()
    }
}

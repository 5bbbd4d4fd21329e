//! Reader for zipped-XML workbooks (`.xlsx`, `.xlsm`)

use calamine::{open_workbook, Reader, Xlsx};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::grid::Grid;
use super::{SheetRef, SheetSource};
use crate::common::{Error, Result};

pub struct XlsxSource {
    workbook: Xlsx<BufReader<File>>,
}

impl XlsxSource {
    pub fn open(path: &Path) -> Result<Self> {
        let workbook: Xlsx<_> = open_workbook(path)?;
        Ok(Self { workbook })
    }
}

impl SheetSource for XlsxSource {
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
}

//! Normalized sheet grid and row building
//!
//! A [`Grid`] always starts at the sheet's first physical row and column,
//! whatever origin the underlying reader reports, so both formats turn
//! into rows through the same code.

use calamine::{Data, Range};

use super::cell::{Cell, FixtureRow};

/// Sheet contents with row 0 / column 0 at the top-left of the sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a grid from a calamine range, padding away its origin offset
    ///
    /// Ranges begin at the first used cell, so a sheet whose data starts at
    /// `B3` yields a range starting at `(2, 1)`.
    pub fn from_range(range: &Range<Data>) -> Self {
        let Some((row_offset, col_offset)) = range.start() else {
            return Self::default();
        };
        let width = col_offset as usize + range.width();

        let mut rows = vec![vec![Cell::Null; width]; row_offset as usize];
        for source in range.rows() {
            let mut row = vec![Cell::Null; col_offset as usize];
            row.extend(source.iter().map(Cell::from));
            rows.push(row);
        }
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Turn the grid into row records
    ///
    /// With `skip_header`, the first row's non-null cells become the keys
    /// and data starts at the second row; otherwise every row is data and
    /// keys are `col_0`, `col_1`, ... Rows where every cell is blank are
    /// dropped.
    pub fn into_rows(self, skip_header: bool, is_blank: impl Fn(&Cell) -> bool) -> Vec<FixtureRow> {
        let mut rows = self.rows.into_iter();

        let headers: Vec<String> = if skip_header {
            match rows.next() {
                Some(header) => header
                    .iter()
                    .filter(|cell| !cell.is_null())
                    .map(Cell::to_string)
                    .collect(),
                None => return Vec::new(),
            }
        } else {
            Vec::new()
        };

        rows.filter(|row| !row.iter().all(&is_blank))
            .map(|row| {
                row.into_iter()
                    .enumerate()
                    .map(|(idx, cell)| (column_key(&headers, idx), cell))
                    .collect()
            })
            .collect()
    }
}

fn column_key(headers: &[String], idx: usize) -> String {
    match headers.get(idx) {
        Some(header) => header.clone(),
        None => format!("col_{}", idx),
    }
}

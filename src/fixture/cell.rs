//! Cell values and row records
//!
//! Spreadsheet values are converted into [`Cell`] once, at read time, so
//! nothing downstream sees format-specific types.

use calamine::Data;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// A single spreadsheet cell value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Null or a string with no characters
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Integer value of a whole-number cell
    ///
    /// Numeric strings are accepted too, since hand-edited sheets often
    /// store status codes as text.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
            Cell::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::String(s) => f.write_str(s),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Null,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::String(s) => Cell::String(s.clone()),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::String(s.clone()),
            Data::Error(_) => Cell::Null,
        }
    }
}

/// One fixture row: column key to cell value, in column order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FixtureRow {
    cells: IndexMap<String, Cell>,
}

impl FixtureRow {
    pub fn get(&self, key: &str) -> Option<&Cell> {
        self.cells.get(key)
    }

    /// First cell present under any of the given keys
    pub fn get_any(&self, keys: &[&str]) -> Option<&Cell> {
        keys.iter().find_map(|key| self.cells.get(*key))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Cell)> for FixtureRow {
    fn from_iter<I: IntoIterator<Item = (K, Cell)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

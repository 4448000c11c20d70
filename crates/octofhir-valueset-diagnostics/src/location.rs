//! Cell location tracking for workbook diagnostics

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell position inside a named sheet.
///
/// Rows and columns are stored 0-based, the way the workbook reader indexes
/// them, and displayed spreadsheet style (`Sheet!B7`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellLocation {
    /// Sheet name
    pub sheet: String,
    /// Row index (0-based)
    pub row: usize,
    /// Column index (0-based)
    pub column: usize,
}

impl CellLocation {
    /// Location of a single cell
    pub fn cell(sheet: impl Into<String>, row: usize, column: usize) -> Self {
        Self {
            sheet: sheet.into(),
            row,
            column,
        }
    }

    /// Spreadsheet column letters for a 0-based column index (0 -> `A`, 26 -> `AA`)
    pub fn column_letters(column: usize) -> String {
        let mut letters = Vec::new();
        let mut n = column + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(b'A' + rem as u8);
            n = (n - 1) / 26;
        }
        letters.reverse();
        String::from_utf8(letters).unwrap_or_default()
    }
}

impl fmt::Display for CellLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}!{}{}",
            self.sheet,
            Self::column_letters(self.column),
            self.row + 1
        )
    }
}

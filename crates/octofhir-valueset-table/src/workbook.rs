//! In-memory workbook model

use octofhir_valueset_diagnostics::{Result, ValueSetError};

static EMPTY_CELL: Cell = Cell::Empty;

/// A single cell value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// Blank cell
    #[default]
    Empty,
    /// Text cell
    Text(String),
    /// Numeric cell
    Number(f64),
    /// Boolean cell
    Bool(bool),
}

impl Cell {
    /// Check if the cell is blank (no value or empty text)
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Textual value of the cell, `None` when blank.
    ///
    /// Numbers are coerced to text: integral values print without a
    /// fractional part (`1234.0` -> `"1234"`), everything else uses the
    /// shortest round-trip representation.
    pub fn as_string(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.is_empty() => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(format_number(*n)),
            Cell::Bool(b) => Some(b.to_string()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// An ordered sequence of cells
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    index: usize,
    cells: Vec<Cell>,
}

impl Row {
    /// Create a row at a 0-based sheet index
    pub fn new(index: usize, cells: Vec<Cell>) -> Self {
        Self { index, cells }
    }

    /// 0-based index of this row in its sheet
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cell at a 0-based column; missing cells read as blank
    pub fn cell(&self, column: usize) -> &Cell {
        self.cells.get(column).unwrap_or(&EMPTY_CELL)
    }

    /// Textual value of a cell, `None` when blank or absent
    pub fn cell_as_string(&self, column: usize) -> Option<String> {
        self.cell(column).as_string()
    }

    /// Number of physically present cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_blank)
    }
}

/// A named, ordered sequence of rows
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    name: String,
    rows: Vec<Row>,
}

impl Sheet {
    /// Create a sheet; row indices are assigned from position
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, cells)| Row::new(index, cells))
            .collect();
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rows starting at a 0-based offset.
    ///
    /// The iterator is lazy and `Clone`, so a scan can be restarted from the
    /// same offset. An offset past the last row yields nothing.
    pub fn rows(&self, offset: usize) -> std::slice::Iter<'_, Row> {
        self.rows.get(offset..).unwrap_or(&[]).iter()
    }

    /// Row at a 0-based index
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Sheet selector: by name or by 0-based position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetRef<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for SheetRef<'a> {
    fn from(name: &'a str) -> Self {
        SheetRef::Name(name)
    }
}

impl<'a> From<&'a String> for SheetRef<'a> {
    fn from(name: &'a String) -> Self {
        SheetRef::Name(name.as_str())
    }
}

impl From<usize> for SheetRef<'_> {
    fn from(index: usize) -> Self {
        SheetRef::Index(index)
    }
}

/// An ordered sequence of named sheets
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Look up a sheet by name (exact match) or position.
    ///
    /// Fails with `MissingSheet` when no such sheet exists.
    pub fn sheet<'a>(&self, sheet: impl Into<SheetRef<'a>>) -> Result<&Sheet> {
        match sheet.into() {
            SheetRef::Name(name) => self
                .sheets
                .iter()
                .find(|s| s.name == name)
                .ok_or_else(|| ValueSetError::missing_sheet(name)),
            SheetRef::Index(index) => self
                .sheets
                .get(index)
                .ok_or_else(|| ValueSetError::missing_sheet(format!("#{index}"))),
        }
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

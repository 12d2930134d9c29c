//! Spreadsheet access used by the synchronizer.
//!
//! [`SheetWriter`] is the seam between the sync logic and the remote service:
//! [`google::GoogleSheetsClient`] talks to the Sheets and Drive REST APIs,
//! while tests substitute an in-memory recorder.

use std::fmt::{Display, Formatter};

use thiserror::Error;

pub mod credentials;
pub mod google;

/// Errors raised while talking to the spreadsheet service.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// The service rejected the credentials or the token exchange failed.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// An API call returned a non-success status.
    #[error("{operation} failed with status {status}: {body}")]
    Remote {
        operation: &'static str,
        status: u16,
        body: String,
    },
    /// The request could not be sent or the response could not be read.
    #[error("spreadsheet request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// A named spreadsheet or tab does not exist.
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

/// Convenient alias for spreadsheet results.
pub type SheetsResult<T> = Result<T, SheetsError>;

/// A tab inside a resolved spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Worksheet {
    pub spreadsheet_id: String,
    pub tab: String,
}

impl Worksheet {
    pub fn new(spreadsheet_id: impl Into<String>, tab: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            tab: tab.into(),
        }
    }

    /// Qualifies an A1 reference with this tab, e.g. `'My Tab'!A1:C3`.
    pub fn qualify(&self, reference: &str) -> String {
        format!("'{}'!{}", self.tab.replace('\'', "''"), reference)
    }
}

/// Operations the synchronizer needs from a spreadsheet service.
pub trait SheetWriter {
    /// Resolves a spreadsheet title to its identifier.
    fn resolve_spreadsheet(&self, title: &str) -> SheetsResult<String>;

    /// Values of one 1-based row; empty when the row has no content.
    fn read_row(&self, sheet: &Worksheet, row: usize) -> SheetsResult<Vec<String>>;

    /// Grows the tab grid so that it holds at least `rows` x `columns` cells.
    fn ensure_grid(&self, sheet: &Worksheet, rows: usize, columns: usize) -> SheetsResult<()>;

    /// Clears the values inside `range`.
    fn clear(&self, sheet: &Worksheet, range: &CellRange) -> SheetsResult<()>;

    /// Writes `values` row by row with their top-left cell at `start`.
    fn write(&self, sheet: &Worksheet, start: CellRef, values: &[Vec<String>])
    -> SheetsResult<()>;
}

impl<T: SheetWriter + ?Sized> SheetWriter for &T {
    fn resolve_spreadsheet(&self, title: &str) -> SheetsResult<String> {
        (**self).resolve_spreadsheet(title)
    }

    fn read_row(&self, sheet: &Worksheet, row: usize) -> SheetsResult<Vec<String>> {
        (**self).read_row(sheet, row)
    }

    fn ensure_grid(&self, sheet: &Worksheet, rows: usize, columns: usize) -> SheetsResult<()> {
        (**self).ensure_grid(sheet, rows, columns)
    }

    fn clear(&self, sheet: &Worksheet, range: &CellRange) -> SheetsResult<()> {
        (**self).clear(sheet, range)
    }

    fn write(
        &self,
        sheet: &Worksheet,
        start: CellRef,
        values: &[Vec<String>],
    ) -> SheetsResult<()> {
        (**self).write(sheet, start, values)
    }
}

/// Spreadsheet column letters for a 1-based index: 1 → `A`, 27 → `AA`.
pub fn column_letter(index: usize) -> String {
    let mut n = index;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// A single cell, 1-based column and row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub column: usize,
    pub row: usize,
}

impl CellRef {
    pub const TOP_LEFT: CellRef = CellRef { column: 1, row: 1 };

    pub const fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }
}

impl Display for CellRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", column_letter(self.column), self.row)
    }
}

/// An inclusive rectangular block of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    pub const fn new(start: CellRef, end: CellRef) -> Self {
        Self { start, end }
    }

    /// The data block below the header of a table with `rows` data rows and
    /// `columns` columns: `A2` through the last column of row `rows + 1`.
    ///
    /// `None` when the table has no data rows or no columns.
    pub fn data_region(rows: usize, columns: usize) -> Option<Self> {
        if rows == 0 || columns == 0 {
            return None;
        }
        Some(Self::new(CellRef::new(1, 2), CellRef::new(columns, rows + 1)))
    }

    /// Range covering `values` when written at `start`.
    pub fn covering(start: CellRef, values: &[Vec<String>]) -> Option<Self> {
        let width = values.iter().map(Vec::len).max().unwrap_or(0);
        if values.is_empty() || width == 0 {
            return None;
        }
        Some(Self::new(
            start,
            CellRef::new(start.column + width - 1, start.row + values.len() - 1),
        ))
    }
}

impl Display for CellRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

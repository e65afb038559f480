//! Spreadsheet import and export.
//!
//! Import reads the first sheet of an `.xlsx` (or `.xls`/`.ods`) workbook and
//! maps its header row through [`columns`]. Export writes a single-sheet
//! `.xlsx` workbook.

pub mod columns;
pub mod export;
pub mod import;

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::error::CirculationError;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Entities that can be imported from a spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportKind {
    Books,
    Users,
}

/// Entities that can be exported to a spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportKind {
    Books,
    Users,
    Transactions,
}

impl ImportKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ImportKind::Books => "books",
            ImportKind::Users => "users",
        }
    }
}

impl ExportKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExportKind::Books => "books",
            ExportKind::Users => "users",
            ExportKind::Transactions => "transactions",
        }
    }

    /// Download name offered in `Content-Disposition`.
    #[must_use]
    pub fn filename(self) -> String {
        format!("{}_export.xlsx", self.as_str())
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportKind {
    type Err = CirculationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "books" => Ok(ExportKind::Books),
            "users" => Ok(ExportKind::Users),
            "transactions" => Ok(ExportKind::Transactions),
            other => Err(CirculationError::ValidationError(format!(
                "unknown export entity: {other}"
            ))),
        }
    }
}

/// Finished workbook ready to be written to disk or sent as a download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::error::CirculationError;

pub type BookId = i64;
pub type UserId = i64;
pub type TransactionId = i64;

/// Circulation state of a book. A book is in exactly one of these at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookStatus {
    Available,
    Borrowed,
}

impl BookStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BookStatus::Available => "AVAILABLE",
            BookStatus::Borrowed => "BORROWED",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookStatus {
    type Err = CirculationError;

    /// Accepts the canonical names and the labels written by the legacy UI.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "AVAILABLE" | "보유중" => Ok(BookStatus::Available),
            "BORROWED" | "대출중" => Ok(BookStatus::Borrowed),
            other => Err(CirculationError::ValidationError(format!(
                "unknown book status: {other}"
            ))),
        }
    }
}

impl ToSql for BookStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BookStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Kind of a circulation event in the transaction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Borrow,
    Return,
}

impl Action {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Borrow => "BORROW",
            Action::Return => "RETURN",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CirculationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "BORROW" | "대출" => Ok(Action::Borrow),
            "RETURN" | "반납" => Ok(Action::Return),
            other => Err(CirculationError::ValidationError(format!(
                "unknown transaction action: {other}"
            ))),
        }
    }
}

impl ToSql for Action {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Action {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub isbn: Option<String>,
    pub category: Option<String>,
    pub class_code: Option<String>,
    pub status: BookStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: Option<String>,
    pub student_id: Option<String>,
}

/// One row of the append-only circulation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub action: Action,
    pub date: String,
}

/// Transaction joined with the display names of its (possibly deleted) user and book.
///
/// `date` and `action` are the stored text, so legacy rows export unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReport {
    pub date: Option<String>,
    pub user_name: Option<String>,
    pub student_id: Option<String>,
    pub book_title: Option<String>,
    pub action: Option<String>,
}

/// Book attributes as supplied by an import; `id` is assigned by the store when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookRecord {
    pub id: Option<BookId>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub isbn: Option<String>,
    pub category: Option<String>,
    pub class_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Option<UserId>,
    pub name: Option<String>,
    pub student_id: Option<String>,
}

/// Current UTC time in the log's timestamp format (`2024-01-09T10:00:00.000Z`).
#[must_use]
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

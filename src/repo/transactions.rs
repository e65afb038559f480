use rusqlite::{Connection, Row, params};

use crate::error::CirculationError;
use crate::model::{Action, BookId, Transaction, TransactionId, TransactionReport, UserId};

const SELECT_COLUMNS: &str =
    "SELECT id, userId, bookId, CAST(action AS TEXT), CAST(date AS TEXT) FROM transactions";

/// A log row as stored. Rows loaded by older tools may carry NULLs, non-numeric
/// ids or action labels the migration could not map.
struct StoredRow {
    id: TransactionId,
    user_id: Option<UserId>,
    book_id: Option<BookId>,
    action: Option<String>,
    date: Option<String>,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: int_or_none(row, 1)?,
            book_id: int_or_none(row, 2)?,
            action: row.get(3)?,
            date: row.get(4)?,
        })
    }

    fn into_transaction(self) -> Option<Transaction> {
        Some(Transaction {
            id: self.id,
            user_id: self.user_id?,
            book_id: self.book_id?,
            action: self.action?.parse::<Action>().ok()?,
            date: self.date?,
        })
    }
}

fn int_or_none(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<i64>> {
    Ok(row.get_ref(idx)?.as_i64_or_null().ok().flatten())
}

/// Keep the well-formed rows; each malformed one is logged and left out.
fn well_formed(
    rows: impl Iterator<Item = rusqlite::Result<StoredRow>>,
) -> Result<Vec<Transaction>, CirculationError> {
    let mut out = Vec::new();
    for row in rows {
        let row = row?;
        let id = row.id;
        match row.into_transaction() {
            Some(transaction) => out.push(transaction),
            None => tracing::warn!(id, "skipping malformed transaction log row"),
        }
    }
    Ok(out)
}

/// Append one event to the log and return its id.
///
/// # Errors
/// Returns `CirculationError::SqliteError` if the insert fails.
pub fn insert(
    conn: &Connection,
    user_id: UserId,
    book_id: BookId,
    action: Action,
    date: &str,
) -> Result<TransactionId, CirculationError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO transactions (userId, bookId, action, date) VALUES (?1, ?2, ?3, ?4)",
    )?;
    stmt.execute(params![user_id, book_id, action, date])?;
    Ok(conn.last_insert_rowid())
}

/// Whole log, newest first. Events sharing a timestamp keep insertion order reversed.
///
/// Rows that cannot be read as a [`Transaction`] are skipped with a warning.
///
/// # Errors
/// Returns `CirculationError::SqliteError` if the query fails.
pub fn list(conn: &Connection) -> Result<Vec<Transaction>, CirculationError> {
    let mut stmt =
        conn.prepare_cached(&format!("{SELECT_COLUMNS} ORDER BY date DESC, id DESC"))?;
    let rows = well_formed(stmt.query_map([], StoredRow::from_row)?)?;
    Ok(rows)
}

/// History of a single book, oldest first.
///
/// # Errors
/// Returns `CirculationError::SqliteError` if the query fails.
pub fn list_for_book(conn: &Connection, book_id: BookId) -> Result<Vec<Transaction>, CirculationError> {
    let mut stmt =
        conn.prepare_cached(&format!("{SELECT_COLUMNS} WHERE bookId = ?1 ORDER BY id"))?;
    let rows = well_formed(stmt.query_map([book_id], StoredRow::from_row)?)?;
    Ok(rows)
}

/// Log rows with user and book display names; orphaned references yield `None`.
///
/// Every row is reported, with date and action copied as stored.
///
/// # Errors
/// Returns `CirculationError::SqliteError` if the query fails.
pub fn report(conn: &Connection) -> Result<Vec<TransactionReport>, CirculationError> {
    let mut stmt = conn.prepare_cached(
        "SELECT CAST(t.date AS TEXT), u.name, u.studentId, b.title, CAST(t.action AS TEXT)
         FROM transactions t
         LEFT JOIN users u ON t.userId = u.id
         LEFT JOIN books b ON t.bookId = b.id
         ORDER BY t.date DESC, t.id DESC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(TransactionReport {
                date: row.get(0)?,
                user_name: row.get(1)?,
                student_id: row.get(2)?,
                book_title: row.get(3)?,
                action: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::CirculationError;
use crate::model::{Book, BookId, BookRecord, BookStatus};

const SELECT_COLUMNS: &str =
    "SELECT id, title, author, publisher, isbn, category, classCode, status FROM books";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        publisher: row.get(3)?,
        isbn: row.get(4)?,
        category: row.get(5)?,
        class_code: row.get(6)?,
        status: row.get(7)?,
    })
}

/// All books ordered by id.
///
/// # Errors
/// Returns `CirculationError::SqliteError` if the query fails.
pub fn list(conn: &Connection) -> Result<Vec<Book>, CirculationError> {
    let mut stmt = conn.prepare_cached(&format!("{SELECT_COLUMNS} ORDER BY id"))?;
    let books = stmt
        .query_map([], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(books)
}

/// # Errors
/// Returns `CirculationError::SqliteError` if the query fails.
pub fn find(conn: &Connection, id: BookId) -> Result<Option<Book>, CirculationError> {
    let mut stmt = conn.prepare_cached(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
    Ok(stmt.query_row([id], from_row).optional()?)
}

/// Insert or overwrite a book by id, resetting its status to AVAILABLE.
///
/// A record without an id gets one assigned by the store. Returns the row id.
///
/// # Errors
/// Returns `CirculationError::SqliteError` if the statement fails.
pub fn upsert(conn: &Connection, record: &BookRecord) -> Result<BookId, CirculationError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO books (id, title, author, publisher, isbn, category, classCode, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            author = excluded.author,
            publisher = excluded.publisher,
            isbn = excluded.isbn,
            category = excluded.category,
            classCode = excluded.classCode,
            status = excluded.status",
    )?;
    stmt.execute(params![
        record.id,
        record.title,
        record.author,
        record.publisher,
        record.isbn,
        record.category,
        record.class_code,
        BookStatus::Available,
    ])?;
    Ok(match record.id {
        Some(id) => id,
        None => conn.last_insert_rowid(),
    })
}

/// Compare-and-set on the status column. Returns the number of rows changed (0 or 1).
///
/// # Errors
/// Returns `CirculationError::SqliteError` if the statement fails.
pub fn set_status_if(
    conn: &Connection,
    id: BookId,
    expected: BookStatus,
    next: BookStatus,
) -> Result<usize, CirculationError> {
    let mut stmt =
        conn.prepare_cached("UPDATE books SET status = ?1 WHERE id = ?2 AND status = ?3")?;
    Ok(stmt.execute(params![next, id, expected])?)
}

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::CirculationError;
use crate::model::{User, UserId, UserRecord};

fn from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        student_id: row.get(2)?,
    })
}

/// # Errors
/// Returns `CirculationError::SqliteError` if the query fails.
pub fn list(conn: &Connection) -> Result<Vec<User>, CirculationError> {
    let mut stmt = conn.prepare_cached("SELECT id, name, studentId FROM users ORDER BY id")?;
    let users = stmt
        .query_map([], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

/// # Errors
/// Returns `CirculationError::SqliteError` if the query fails.
pub fn find(conn: &Connection, id: UserId) -> Result<Option<User>, CirculationError> {
    let mut stmt = conn.prepare_cached("SELECT id, name, studentId FROM users WHERE id = ?1")?;
    Ok(stmt.query_row([id], from_row).optional()?)
}

/// Insert or overwrite a user by id; returns the row id.
///
/// # Errors
/// Returns `CirculationError::SqliteError` if the statement fails.
pub fn upsert(conn: &Connection, record: &UserRecord) -> Result<UserId, CirculationError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO users (id, name, studentId) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET name = excluded.name, studentId = excluded.studentId",
    )?;
    stmt.execute(params![record.id, record.name, record.student_id])?;
    Ok(match record.id {
        Some(id) => id,
        None => conn.last_insert_rowid(),
    })
}

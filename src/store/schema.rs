use rusqlite::Connection;

use crate::error::CirculationError;

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY,
    title TEXT,
    author TEXT,
    publisher TEXT,
    isbn TEXT,
    category TEXT,
    classCode TEXT,
    status TEXT
);
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    name TEXT,
    studentId TEXT
);
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    userId INTEGER,
    bookId INTEGER,
    action TEXT,
    date TEXT
);
CREATE INDEX IF NOT EXISTS transactions_date_idx ON transactions (date);
";

/// Nullable columns introduced after the first release of each table.
///
/// Databases created by older builds gain these on open; existing rows read NULL.
const ADDITIVE_COLUMNS: &[(&str, &str)] = &[
    ("books", "publisher"),
    ("books", "isbn"),
    ("books", "category"),
    ("books", "classCode"),
    ("books", "status"),
    ("users", "studentId"),
];

/// Rewrites legacy labels to the canonical values. Order matters: the final
/// statement folds NULL and any unrecognized status into AVAILABLE.
const NORMALIZE_LEGACY_VALUES: &[&str] = &[
    "UPDATE books SET status = 'BORROWED' WHERE status = '대출중'",
    "UPDATE books SET status = 'AVAILABLE' WHERE status IS NULL OR status NOT IN ('AVAILABLE', 'BORROWED')",
    "UPDATE transactions SET action = 'BORROW' WHERE action = '대출'",
    "UPDATE transactions SET action = 'RETURN' WHERE action = '반납'",
];

/// What a migration run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub added_columns: Vec<String>,
    pub normalized_rows: usize,
}

/// Create missing tables, add missing nullable columns and normalize legacy values.
///
/// Runs in one transaction; a failure leaves the database as it was.
///
/// # Errors
/// Returns `CirculationError::SqliteError` if any statement fails.
pub fn migrate(conn: &mut Connection) -> Result<MigrationReport, CirculationError> {
    let tx = conn.transaction()?;
    tx.execute_batch(CREATE_TABLES)?;

    let mut report = MigrationReport::default();
    for (table, column) in ADDITIVE_COLUMNS {
        if !has_column(&tx, table, column)? {
            // identifiers come from the static table above, never from callers
            tx.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} TEXT"))?;
            report.added_columns.push(format!("{table}.{column}"));
        }
    }

    for sql in NORMALIZE_LEGACY_VALUES {
        report.normalized_rows += tx.execute(sql, [])?;
    }

    let unknown_actions: i64 = tx.query_row(
        "SELECT COUNT(*) FROM transactions WHERE action IS NULL OR action NOT IN ('BORROW', 'RETURN')",
        [],
        |row| row.get(0),
    )?;
    if unknown_actions > 0 {
        tracing::warn!(
            rows = unknown_actions,
            "transactions with unrecognized actions are kept as stored and skipped when listing the log"
        );
    }

    tx.commit()?;
    Ok(report)
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool, CirculationError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

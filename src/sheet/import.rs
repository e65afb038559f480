use std::io::Cursor;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};

use super::columns::{BOOK_COLUMNS, BookField, HeaderIndex, USER_COLUMNS, UserField};
use crate::error::CirculationError;
use crate::model::{BookRecord, UserRecord};

/// Parse the first sheet of a workbook into book records.
///
/// Rows whose recognized cells are all empty are skipped. Any status column is ignored.
///
/// # Errors
/// Returns `CirculationError::ImportError` if the bytes are not a readable workbook,
/// the header row has no recognized column, or an id cell is not an integer.
pub fn parse_books(bytes: &[u8]) -> Result<Vec<BookRecord>, CirculationError> {
    let range = first_sheet(bytes)?;
    parse_rows(&range, &BOOK_COLUMNS.resolve(&header_row(&range)), |index, row, line| {
        let text = |field| first_text(index.columns(field), row);
        let record = BookRecord {
            id: parse_id(index.columns(BookField::Id), row, line)?,
            title: text(BookField::Title),
            author: text(BookField::Author),
            publisher: text(BookField::Publisher),
            isbn: text(BookField::Isbn),
            category: text(BookField::Category),
            class_code: text(BookField::ClassCode),
        };
        Ok((record != BookRecord::default()).then_some(record))
    })
}

/// Parse the first sheet of a workbook into user records.
///
/// # Errors
/// Same conditions as [`parse_books`].
pub fn parse_users(bytes: &[u8]) -> Result<Vec<UserRecord>, CirculationError> {
    let range = first_sheet(bytes)?;
    parse_rows(&range, &USER_COLUMNS.resolve(&header_row(&range)), |index, row, line| {
        let record = UserRecord {
            id: parse_id(index.columns(UserField::Id), row, line)?,
            name: first_text(index.columns(UserField::Name), row),
            student_id: first_text(index.columns(UserField::StudentId), row),
        };
        Ok((record != UserRecord::default()).then_some(record))
    })
}

fn first_sheet(bytes: &[u8]) -> Result<Range<Data>, CirculationError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CirculationError::ImportError("workbook has no sheets".into()))?
        .map_err(CirculationError::from)
}

fn header_row(range: &Range<Data>) -> Vec<String> {
    range
        .rows()
        .next()
        .map(|row| row.iter().map(|cell| cell_text(cell).unwrap_or_default()).collect())
        .unwrap_or_default()
}

fn parse_rows<F, T, P>(
    range: &Range<Data>,
    index: &HeaderIndex<F>,
    mut parse: P,
) -> Result<Vec<T>, CirculationError>
where
    F: Copy + Eq,
    P: FnMut(&HeaderIndex<F>, &[Data], usize) -> Result<Option<T>, CirculationError>,
{
    if range.is_empty() {
        return Ok(Vec::new());
    }
    if !index.any_recognized() {
        return Err(CirculationError::ImportError(
            "header row contains no recognized column names".into(),
        ));
    }
    // 1-based sheet row numbers for error messages
    let first_line = range.start().map_or(1, |(row, _)| row as usize + 1);
    let mut records = Vec::new();
    for (offset, row) in range.rows().enumerate().skip(1) {
        if let Some(record) = parse(index, row, first_line + offset)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Text of the first non-empty cell among `columns`.
fn first_text(columns: &[usize], row: &[Data]) -> Option<String> {
    columns
        .iter()
        .find_map(|&col| row.get(col).and_then(cell_text))
}

fn parse_id(columns: &[usize], row: &[Data], line: usize) -> Result<Option<i64>, CirculationError> {
    let Some(cell) = columns
        .iter()
        .filter_map(|&col| row.get(col))
        .find(|cell| cell_text(cell).is_some())
    else {
        return Ok(None);
    };
    let id = match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Some(*f as i64),
        Data::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    id.map(Some).ok_or_else(|| {
        CirculationError::ImportError(format!("row {line}: id must be an integer, got {cell}"))
    })
}

/// Cell contents as trimmed text; `None` for blank cells.
pub(crate) fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        // Display for f64 drops a zero fraction, so 9788932917245.0 prints as digits only
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
    };
    (!text.is_empty()).then_some(text)
}

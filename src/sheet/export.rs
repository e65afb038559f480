use rust_xlsxwriter::{Format, Workbook};

use crate::error::CirculationError;
use crate::model::{Book, TransactionReport, User};

/// Cell written into an export sheet.
enum Cell<'a> {
    Number(i64),
    Text(Option<&'a str>),
}

/// Build a one-sheet workbook of all books.
///
/// # Errors
/// Returns `CirculationError::ExportError` if the workbook cannot be serialized.
pub fn books_workbook(books: &[Book]) -> Result<Vec<u8>, CirculationError> {
    write_sheet(
        "Books",
        &["id", "title", "author", "publisher", "isbn", "category", "classCode", "status"],
        books.iter().map(|b| {
            vec![
                Cell::Number(b.id),
                Cell::Text(b.title.as_deref()),
                Cell::Text(b.author.as_deref()),
                Cell::Text(b.publisher.as_deref()),
                Cell::Text(b.isbn.as_deref()),
                Cell::Text(b.category.as_deref()),
                Cell::Text(b.class_code.as_deref()),
                Cell::Text(Some(b.status.as_str())),
            ]
        }),
    )
}

/// # Errors
/// Returns `CirculationError::ExportError` if the workbook cannot be serialized.
pub fn users_workbook(users: &[User]) -> Result<Vec<u8>, CirculationError> {
    write_sheet(
        "Users",
        &["id", "name", "studentId"],
        users.iter().map(|u| {
            vec![
                Cell::Number(u.id),
                Cell::Text(u.name.as_deref()),
                Cell::Text(u.student_id.as_deref()),
            ]
        }),
    )
}

/// # Errors
/// Returns `CirculationError::ExportError` if the workbook cannot be serialized.
pub fn transactions_workbook(rows: &[TransactionReport]) -> Result<Vec<u8>, CirculationError> {
    write_sheet(
        "Transactions",
        &["date", "userName", "studentId", "bookTitle", "action"],
        rows.iter().map(|t| {
            vec![
                Cell::Text(t.date.as_deref()),
                Cell::Text(t.user_name.as_deref()),
                Cell::Text(t.student_id.as_deref()),
                Cell::Text(t.book_title.as_deref()),
                Cell::Text(t.action.as_deref()),
            ]
        }),
    )
}

fn write_sheet<'a, I>(name: &str, headers: &[&str], rows: I) -> Result<Vec<u8>, CirculationError>
where
    I: Iterator<Item = Vec<Cell<'a>>>,
{
    let mut workbook = Workbook::new();
    {
        let bold = Format::new().set_bold();
        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;
        for (col, header) in (0u16..).zip(headers) {
            sheet.write_string_with_format(0, col, *header, &bold)?;
        }
        for (row, cells) in (1u32..).zip(rows) {
            for (col, cell) in (0u16..).zip(cells) {
                match cell {
                    Cell::Number(n) => {
                        sheet.write_number(row, col, n as f64)?;
                    }
                    Cell::Text(Some(text)) => {
                        sheet.write_string(row, col, text)?;
                    }
                    Cell::Text(None) => {}
                }
            }
        }
        sheet.autofit();
    }
    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BookStatus;
    use crate::sheet::import::parse_books;

    #[test]
    fn exported_books_import_with_identical_fields() -> Result<(), CirculationError> {
        let books = vec![
            Book {
                id: 1,
                title: Some("어린왕자".into()),
                author: Some("생텍쥐페리".into()),
                publisher: Some("열린책들".into()),
                isbn: Some("9788932917245".into()),
                category: Some("소설".into()),
                class_code: Some("863 생84어".into()),
                status: BookStatus::Borrowed,
            },
            Book {
                id: 2,
                title: Some("해리포터".into()),
                author: None,
                publisher: None,
                isbn: None,
                category: Some("판타지".into()),
                class_code: None,
                status: BookStatus::Available,
            },
        ];
        let bytes = books_workbook(&books)?;
        let records = parse_books(&bytes)?;
        assert_eq!(records.len(), 2);
        for (book, record) in books.iter().zip(&records) {
            assert_eq!(record.id, Some(book.id));
            assert_eq!(record.title, book.title);
            assert_eq!(record.author, book.author);
            assert_eq!(record.publisher, book.publisher);
            assert_eq!(record.isbn, book.isbn);
            assert_eq!(record.category, book.category);
            assert_eq!(record.class_code, book.class_code);
        }
        Ok(())
    }
}

#![allow(dead_code)]

use circulation::prelude::*;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

/// Library on a fresh database file; keep the `TempDir` alive for the test's duration.
pub async fn open_library() -> Result<(TempDir, Library), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = StoreOptions::builder(dir.path().join("database.sqlite"))
        .pool_size(8)
        .build()
        .await?;
    Ok((dir, Library::new(store)))
}

/// Book 1 ("어린왕자") and user 1001 ("홍길동"), both freshly created.
pub async fn seed(library: &Library) -> Result<(), CirculationError> {
    library
        .save_book(BookRecord {
            id: Some(1),
            title: Some("어린왕자".into()),
            author: Some("생텍쥐페리".into()),
            publisher: Some("열린책들".into()),
            isbn: Some("9788932917245".into()),
            category: Some("소설".into()),
            class_code: Some("863 생84어".into()),
        })
        .await?;
    library
        .save_user(UserRecord {
            id: Some(1001),
            name: Some("홍길동".into()),
            student_id: Some("20240001".into()),
        })
        .await?;
    Ok(())
}

/// Single-sheet workbook with string cells; empty strings are left blank.
pub fn workbook(headers: &[&str], rows: &[Vec<&str>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        for (col, header) in (0u16..).zip(headers) {
            sheet.write_string(0, col, *header).unwrap();
        }
        for (row, cells) in (1u32..).zip(rows) {
            for (col, cell) in (0u16..).zip(cells) {
                if !cell.is_empty() {
                    sheet.write_string(row, col, *cell).unwrap();
                }
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

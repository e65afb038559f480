mod common;

use calamine::{Data, Reader, Xlsx};
use circulation::prelude::*;
use std::io::Cursor;

#[tokio::test]
async fn imports_localized_headers_with_assigned_ids() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, library) = common::open_library().await?;
    let bytes = common::workbook(
        &["제목", "저자", "출판사", "ISBN", "분류", "청구기호"],
        &[
            vec!["어린왕자", "생텍쥐페리", "열린책들", "9788932917245", "소설", "863 생84어"],
            vec!["해리포터와 마법사의 돌", "J.K. 롤링", "문학수첩", "9788983927620", "판타지", "843 롤29해"],
        ],
    );

    assert_eq!(library.import(ImportKind::Books, bytes).await?, 2);
    let books = library.books().await?;
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].title.as_deref(), Some("어린왕자"));
    assert_eq!(books[1].class_code.as_deref(), Some("843 롤29해"));
    assert!(books.iter().all(|b| b.status == BookStatus::Available));
    assert_ne!(books[0].id, books[1].id);
    Ok(())
}

#[tokio::test]
async fn latin_header_takes_precedence() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, library) = common::open_library().await?;
    let bytes = common::workbook(
        &["id", "이름", "Name", "학번"],
        &[vec!["1001", "홍길동", "Hong Gildong", "20240001"], vec!["1002", "김철수", "", "20240002"]],
    );

    assert_eq!(library.import(ImportKind::Users, bytes).await?, 2);
    assert_eq!(library.user(1001).await?.name.as_deref(), Some("Hong Gildong"));
    // blank Latin cell falls back to the localized column
    assert_eq!(library.user(1002).await?.name.as_deref(), Some("김철수"));
    Ok(())
}

#[tokio::test]
async fn reimport_overwrites_and_unborrows() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, library) = common::open_library().await?;
    common::seed(&library).await?;
    library.borrow(1001, 1).await?;

    let bytes = common::workbook(
        &["ID", "Title", "status"],
        &[vec!["1", "The Little Prince", "BORROWED"]],
    );
    library.import(ImportKind::Books, bytes).await?;

    let book = library.book(1).await?;
    assert_eq!(book.title.as_deref(), Some("The Little Prince"));
    assert_eq!(book.status, BookStatus::Available);
    assert_eq!(book.author, None);
    Ok(())
}

/// One malformed row aborts the whole import; earlier rows are not committed.
#[tokio::test]
async fn malformed_row_commits_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, library) = common::open_library().await?;
    let bytes = common::workbook(
        &["ID", "Title"],
        &[vec!["1", "first"], vec!["two", "second"], vec!["3", "third"]],
    );

    match library.import(ImportKind::Books, bytes).await {
        Err(CirculationError::ImportError(msg)) => assert!(msg.contains("row 3"), "{msg}"),
        other => panic!("expected import error, got {other:?}"),
    }
    assert!(library.books().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn unrecognized_sheet_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, library) = common::open_library().await?;
    let bytes = common::workbook(&["nickname"], &[vec!["someone"]]);
    assert!(matches!(
        library.import(ImportKind::Users, bytes).await,
        Err(CirculationError::ImportError(_))
    ));
    assert!(matches!(
        library.import(ImportKind::Users, b"not a workbook".to_vec()).await,
        Err(CirculationError::ImportError(_))
    ));
    Ok(())
}

#[tokio::test]
async fn book_export_round_trips_descriptive_fields() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, source) = common::open_library().await?;
    common::seed(&source).await?;
    source.borrow(1001, 1).await?;

    let export = source.export(ExportKind::Books).await?;
    assert_eq!(export.filename, "books_export.xlsx");

    let (_dir2, target) = common::open_library().await?;
    assert_eq!(target.import(ImportKind::Books, export.bytes).await?, 1);

    let before = source.book(1).await?;
    let after = target.book(1).await?;
    assert_eq!(after.title, before.title);
    assert_eq!(after.author, before.author);
    assert_eq!(after.publisher, before.publisher);
    assert_eq!(after.isbn, before.isbn);
    assert_eq!(after.category, before.category);
    assert_eq!(after.class_code, before.class_code);
    assert_eq!(after.status, BookStatus::Available);
    Ok(())
}

#[tokio::test]
async fn transaction_export_denormalizes_names() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, library) = common::open_library().await?;
    common::seed(&library).await?;
    library.borrow(1001, 1).await?;
    library.return_book(1001, 1).await?;

    let export = library.export(ExportKind::Transactions).await?;
    assert_eq!(export.filename, "transactions_export.xlsx");

    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(Cursor::new(export.bytes))?;
    assert_eq!(workbook.sheet_names(), vec!["Transactions".to_string()]);
    let range = workbook.worksheet_range("Transactions")?;
    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(Data::to_string).collect())
        .collect();
    assert_eq!(rows[0], vec!["date", "userName", "studentId", "bookTitle", "action"]);
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[1][1..], &["홍길동", "20240001", "어린왕자", "RETURN"]);
    assert_eq!(&rows[2][1..], &["홍길동", "20240001", "어린왕자", "BORROW"]);
    Ok(())
}

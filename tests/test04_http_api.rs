mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use circulation::prelude::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "circulation-test-boundary";

async fn app() -> Result<(TempDir, Library, Router), Box<dyn std::error::Error>> {
    let (dir, library) = common::open_library().await?;
    common::seed(&library).await?;
    let router = create_router(library.clone(), &ApiOptions::default());
    Ok((dir, library, router))
}

async fn send(
    router: &Router,
    request: Request<Body>,
) -> Result<(StatusCode, Vec<u8>), Box<dyn std::error::Error>> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let body = response.into_body().collect().await?.to_bytes();
    Ok((status, body.to_vec()))
}

async fn get_json(router: &Router, uri: &str) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
    let (status, body) = send(router, Request::get(uri).body(Body::empty())?).await?;
    Ok((status, serde_json::from_slice(&body)?))
}

async fn post_json(
    router: &Router,
    uri: &str,
    body: &Value,
) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?;
    let (status, body) = send(router, request).await?;
    Ok((status, serde_json::from_slice(&body)?))
}

fn multipart(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {XLSX_CONTENT_TYPE}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload(uri: &str, body: Vec<u8>) -> Result<Request<Body>, axum::http::Error> {
    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
}

#[tokio::test]
async fn lists_books_with_camel_case_fields() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, _library, router) = app().await?;
    let (status, books) = get_json(&router, "/books").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books[0]["id"], 1);
    assert_eq!(books[0]["classCode"], "863 생84어");
    assert_eq!(books[0]["status"], "AVAILABLE");

    let (status, users) = get_json(&router, "/users").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users[0]["studentId"], "20240001");
    Ok(())
}

#[tokio::test]
async fn borrow_then_conflict_then_return() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, library, router) = app().await?;
    let body = json!({ "userId": 1001, "bookId": 1 });

    let (status, borrowed) = post_json(&router, "/borrow", &body).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(borrowed["message"], "Borrow completed");
    assert!(borrowed["transactionId"].as_i64().is_some());

    let (status, conflict) = post_json(&router, "/borrow", &body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(conflict, json!({ "error": "Book is already borrowed." }));

    let (status, returned) = post_json(&router, "/return", &body).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["message"], "Return completed");
    assert_eq!(library.book(1).await?.status, BookStatus::Available);

    let (status, log) = get_json(&router, "/transactions").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(log[0]["action"], "RETURN");
    assert_eq!(log[1]["action"], "BORROW");
    assert_eq!(log[1]["userId"], 1001);
    assert_eq!(log[1]["bookId"], 1);

    let (status, history) = get_json(&router, "/books/1/history").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn bad_requests_answer_400() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, _library, router) = app().await?;

    let (status, missing) = post_json(&router, "/borrow", &json!({ "userId": 9, "bookId": 1 })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(missing["error"], "Book or User not found.");

    let (status, _) = post_json(&router, "/borrow", &json!({ "userId": "x" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(&router, "/books/abc").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, not_found) = get_json(&router, "/books/42").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(not_found["error"], "Book 42 not found.");

    let (status, unknown) = get_json(&router, "/api/export/loans").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(unknown["error"].as_str().is_some_and(|e| e.contains("loans")));
    Ok(())
}

#[tokio::test]
async fn export_is_an_xlsx_download() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, _library, router) = app().await?;
    let response = router
        .clone()
        .oneshot(Request::get("/api/export/books").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"books_export.xlsx\""
    );
    let bytes = response.into_body().collect().await?.to_bytes();
    // xlsx is a zip container
    assert!(bytes.starts_with(b"PK"));
    Ok(())
}

#[tokio::test]
async fn multipart_import_reports_count() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, library, router) = app().await?;
    let sheet = common::workbook(
        &["ID", "Name", "StudentID"],
        &[vec!["1002", "김철수", "20240002"], vec!["1003", "이영희", "20240003"]],
    );

    let (status, body) = send(&router, upload("/api/import/users", multipart("file", "users.xlsx", &sheet))?).await?;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body)?;
    assert_eq!(body, json!({ "message": "Imported 2 users successfully", "count": 2 }));
    assert_eq!(library.users().await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn import_without_file_field_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, _library, router) = app().await?;

    let (status, body) = send(&router, upload("/api/import/books", multipart("attachment", "books.xlsx", b"x"))?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body)?;
    assert_eq!(body["error"], "No file uploaded");

    let request = Request::post("/api/import/books").body(Body::empty())?;
    let (status, body) = send(&router, request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body)?;
    assert_eq!(body["error"], "No file uploaded");
    Ok(())
}

#[tokio::test]
async fn unmatched_routes_fall_through() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, _library, router) = app().await?;

    let (status, body) = get_json(&router, "/api/unknown").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");

    let (status, body) = send(&router, Request::get("/catalog").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        String::from_utf8(body)?,
        "API Server is running. Frontend build not found."
    );
    Ok(())
}

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

use super::dto::{CirculationRequest, CirculationResponse, ErrorBody, ImportResponse};
use super::state::AppState;
use crate::error::CirculationError;
use crate::model::{Book, BookId, Transaction, User, UserId};
use crate::sheet::{ExportKind, ImportKind, XLSX_CONTENT_TYPE};

pub(crate) const MSG_NO_FILE: &str = "No file uploaded";
const MSG_FRONTEND_MISSING: &str = "API Server is running. Frontend build not found.";

type ApiResult<T> = Result<T, CirculationError>;

pub async fn list_books(State(state): State<AppState>) -> ApiResult<Json<Vec<Book>>> {
    Ok(Json(state.library.books().await?))
}

pub async fn get_book(
    State(state): State<AppState>,
    id: Result<Path<BookId>, PathRejection>,
) -> ApiResult<Json<Book>> {
    let Path(id) = id?;
    Ok(Json(state.library.book(id).await?))
}

pub async fn book_history(
    State(state): State<AppState>,
    id: Result<Path<BookId>, PathRejection>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let Path(id) = id?;
    // unknown book is an error, not an empty history
    state.library.book(id).await?;
    Ok(Json(state.library.book_history(id).await?))
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.library.users().await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
) -> ApiResult<Json<User>> {
    let Path(id) = id?;
    Ok(Json(state.library.user(id).await?))
}

pub async fn list_transactions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Transaction>>> {
    Ok(Json(state.library.transactions().await?))
}

pub async fn borrow(
    State(state): State<AppState>,
    body: Result<Json<CirculationRequest>, JsonRejection>,
) -> ApiResult<Json<CirculationResponse>> {
    let Json(req) = body?;
    let transaction_id = state.library.borrow(req.user_id, req.book_id).await?;
    Ok(Json(CirculationResponse {
        message: "Borrow completed".into(),
        transaction_id,
    }))
}

pub async fn return_book(
    State(state): State<AppState>,
    body: Result<Json<CirculationRequest>, JsonRejection>,
) -> ApiResult<Json<CirculationResponse>> {
    let Json(req) = body?;
    let transaction_id = state.library.return_book(req.user_id, req.book_id).await?;
    Ok(Json(CirculationResponse {
        message: "Return completed".into(),
        transaction_id,
    }))
}

pub async fn import_books(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportResponse>> {
    import_upload(&state, ImportKind::Books, multipart?).await
}

pub async fn import_users(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportResponse>> {
    import_upload(&state, ImportKind::Users, multipart?).await
}

async fn import_upload(
    state: &AppState,
    kind: ImportKind,
    mut multipart: Multipart,
) -> ApiResult<Json<ImportResponse>> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            upload = Some(field.bytes().await?.to_vec());
            break;
        }
    }
    let bytes = upload.ok_or_else(|| CirculationError::ValidationError(MSG_NO_FILE.into()))?;
    let count = state.library.import(kind, bytes).await?;
    Ok(Json(ImportResponse {
        message: format!("Imported {count} {} successfully", kind.as_str()),
        count,
    }))
}

pub async fn export(
    State(state): State<AppState>,
    kind: Result<Path<String>, PathRejection>,
) -> ApiResult<Response> {
    let Path(kind) = kind?;
    let kind: ExportKind = kind.parse()?;
    let file = state.library.export(kind).await?;
    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

/// Unknown `/api/...` paths.
pub async fn api_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Not found".into(),
        }),
    )
        .into_response()
}

/// Fallback when no UI bundle is installed.
pub async fn frontend_missing(uri: Uri) -> Response {
    tracing::debug!(path = uri.path(), "no frontend bundle to serve");
    (StatusCode::NOT_FOUND, MSG_FRONTEND_MISSING).into_response()
}

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::dto::ErrorBody;
use crate::error::CirculationError;

impl IntoResponse for CirculationError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = %self, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for CirculationError {
    fn from(rejection: JsonRejection) -> Self {
        CirculationError::ValidationError(format!("invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for CirculationError {
    fn from(rejection: PathRejection) -> Self {
        CirculationError::ValidationError(format!("invalid path: {}", rejection.body_text()))
    }
}

impl From<MultipartRejection> for CirculationError {
    fn from(_: MultipartRejection) -> Self {
        CirculationError::ValidationError(super::handlers::MSG_NO_FILE.into())
    }
}

impl From<MultipartError> for CirculationError {
    fn from(err: MultipartError) -> Self {
        CirculationError::ValidationError(format!("invalid upload: {}", err.body_text()))
    }
}

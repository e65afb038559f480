//! HTTP surface.
//!
//! JSON routes for reads and borrow/return, multipart upload for imports,
//! `.xlsx` downloads for exports. Everything else falls through to the UI
//! bundle when one is installed.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod state;

use std::path::{Path, PathBuf};

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{any, get, post};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub use state::AppState;

use crate::library::Library;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Router-level knobs that do not belong to the store.
#[derive(Debug, Clone)]
pub struct ApiOptions {
    /// Directory holding the built UI (`index.html` plus assets).
    pub static_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            static_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Build the application router.
pub fn create_router(library: Library, options: &ApiOptions) -> Router {
    let api = Router::new()
        .route("/books", get(handlers::list_books))
        .route("/books/{id}", get(handlers::get_book))
        .route("/books/{id}/history", get(handlers::book_history))
        .route("/users", get(handlers::list_users))
        .route("/users/{id}", get(handlers::get_user))
        .route("/transactions", get(handlers::list_transactions))
        .route("/borrow", post(handlers::borrow))
        .route("/return", post(handlers::return_book))
        .route("/api/import/books", post(handlers::import_books))
        .route("/api/import/users", post(handlers::import_users))
        .route("/api/export/{kind}", get(handlers::export))
        .route("/api/{*rest}", any(handlers::api_not_found))
        .layer(DefaultBodyLimit::max(options.max_upload_bytes))
        .with_state(AppState::new(library));

    with_frontend(api, options.static_dir.as_deref())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

fn with_frontend(router: Router, static_dir: Option<&Path>) -> Router {
    match static_dir {
        Some(dir) if dir.join("index.html").is_file() => {
            tracing::info!(dir = %dir.display(), "serving frontend bundle");
            let index = ServeFile::new(dir.join("index.html"));
            router.fallback_service(ServeDir::new(dir).not_found_service(index))
        }
        _ => router.fallback(handlers::frontend_missing),
    }
}

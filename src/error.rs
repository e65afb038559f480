use thiserror::Error;

#[derive(Debug, Error)]
pub enum CirculationError {
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Import error: {0}")]
    ImportError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl CirculationError {
    /// Expected, user-facing outcomes (bad input, missing rows, invalid transitions).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::NotFound(_) | Self::Conflict(_) | Self::ImportError(_)
        )
    }

    /// Connectivity or constraint failures in the store itself.
    #[must_use]
    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::SqliteError(_) | Self::ConnectionError(_))
    }
}

impl From<bb8::RunError<CirculationError>> for CirculationError {
    fn from(err: bb8::RunError<CirculationError>) -> Self {
        match err {
            bb8::RunError::User(inner) => inner,
            bb8::RunError::TimedOut => {
                CirculationError::ConnectionError("SQLite pool checkout timed out".into())
            }
        }
    }
}

impl From<tokio::task::JoinError> for CirculationError {
    fn from(err: tokio::task::JoinError) -> Self {
        CirculationError::Other(format!("sqlite spawn_blocking join error: {err}"))
    }
}

impl From<calamine::Error> for CirculationError {
    fn from(err: calamine::Error) -> Self {
        CirculationError::ImportError(format!("unreadable spreadsheet: {err}"))
    }
}

impl From<rust_xlsxwriter::XlsxError> for CirculationError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        CirculationError::ExportError(err.to_string())
    }
}

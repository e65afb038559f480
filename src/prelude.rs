//! Convenient imports for common functionality.

pub use crate::api::{ApiOptions, AppState, create_router};
pub use crate::error::CirculationError;
pub use crate::library::Library;
pub use crate::model::{
    Action, Book, BookId, BookRecord, BookStatus, Transaction, TransactionId, TransactionReport,
    User, UserId, UserRecord,
};
pub use crate::sheet::{ExportFile, ExportKind, ImportKind, XLSX_CONTENT_TYPE};
pub use crate::store::{Store, StoreOptions, StoreOptionsBuilder};

use crate::circulation;
use crate::error::CirculationError;
use crate::model::{
    Book, BookId, BookRecord, Transaction, TransactionId, User, UserId, UserRecord, timestamp_now,
};
use crate::repo::{books, transactions, users};
use crate::sheet::{ExportFile, ExportKind, ImportKind, export, import};
use crate::store::Store;

/// Async entry point for every circulation operation.
///
/// Holds the store handle explicitly; clone it freely (clones share the pool).
#[derive(Clone, Debug)]
pub struct Library {
    store: Store,
}

impl Library {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// # Errors
    /// Returns a store error if the query fails.
    pub async fn books(&self) -> Result<Vec<Book>, CirculationError> {
        self.store.read(books::list).await
    }

    /// # Errors
    /// Returns `NotFound` if no book has this id.
    pub async fn book(&self, id: BookId) -> Result<Book, CirculationError> {
        self.store
            .read(move |conn| books::find(conn, id))
            .await?
            .ok_or_else(|| CirculationError::NotFound(format!("Book {id} not found.")))
    }

    /// # Errors
    /// Returns a store error if the query fails.
    pub async fn users(&self) -> Result<Vec<User>, CirculationError> {
        self.store.read(users::list).await
    }

    /// # Errors
    /// Returns `NotFound` if no user has this id.
    pub async fn user(&self, id: UserId) -> Result<User, CirculationError> {
        self.store
            .read(move |conn| users::find(conn, id))
            .await?
            .ok_or_else(|| CirculationError::NotFound(format!("User {id} not found.")))
    }

    /// Whole circulation log, newest first.
    ///
    /// # Errors
    /// Returns a store error if the query fails.
    pub async fn transactions(&self) -> Result<Vec<Transaction>, CirculationError> {
        self.store.read(transactions::list).await
    }

    /// # Errors
    /// Returns a store error if the query fails.
    pub async fn book_history(&self, id: BookId) -> Result<Vec<Transaction>, CirculationError> {
        self.store
            .read(move |conn| transactions::list_for_book(conn, id))
            .await
    }

    /// Upsert one book; its status is reset to AVAILABLE.
    ///
    /// # Errors
    /// Returns a store error if the write fails.
    pub async fn save_book(&self, record: BookRecord) -> Result<BookId, CirculationError> {
        self.store.write(move |tx| books::upsert(tx, &record)).await
    }

    /// # Errors
    /// Returns a store error if the write fails.
    pub async fn save_user(&self, record: UserRecord) -> Result<UserId, CirculationError> {
        self.store.write(move |tx| users::upsert(tx, &record)).await
    }

    /// Borrow `book_id` for `user_id`; returns the new transaction id.
    ///
    /// # Errors
    /// `NotFound` or `Conflict` per [`circulation::borrow`]; store errors otherwise.
    pub async fn borrow(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<TransactionId, CirculationError> {
        let result = self
            .store
            .write(move |tx| circulation::borrow(tx, user_id, book_id, &timestamp_now()))
            .await;
        log_outcome("borrow", user_id, book_id, &result);
        result
    }

    /// Return `book_id`; any existing user may return any borrowed book.
    ///
    /// # Errors
    /// `NotFound` or `Conflict` per [`circulation::return_book`]; store errors otherwise.
    pub async fn return_book(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<TransactionId, CirculationError> {
        let result = self
            .store
            .write(move |tx| circulation::return_book(tx, user_id, book_id, &timestamp_now()))
            .await;
        log_outcome("return", user_id, book_id, &result);
        result
    }

    /// Upsert every row of the workbook's first sheet in one transaction.
    ///
    /// Either all rows are written or none are. Returns the number of rows processed.
    ///
    /// # Errors
    /// `ImportError` for unreadable workbooks or malformed rows; store errors otherwise.
    pub async fn import(&self, kind: ImportKind, bytes: Vec<u8>) -> Result<usize, CirculationError> {
        let count = match kind {
            ImportKind::Books => {
                let records =
                    tokio::task::spawn_blocking(move || import::parse_books(&bytes)).await??;
                self.store
                    .write(move |tx| {
                        for record in &records {
                            books::upsert(tx, record)?;
                        }
                        Ok(records.len())
                    })
                    .await?
            }
            ImportKind::Users => {
                let records =
                    tokio::task::spawn_blocking(move || import::parse_users(&bytes)).await??;
                self.store
                    .write(move |tx| {
                        for record in &records {
                            users::upsert(tx, record)?;
                        }
                        Ok(records.len())
                    })
                    .await?
            }
        };
        tracing::info!(kind = kind.as_str(), count, "import committed");
        Ok(count)
    }

    /// Render every row of `kind` as a one-sheet workbook.
    ///
    /// # Errors
    /// Store errors, or `ExportError` if the workbook cannot be written.
    pub async fn export(&self, kind: ExportKind) -> Result<ExportFile, CirculationError> {
        let bytes = self
            .store
            .read(move |conn| match kind {
                ExportKind::Books => export::books_workbook(&books::list(conn)?),
                ExportKind::Users => export::users_workbook(&users::list(conn)?),
                ExportKind::Transactions => {
                    export::transactions_workbook(&transactions::report(conn)?)
                }
            })
            .await?;
        Ok(ExportFile {
            filename: kind.filename(),
            bytes,
        })
    }
}

fn log_outcome(
    op: &'static str,
    user_id: UserId,
    book_id: BookId,
    result: &Result<TransactionId, CirculationError>,
) {
    match result {
        Ok(transaction_id) => {
            tracing::info!(op, user_id, book_id, transaction_id, "circulation recorded");
        }
        Err(err) if err.is_client_error() => {
            tracing::debug!(op, user_id, book_id, error = %err, "circulation rejected");
        }
        Err(err) => {
            tracing::error!(op, user_id, book_id, error = %err, "circulation failed");
        }
    }
}

//! Borrow/return transitions.
//!
//! A book moves AVAILABLE -> BORROWED only through [`borrow`] and
//! BORROWED -> AVAILABLE only through [`return_book`]. The status change is a
//! compare-and-set, and the log row is written on the same connection, so
//! callers run these inside one transaction (see `Store::write`).
//!
//! `return_book` does not check that the returning user is the one who
//! borrowed the book.

use rusqlite::Connection;

use crate::error::CirculationError;
use crate::model::{Action, BookId, BookStatus, TransactionId, UserId};
use crate::repo::{books, transactions, users};

pub const MSG_NOT_FOUND: &str = "Book or User not found.";
pub const MSG_ALREADY_BORROWED: &str = "Book is already borrowed.";
pub const MSG_NOT_BORROWED: &str = "Book is not currently borrowed.";

impl Action {
    /// Status a book must be in for this action to apply, and the status it ends in.
    #[must_use]
    pub fn transition(self) -> (BookStatus, BookStatus) {
        match self {
            Action::Borrow => (BookStatus::Available, BookStatus::Borrowed),
            Action::Return => (BookStatus::Borrowed, BookStatus::Available),
        }
    }

    fn conflict_message(self) -> &'static str {
        match self {
            Action::Borrow => MSG_ALREADY_BORROWED,
            Action::Return => MSG_NOT_BORROWED,
        }
    }
}

/// Mark an AVAILABLE book BORROWED and log a BORROW event.
///
/// # Errors
/// - `NotFound` if the user or the book does not exist
/// - `Conflict` if the book is already borrowed
/// - `SqliteError` on store failure
pub fn borrow(
    conn: &Connection,
    user_id: UserId,
    book_id: BookId,
    date: &str,
) -> Result<TransactionId, CirculationError> {
    apply(conn, Action::Borrow, user_id, book_id, date)
}

/// Mark a BORROWED book AVAILABLE and log a RETURN event.
///
/// # Errors
/// - `NotFound` if the user or the book does not exist
/// - `Conflict` if the book is not currently borrowed
/// - `SqliteError` on store failure
pub fn return_book(
    conn: &Connection,
    user_id: UserId,
    book_id: BookId,
    date: &str,
) -> Result<TransactionId, CirculationError> {
    apply(conn, Action::Return, user_id, book_id, date)
}

fn apply(
    conn: &Connection,
    action: Action,
    user_id: UserId,
    book_id: BookId,
    date: &str,
) -> Result<TransactionId, CirculationError> {
    let user = users::find(conn, user_id)?;
    let book = books::find(conn, book_id)?;
    if user.is_none() || book.is_none() {
        return Err(CirculationError::NotFound(MSG_NOT_FOUND.into()));
    }

    let (from, to) = action.transition();
    if books::set_status_if(conn, book_id, from, to)? == 0 {
        return Err(CirculationError::Conflict(action.conflict_message().into()));
    }
    transactions::insert(conn, user_id, book_id, action, date)
}

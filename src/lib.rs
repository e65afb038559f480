//! Library circulation backend.
//!
//! Books and users live in a SQLite database behind a bb8 pool. Borrow and
//! return are compare-and-set transitions inside one immediate transaction,
//! and both entities can be bulk-loaded from (and dumped to) spreadsheets.
//!
//! ```rust,no_run
//! use circulation::prelude::*;
//!
//! # async fn demo() -> Result<(), CirculationError> {
//! let store = StoreOptions::builder("database.sqlite").build().await?;
//! let library = Library::new(store);
//! let transaction_id = library.borrow(1001, 1).await?;
//! # let _ = transaction_id;
//! # Ok(()) }
//! ```

pub mod api;
pub mod circulation;
pub mod config;
pub mod error;
pub mod library;
pub mod logging;
pub mod model;
pub mod prelude;
pub mod repo;
pub mod sheet;
pub mod store;

pub use error::CirculationError;
pub use library::Library;

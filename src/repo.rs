//! Parameterized queries over the three tables.
//!
//! Every function takes a plain `&rusqlite::Connection`, so the same calls run
//! in autocommit mode or inside an open transaction (which derefs to a connection).

pub mod books;
pub mod transactions;
pub mod users;

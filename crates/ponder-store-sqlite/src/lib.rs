//! SQLite backend for the ponder social store.
//!
//! Built on [`tokio_rusqlite`], which confines every query to the
//! connection's own thread so the async runtime never blocks on disk.
//! Documents are stored one row per user/thought, with reference lists and
//! embedded reactions as JSON text columns; compound mutations run inside
//! a single transaction.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

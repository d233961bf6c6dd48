//! Core types, traits and rules for the ponder social graph.
//!
//! Everything here is transport- and storage-agnostic: the HTTP surface
//! and the SQLite backend live in sibling crates and depend on this one,
//! never the other way around.

pub mod engine;
pub mod error;
pub mod reaction;
pub mod store;
pub mod thought;
pub mod user;

pub use error::{Error, Result};

//! Persistence for the invitation registry.
//!
//! - **`sqlite`**: the SQLite schema and row-level reads/writes
//! - **`persistent`**: a registry that writes every mutation through to the store

mod fs_security;
pub mod persistent;
pub mod sqlite;

pub use persistent::{PersistentRegistry, StoreError};
pub use sqlite::SqliteStore;

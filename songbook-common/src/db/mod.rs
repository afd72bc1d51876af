//! Database access layer
//!
//! SQLite via sqlx. Schema creation is idempotent; the database file is
//! created on first run under the resolved root folder.

pub mod init;
pub mod songs;

pub use init::init_database;
pub use songs::{Song, SongFilter, SongLanguage, SongUpdate, SortKey, SortOrder};

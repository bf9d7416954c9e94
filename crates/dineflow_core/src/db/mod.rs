//! SQLite bootstrap for the ordering store.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - A connection is handed out only after every pending migration committed.
//! - A file written by a newer build is never opened, so its data is never
//!   touched by an older schema.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    /// One migration step failed; the whole batch was rolled back.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    NewerSchema {
        found: u32,
        supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::CreateDir { dir, source } => {
                write!(f, "cannot create database directory `{}`: {source}", dir.display())
            }
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "migration {version} ({name}) failed: {source}"),
            Self::NewerSchema { found, supported } => write!(
                f,
                "database schema version {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::CreateDir { source, .. } => Some(source),
            Self::Migration { source, .. } => Some(source),
            Self::NewerSchema { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

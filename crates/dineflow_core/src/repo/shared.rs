//! Error type and row codecs shared by all SQLite repositories.

use crate::db::DbError;
use crate::model::order::OrderStatus;
use crate::model::validation::ValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound { entity: &'static str, id: Uuid },
    /// Persisted row violates model invariants.
    InvalidData(String),
    /// Compare-and-set on order status lost against a concurrent writer.
    StaleStatus {
        id: Uuid,
        expected: OrderStatus,
        actual: OrderStatus,
    },
    /// Connection is missing a table this repository depends on.
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::StaleStatus {
                id,
                expected,
                actual,
            } => write!(
                f,
                "order {id} status changed concurrently: expected {expected}, found {actual}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is missing required table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Maps a failed invariant check on a loaded row to `InvalidData`.
pub(crate) fn check_row(
    check: Result<(), ValidationError>,
    table: &str,
) -> RepoResult<()> {
    check.map_err(|err| RepoError::InvalidData(format!("{table}: {err}")))
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn parse_u32(value: i64, column: &str) -> RepoResult<u32> {
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("out of range value `{value}` in {column}")))
}

/// Fails with `MissingRequiredTable` unless every table exists.
pub(crate) fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [*table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(*table));
        }
    }
    Ok(())
}

/// Default and maximum page size for list queries.
pub(crate) fn normalize_limit(limit: Option<u32>, default: u32, max: u32) -> u32 {
    match limit {
        Some(0) | None => default,
        Some(value) if value > max => max,
        Some(value) => value,
    }
}

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Kitchen and ordering clients may share one file; writers wait this long.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) the store at `path`, creating parent directories.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| DbError::CreateDir {
            dir: dir.to_path_buf(),
            source,
        })?;
    }
    prepare("file", Connection::open(path)?)
}

/// Fresh migrated store that lives as long as the connection.
pub fn open_db_in_memory() -> DbResult<Connection> {
    prepare("memory", Connection::open_in_memory()?)
}

fn prepare(mode: &str, mut conn: Connection) -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = conn
        .pragma_update(None, "foreign_keys", true)
        .and_then(|()| conn.busy_timeout(BUSY_TIMEOUT))
        .map_err(DbError::from)
        .and_then(|()| apply_migrations(&mut conn));

    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(()) => {
            info!("event=db_open module=db status=ok mode={mode} duration_ms={duration_ms}");
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={duration_ms} error={err}"
            );
            Err(err)
        }
    }
}

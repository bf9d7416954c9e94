//! Ordered schema steps for the ordering store.
//!
//! Steps are append-only: a shipped step is never edited, a change is a new
//! step with the next version.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;

/// `(version, name, sql)`, versions strictly increasing from 1.
const STEPS: &[(u32, &str, &str)] = &[
    (1, "catalog", include_str!("0001_catalog.sql")),
    (2, "offers", include_str!("0002_offers.sql")),
    (3, "orders", include_str!("0003_orders.sql")),
];

pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _, _)| *version)
}

/// Brings `conn` up to `latest_version()` in a single transaction.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let supported = latest_version();
    if found > supported {
        warn!(
            "event=db_migrate module=db status=error error_code=newer_schema found={found} supported={supported}"
        );
        return Err(DbError::NewerSchema { found, supported });
    }

    let pending = STEPS
        .iter()
        .filter(|(version, _, _)| *version > found)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for &&(version, name, sql) in &pending {
        tx.execute_batch(sql)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| DbError::Migration {
                version,
                name,
                source,
            })?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from={found} to={supported} steps={}",
        pending.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, STEPS};
    use rusqlite::Connection;

    #[test]
    fn versions_start_at_one_and_increase() {
        for (index, (version, _, _)) in STEPS.iter().enumerate() {
            assert_eq!(*version as usize, index + 1);
        }
    }

    #[test]
    fn applying_twice_is_a_no_op() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        apply_migrations(&mut conn).unwrap();
        let version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, latest_version());
    }
}

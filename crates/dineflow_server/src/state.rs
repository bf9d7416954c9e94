use std::sync::{Arc, Mutex, PoisonError};

use dineflow_core::{DbError, PricingPolicy, open_db, open_db_in_memory};
use rusqlite::Connection;
use tokio::task::spawn_blocking;

use super::{config::Config, error::AppError};

/// Shared handler state: one SQLite connection plus pricing settings.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    pub pricing: PricingPolicy,
}

impl AppState {
    pub fn open(config: &Config) -> Result<Self, DbError> {
        Ok(Self::with_connection(open_db(&config.db_path)?, config.pricing))
    }

    pub fn in_memory(pricing: PricingPolicy) -> Result<Self, DbError> {
        Ok(Self::with_connection(open_db_in_memory()?, pricing))
    }

    fn with_connection(conn: Connection, pricing: PricingPolicy) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            pricing,
        }
    }

    /// Runs `task` on the blocking pool with exclusive access to the connection.
    pub async fn run<T, F>(&self, task: F) -> Result<T, AppError>
    where
        F: FnOnce(&Connection) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        spawn_blocking(move || {
            let conn = db.lock().unwrap_or_else(PoisonError::into_inner);
            task(&conn)
        })
        .await?
    }
}

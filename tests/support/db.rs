//! Temporary SQLite databases for integration tests.

use std::sync::Arc;

use tempfile::TempDir;
use trigger_swap::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
use trigger_swap::adapter::outbound::sqlite::SqliteOrderStore;

/// Migrated database in a temporary directory, removed on drop.
pub struct TempDb {
    _dir: TempDir,
    store: Arc<SqliteOrderStore>,
}

impl TempDb {
    pub fn create() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("orders.db");
        let pool = create_pool(&path.to_string_lossy()).expect("create sqlite pool");
        run_migrations(&pool).expect("run migrations");
        Self {
            _dir: dir,
            store: Arc::new(SqliteOrderStore::new(pool)),
        }
    }

    pub fn store(&self) -> Arc<SqliteOrderStore> {
        Arc::clone(&self.store)
    }
}

use std::sync::Arc;

use ratewatch_core::db::{self, DbPool};
use tempfile::TempDir;

/// Creates a migrated database in a fresh temp directory and returns the pool.
/// The TempDir must be kept alive for the duration of the test.
pub fn setup_test_db() -> (Arc<DbPool>, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db").to_string_lossy().to_string();

    let pool = db::create_pool(&db_path).expect("Failed to create database pool");
    db::run_migrations(&pool).expect("Failed to run migrations");

    (pool, temp_dir)
}

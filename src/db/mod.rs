use std::fs;
use std::path::Path;
use std::sync::Arc;

use diesel::connection::{Connection, SimpleConnection};
use diesel::r2d2;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{error, info};

use crate::errors::{DatabaseError, Error, Result};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

pub mod seed;

/// Path of the in-memory database, the default for tests and demos.
pub const IN_MEMORY_DB: &str = ":memory:";

pub fn init(app_data_dir: &str) -> Result<String> {
    let db_path = get_db_path(app_data_dir);

    if db_path == IN_MEMORY_DB {
        info!("Using an in-memory SQLite database");
        return Ok(db_path);
    }

    if let Some(db_dir) = Path::new(&db_path).parent() {
        if !db_dir.exists() {
            fs::create_dir_all(db_dir)
                .map_err(|e| DatabaseError::FileCreationFailed(e.to_string()))?;
        }
    }

    {
        let mut conn =
            SqliteConnection::establish(&db_path).map_err(DatabaseError::ConnectionFailed)?;
        conn.batch_execute(
            "\n            PRAGMA journal_mode = WAL;\n            PRAGMA foreign_keys = ON;\n            PRAGMA busy_timeout = 30000;\n            PRAGMA synchronous  = NORMAL;\n        ",
        )
        .map_err(Error::from)?;
    }

    info!("Using file database: {}", db_path);
    Ok(db_path)
}

pub fn create_pool(db_path: &str) -> Result<Arc<DbPool>> {
    let manager = ConnectionManager::<SqliteConnection>::new(db_path);
    // An in-memory database exists per connection, so the pool must hand every
    // caller the same one.
    let max_size = if db_path == IN_MEMORY_DB { 1 } else { 8 };
    let pool = r2d2::Pool::builder()
        .max_size(max_size)
        .min_idle(Some(1)) // Keep at least one connection ready
        .connection_timeout(std::time::Duration::from_secs(30))
        .connection_customizer(Box::new(ConnectionCustomizer {}))
        .build(manager)
        .map_err(DatabaseError::PoolCreationFailed)?;
    Ok(Arc::new(pool))
}

pub fn run_migrations(pool: &DbPool) -> Result<()> {
    info!("Running database migrations");
    let mut connection = get_connection(pool)?;

    let result = connection.run_pending_migrations(MIGRATIONS).map_err(|e| {
        error!("Database migration failed: {}", e);
        Error::Database(DatabaseError::MigrationFailed(e.to_string()))
    })?;

    if result.is_empty() {
        info!("No pending migrations to apply.");
    } else {
        info!("Applied the following migrations:");
        for migration_version in &result {
            info!("  - {}", migration_version);
        }
    }

    Ok(())
}

pub fn get_db_path(app_data_dir: &str) -> String {
    // Try to get the database URL from the environment variable
    std::env::var("DATABASE_URL").unwrap_or_else(|_| {
        if app_data_dir == IN_MEMORY_DB {
            return IN_MEMORY_DB.to_string();
        }
        Path::new(app_data_dir)
            .join("ratewatch.db")
            .to_string_lossy()
            .to_string()
    })
}

/// Gets a connection from the pool
pub fn get_connection(pool: &Pool<ConnectionManager<SqliteConnection>>) -> Result<DbConnection> {
    Ok(pool.get()?)
}

#[derive(Debug)]
struct ConnectionCustomizer;

impl r2d2::CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionCustomizer {
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        use diesel::RunQueryDsl;

        diesel::sql_query(
            "\n            PRAGMA foreign_keys = ON;\n            PRAGMA busy_timeout = 30000;\n            PRAGMA synchronous = NORMAL;\n        ",
        )
        .execute(conn)
        .map_err(diesel::r2d2::Error::QueryError)?;

        Ok(())
    }
}

/// Trait for executing database transactions
pub trait DbTransactionExecutor {
    /// Execute operations within a transaction and return the result
    fn execute<F, T, E>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut DbConnection) -> std::result::Result<T, E>,
        E: Into<Error>;
}

/// Implementation of DbTransactionExecutor for DbPool
impl DbTransactionExecutor for DbPool {
    fn execute<F, T, E>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut DbConnection) -> std::result::Result<T, E>,
        E: Into<Error>,
    {
        let mut conn = self.get()?;

        conn.transaction(|tx_conn| {
            f(tx_conn).map_err(|_| diesel::result::Error::RollbackTransaction)
        })
        .map_err(|e| Error::Database(DatabaseError::QueryFailed(e)))
    }
}

/// Implementation of DbTransactionExecutor for Arc<DbPool>
impl DbTransactionExecutor for Arc<DbPool> {
    fn execute<F, T, E>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut DbConnection) -> std::result::Result<T, E>,
        E: Into<Error>,
    {
        (**self).execute(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::prelude::*;

    #[test]
    fn in_memory_pool_shares_a_single_database() {
        let pool = create_pool(IN_MEMORY_DB).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");

        let mut conn = get_connection(&pool).expect("Failed to get connection");
        diesel::sql_query("INSERT INTO users (name) VALUES ('Smoke')")
            .execute(&mut conn)
            .expect("Failed to insert");
        drop(conn);

        // A later checkout must see the same database.
        let mut conn = get_connection(&pool).expect("Failed to get connection");
        let count: i64 = crate::schema::users::table
            .count()
            .get_result(&mut conn)
            .expect("Failed to count");
        assert_eq!(count, 1);
    }

    #[test]
    fn transaction_rolls_back_on_failure() {
        let pool = create_pool(IN_MEMORY_DB).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");

        let result: Result<()> = pool.execute(|conn: &mut DbConnection| -> Result<()> {
            diesel::sql_query("INSERT INTO users (name) VALUES ('Ghost')")
                .execute(conn)
                .map_err(Error::from)?;
            Err(Error::Conflict("forced failure".to_string()))
        });
        assert!(result.is_err());

        let mut conn = get_connection(&pool).expect("Failed to get connection");
        let count: i64 = crate::schema::users::table
            .count()
            .get_result(&mut conn)
            .expect("Failed to count");
        assert_eq!(count, 0);
    }
}

use anyhow::{Context as _, Result};
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::str::FromStr;
use tracing::debug;

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Open (creating if missing) the database at `database_url` and bring
    /// the schema up to date. Migration failures abort startup — the service
    /// never runs against a schema it does not understand.
    pub async fn new(database_url: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database URL '{database_url}'"))?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Return a clone of the connection pool (cheap — Arc-backed).
    /// Used to create a TaskStore that shares the same SQLite connection.
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    /// Run versioned migrations, then reconcile columns that were added
    /// after the first deployed schema.
    pub async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::migrate!("src/storage/migrations")
            .run(pool)
            .await
            .context("Failed to run database migrations")?;

        // The owner_id column arrived after the tasks table first shipped,
        // so databases created by the old schema lack it. ALTER TABLE
        // IF NOT EXISTS is not supported in SQLite; we attempt the ALTER
        // and tolerate only the "duplicate column name" error.
        let alter_stmts = ["ALTER TABLE tasks ADD COLUMN owner_id TEXT"];
        for stmt in alter_stmts {
            let result = sqlx::query(stmt).execute(pool).await;
            if let Err(e) = result {
                let msg = e.to_string();
                if !msg.contains("duplicate column") {
                    return Err(e.into());
                }
                debug!("column already present, skipping: {stmt}");
            }
        }

        Ok(())
    }
}

//! SQLite connection pool for the catalog.
//!
//! A catalog is a single SQLite file. The sync engine is the only writer and
//! commits one changelog event per transaction, while inspectors poll the
//! work queue concurrently, so the pool runs in WAL mode with a busy timeout
//! long enough to wait out a single event's commit.

use exn::ResultExt;
use sqlx::SqliteConnection;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

/// Catalog schema, applied on every connect.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
// One writer at a time anyway; the extra connections serve queue readers.
const MAX_CONNECTIONS: u32 = 4;

/// Open catalog database with its schema migrated.
///
/// Holds the pool only; all reads and writes go through a
/// [`Catalog`](crate::Catalog) built from it.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn new(options: SqliteConnectOptions, max: Option<u32>) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            // Apply the query-based PRAGMAs to every pooled connection, not
            // only the first one.
            .after_connect(|conn, meta| Box::pin(async move { Self::apply_pragmas(conn, meta).await }))
            .max_connections(max.unwrap_or(MAX_CONNECTIONS))
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Open (or create) the catalog file at `path`.
    ///
    /// The parent directory must already exist. A fresh file starts with an
    /// empty catalog and no sync cursor.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = Self::base_options().filename(path.as_ref()).create_if_missing(true);
        Self::new(options, None).await
    }

    /// Open a throwaway catalog that lives only as long as the pool.
    ///
    /// Available to other crates' tests, so not gated on `cfg(test)`.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = Self::base_options().filename(":memory:");
        // Every pooled connection to ":memory:" would get its own, empty,
        // database; stick to one.
        Self::new(options, Some(1)).await
    }

    fn base_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .journal_mode(SqliteJournalMode::Wal)
            // Cascading deletes (versions → artifacts → data/errors/orphans)
            // depend on this.
            .foreign_keys(true)
            .synchronous(SqliteSynchronous::Normal)
            // The sync engine holds the write lock for one event at a time;
            // queue readers must wait that out rather than fail.
            .busy_timeout(Duration::from_millis(1500))
    }

    /// Per-connection tuning for a small, write-light catalog.
    async fn apply_pragmas(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
        sqlx::query(
            r#"
                PRAGMA wal_autocheckpoint = 1000;
                PRAGMA cache_size = -8192;
                PRAGMA temp_store = MEMORY;
            "#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    #[instrument("performing database migrations", skip(self))]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Refresh planner statistics and close the pool once every connection
    /// is returned.
    pub async fn close(&self) {
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}

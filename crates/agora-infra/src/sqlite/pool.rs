//! Connection pools for the chat history database.
//!
//! Appends and deletes go through one writer connection, so they commit in
//! the order the hub issues them. History replays for joining sessions read
//! through a separate read-only pool and never wait on the writer in WAL mode.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Reader and writer handles onto one chat database.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Connect to `database_url` and bring the schema up to date.
    ///
    /// The readers are opened only after the `messages` table exists.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);
        let write_opts = base_opts;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(write_opts)
            .await?;

        // Schema first; read-only connections cannot create it.
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(read_opts)
            .await?;

        Ok(Self { reader, writer })
    }

    /// Open (creating if needed) the database file at `path`.
    pub async fn open(path: &Path) -> Result<Self, sqlx::Error> {
        Self::new(&database_url(path)).await
    }
}

/// SQLite connection URL for a database file.
pub fn database_url(path: &Path) -> String {
    format!("sqlite://{}?mode=rwc", path.display())
}

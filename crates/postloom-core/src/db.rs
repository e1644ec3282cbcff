//! Database connection management

use crate::{Error, Result, Storage};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Database handle
///
/// This is the main entry point for all persistence. It owns the SQLite
/// connection pool and hands out [`Storage`] views over it. Cloning is cheap
/// and clones share the pool, so concurrent generation runs can each hold one.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open or create a database at the given path
    ///
    /// # Example
    ///
    /// ```no_run
    /// use postloom_core::Database;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let db = Database::open("~/.postloom/postloom.db").await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = expand_path(path)?;
        info!("Opening database at: {}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Open database at the default location (~/.postloom/postloom.db)
    pub async fn open_default() -> Result<Self> {
        let path = Self::default_path()?;
        Self::open(path).await
    }

    /// Get the default database path
    pub fn default_path() -> Result<PathBuf> {
        Ok(home_dir()?.join(".postloom").join("postloom.db"))
    }

    async fn migrate(&self) -> Result<()> {
        info!("Running database migrations");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Migration(e.to_string()))?;

        debug!("Migrations completed successfully");
        Ok(())
    }

    /// Get the storage operations
    pub fn storage(&self) -> Storage {
        Storage::new(self.pool.clone())
    }

    /// Get the underlying pool (for advanced usage)
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection
    pub async fn close(self) {
        self.pool.close().await;
    }
}

pub(crate) fn home_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| Error::Other("HOME environment variable not set".to_string()))?;
    Ok(PathBuf::from(home))
}

/// Expand a leading `~/` to the home directory
pub(crate) fn expand_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    let path_str = path
        .to_str()
        .ok_or_else(|| Error::Other(format!("Invalid path: {}", path.display())))?;

    match path_str.strip_prefix("~/") {
        Some(stripped) => Ok(home_dir()?.join(stripped)),
        None => Ok(path.to_path_buf()),
    }
}

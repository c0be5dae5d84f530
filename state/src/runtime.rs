use crate::ActivityStatusRecord;
use crate::EXECUTION_ERROR_COLUMNS;
use crate::ExecutionError;
use crate::ExecutionErrorCreateParams;
use crate::NodeEventCreateParams;
use crate::ProcessStatus;
use crate::ProcessStatusRecord;
use crate::migrations::MIGRATOR;
use crate::model::datetime_to_epoch_seconds;
use crate::normalize_activity_id;
use anyhow::Context;
use chrono::DateTime;
use chrono::Utc;
use log::LevelFilter;
use sqlx::ConnectOptions;
use sqlx::QueryBuilder;
use sqlx::Sqlite;
use sqlx::SqliteConnection;
use sqlx::SqlitePool;
use sqlx::Transaction;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::sqlite::SqliteJournalMode;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::sqlite::SqliteSynchronous;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing::warn;

mod errors;
mod status_log;
#[cfg(test)]
mod test_support;

pub use errors::acknowledge_errors;

/// File extension used for named data stores under the home directory.
pub const DATA_STORE_EXTENSION: &str = "sqlite";

/// Keep well below SQLite's bound parameter limit.
const ACK_CHUNK_SIZE: usize = 500;

/// A named SQLite data store holding execution errors and the status log.
#[derive(Clone)]
pub struct DataStore {
    name: String,
    path: PathBuf,
    pool: Arc<SqlitePool>,
}

impl DataStore {
    /// Open (and migrate) the data store called `name` under `home`.
    ///
    /// The database lives at `home/<name>.sqlite` and is created on first use.
    pub async fn open(home: &Path, name: &str) -> anyhow::Result<Arc<Self>> {
        let path = data_store_path(home, name)?;
        tokio::fs::create_dir_all(home)
            .await
            .with_context(|| format!("failed to create data store home {}", home.display()))?;
        Self::open_named(name.to_string(), path).await
    }

    /// Open (and migrate) a data store at an explicit path.
    pub async fn open_path(path: PathBuf) -> anyhow::Result<Arc<Self>> {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        Self::open_named(name, path).await
    }

    async fn open_named(name: String, path: PathBuf) -> anyhow::Result<Arc<Self>> {
        let pool = match open_sqlite(&path).await {
            Ok(pool) => Arc::new(pool),
            Err(err) => {
                warn!("failed to open data store {name} at {}: {err}", path.display());
                return Err(err);
            }
        };
        debug!("opened data store {name} at {}", path.display());
        Ok(Arc::new(Self { name, path, pool }))
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    pub fn pool(&self) -> &SqlitePool {
        self.pool.as_ref()
    }

    /// Begin a transaction owned by the caller.
    ///
    /// Dropping the returned transaction without committing rolls it back.
    pub async fn begin(&self) -> anyhow::Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Begin a transaction that holds the write lock from its first statement.
    ///
    /// A deferred transaction that reads and then writes cannot wait out a
    /// competing writer: its read snapshot is stale once the other commits and
    /// SQLite fails the upgrade with `SQLITE_BUSY_SNAPSHOT`. Taking the lock up
    /// front lets the busy timeout queue competing writers instead.
    pub async fn begin_write(&self) -> anyhow::Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }

    /// Acknowledge errors by id in a transaction of its own.
    pub async fn acknowledge_errors(
        &self,
        error_ids: &[&str],
        acknowledged_by: &str,
        acknowledged_at: DateTime<Utc>,
    ) -> anyhow::Result<u64> {
        let mut tx = self.begin_write().await?;
        let acknowledged =
            acknowledge_errors(&mut *tx, error_ids, acknowledged_by, acknowledged_at).await?;
        tx.commit().await?;
        Ok(acknowledged)
    }
}

/// Resolve the file backing the data store called `name`.
pub fn data_store_path(home: &Path, name: &str) -> anyhow::Result<PathBuf> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        anyhow::bail!("data store name is empty");
    }
    if trimmed != name
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
        || trimmed.contains(char::is_control)
    {
        anyhow::bail!("invalid data store name: {name:?}");
    }
    Ok(home.join(format!("{name}.{DATA_STORE_EXTENSION}")))
}

async fn open_sqlite(path: &Path) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Off);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    MIGRATOR.run(&pool).await?;
    Ok(pool)
}

fn push_error_id_list<'a>(builder: &mut QueryBuilder<'a, Sqlite>, error_ids: &[&'a str]) {
    builder.push(" error_id IN (");
    let mut separated = builder.separated(", ");
    for error_id in error_ids {
        separated.push_bind(*error_id);
    }
    separated.push_unseparated(")");
}

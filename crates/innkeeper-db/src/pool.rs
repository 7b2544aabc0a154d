//! # Database Pool Management
//!
//! Connection pool, configuration and the lifecycle of the database file.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Lifecycle                                 │
//! │                                                                         │
//! │  DbConfig::from_env() / DbConfig::new(path)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::create(path)  new file + schema                              │
//! │  Database::open(path)    existing file only                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                            │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐                                 │  max_connections = 1:     │
//! │  │  │Conn1│  one writer, one session        │  every repository op      │
//! │  │  └─────┘                                 │  is one transaction on it │
//! │  └─────────────────────────────────────────┘                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::close()   checkpoint WAL → close pool → fsync file           │
//! │  Database::destroy() remove file + -wal + -shm                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Durability
//! `synchronous = FULL`: a committed transaction is on disk before the
//! repository call returns.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{ConfigError, DbError, DbResult};
use crate::migrations;
use crate::repository::RecordRepository;

/// Environment variable overriding the database path.
pub const DB_PATH_ENV: &str = "INNKEEPER_DB_PATH";

/// Environment variable overriding the connect timeout, in seconds.
pub const DB_TIMEOUT_ENV: &str = "INNKEEPER_DB_TIMEOUT_SECS";

/// File name used inside the platform data directory.
pub const DEFAULT_DB_FILE: &str = "innkeeper.db";

const MEMORY_PATH: &str = ":memory:";

/// Pool size. One connection is the only writer, and an in-memory database
/// exists only on that connection.
pub const MAX_CONNECTIONS: u32 = 1;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust
/// use innkeeper_db::DbConfig;
///
/// let config = DbConfig::new("./hotels.db").create_if_missing(false);
/// assert!(!config.create_if_missing);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// `synchronous = FULL` when true, `NORMAL` otherwise.
    /// Default: true
    pub synchronous_full: bool,

    /// Create the file when it does not exist.
    /// Default: true
    pub create_if_missing: bool,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            connect_timeout: Duration::from_secs(30),
            synchronous_full: true,
            create_if_missing: true,
            run_migrations: true,
        }
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// // Database is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            connect_timeout: Duration::from_secs(5),
            ..DbConfig::new(MEMORY_PATH)
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// ## Variables
    /// - `INNKEEPER_DB_PATH`: database file (default: platform data dir)
    /// - `INNKEEPER_DB_TIMEOUT_SECS`: connect timeout in seconds
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DbConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let path = match lookup(DB_PATH_ENV) {
            Some(path) if path.trim().is_empty() => {
                return Err(ConfigError::InvalidValue {
                    key: DB_PATH_ENV.to_string(),
                    reason: "path is empty".to_string(),
                })
            }
            Some(path) => PathBuf::from(path),
            None => default_database_path()?,
        };

        let mut config = DbConfig::new(path);
        if let Some(secs) = lookup(DB_TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: DB_TIMEOUT_ENV.to_string(),
                reason: format!("'{}' is not a whole number of seconds", secs),
            })?;
            config = config.connect_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets `synchronous = FULL` (true) or `NORMAL` (false).
    pub fn synchronous_full(mut self, full: bool) -> Self {
        self.synchronous_full = full;
        self
    }

    /// Sets whether a missing file is created.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(self.create_if_missing)
                .journal_mode(SqliteJournalMode::Wal)
        };

        let synchronous = if self.synchronous_full {
            SqliteSynchronous::Full
        } else {
            SqliteSynchronous::Normal
        };

        // Foreign keys are declared for documentation only; the repository
        // checks references itself and reports them as validation errors.
        Ok(options.synchronous(synchronous).foreign_keys(false))
    }
}

/// `<platform data dir>/innkeeper.db`.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.innkeeper.innkeeper/innkeeper.db`
/// - **Windows**: `%APPDATA%\innkeeper\innkeeper\data\innkeeper.db`
/// - **Linux**: `~/.local/share/innkeeper/innkeeper.db`
pub fn default_database_path() -> Result<PathBuf, ConfigError> {
    let dirs = directories::ProjectDirs::from("com", "innkeeper", "innkeeper")
        .ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().join(DEFAULT_DB_FILE))
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::open("hotels.db").await?;
/// let rooms = db.records().select_all(&Predicate::all(Table::Rooms)).await?;
/// db.close().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,

    /// Database file, `None` for in-memory databases.
    path: Option<PathBuf>,
}

impl Database {
    /// Connects with the given configuration.
    ///
    /// ## What This Does
    /// 1. Configures SQLite: WAL, `synchronous`, foreign keys off
    /// 2. Creates the single-connection pool
    /// 3. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_options = config.connect_options()?;
        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .min_connections(1)
            .acquire_timeout(config.connect_timeout)
            // An in-memory database lives exactly as long as its connection
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = MAX_CONNECTIONS,
            synchronous_full = config.synchronous_full,
            "Database pool created"
        );

        let path = (!config.is_in_memory()).then(|| config.database_path.clone());
        let db = Database { pool, path };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Creates a database file (and its parent directories) and initializes
    /// the schema. An existing file is opened and brought up to date.
    pub async fn create(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!(path = %path.display(), "Creating database");
        Database::new(DbConfig::new(path).create_if_missing(true)).await
    }

    /// Opens an existing database file.
    ///
    /// ## Errors
    /// `DbError::NotFound` when the file does not exist.
    pub async fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        if !tokio::fs::try_exists(path).await? {
            return Err(DbError::not_found("Database file", path.display().to_string()));
        }

        info!(path = %path.display(), "Opening database");
        Database::new(DbConfig::new(path).create_if_missing(false)).await
    }

    /// Deletes a database file together with its `-wal` and `-shm` files.
    ///
    /// ## Returns
    /// Whether the main file existed.
    pub async fn destroy(path: impl AsRef<Path>) -> DbResult<bool> {
        let path = path.as_ref();
        let existed = remove_if_exists(path).await?;

        for suffix in ["-wal", "-shm"] {
            let mut side = path.as_os_str().to_owned();
            side.push(suffix);
            remove_if_exists(Path::new(&side)).await?;
        }

        info!(path = %path.display(), existed, "Database destroyed");
        Ok(existed)
    }

    /// Runs database migrations.
    ///
    /// ## When To Call
    /// - Automatically called by `new()` if `run_migrations` is true
    /// - Manually call when migrations are disabled in config
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Database file, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the record repository.
    pub fn records(&self) -> RecordRepository {
        RecordRepository::new(self.pool.clone())
    }

    /// Flushes and closes the database.
    ///
    /// ## What This Does
    /// 1. Checkpoints the WAL into the main file
    /// 2. Closes the pool (waits for the connection to be returned)
    /// 3. `fsync`s the database file
    ///
    /// After calling close, all repository operations fail.
    pub async fn close(&self) -> DbResult<()> {
        info!("Closing database");

        if self.path.is_some() {
            sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
                .execute(&self.pool)
                .await?;
        }

        self.pool.close().await;

        if let Some(path) = &self.path {
            let file = tokio::fs::File::open(path).await?;
            file.sync_all().await?;
            debug!(path = %path.display(), "Database file synced");
        }

        Ok(())
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

async fn remove_if_exists(path: &Path) -> DbResult<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

use anyhow::{Context, Result};
use log::info;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use std::time::Duration;

use crate::entities::kv_entry;
use crate::repositories::KvRepository;

/// An in-memory database vanishes with its connection, so it must outlive any session
const MEMORY_CONNECTION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Durable key/value storage backed by SQLite.
///
/// Cloning is cheap and every clone shares the same connection pool.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    pub conn: DatabaseConnection,
}

impl LocalStorage {
    /// Open (or create) the database file at `path`.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create storage directory: {}", parent.display()))?;
            }
        }

        let url = format!("sqlite://{}?mode=rwc", path.display());
        let mut options = ConnectOptions::new(url);
        options.sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        info!("💾 Opened storage at {}", path.display());
        Self::with_connection(conn).await
    }

    /// Open a private in-memory database. Data is lost when the last clone drops.
    pub async fn in_memory() -> Result<Self> {
        let mut options = ConnectOptions::new("sqlite::memory:".to_string());
        // One pooled connection keeps every query on the same in-memory database
        options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(MEMORY_CONNECTION_TTL)
            .max_lifetime(MEMORY_CONNECTION_TTL)
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .context("Failed to open in-memory database")?;
        Self::with_connection(conn).await
    }

    async fn with_connection(conn: DatabaseConnection) -> Result<Self> {
        let storage = Self { conn };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Initialize database schema
    async fn init_schema(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        let schema = Schema::new(backend);
        let stmt = schema
            .create_table_from_entity(kv_entry::Entity)
            .if_not_exists()
            .to_owned();

        self.conn
            .execute(backend.build(&stmt))
            .await
            .context("Failed to create kv_entries table")?;
        Ok(())
    }

    /// Read a raw value.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        KvRepository::get(&self.conn, key).await
    }

    /// Write a raw value, replacing any previous one.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        KvRepository::set(&self.conn, key, value).await
    }

    /// Delete a key.
    pub async fn remove(&self, key: &str) -> Result<()> {
        KvRepository::remove(&self.conn, key).await
    }

    /// List every key currently stored.
    pub async fn keys(&self) -> Result<Vec<String>> {
        KvRepository::keys(&self.conn).await
    }
}

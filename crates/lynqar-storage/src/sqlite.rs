// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of [`KeyValueStore`].

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use lynqar_config::StorageConfig;
use lynqar_core::{KeyValueStore, LynqarError};

use crate::database::{map_tr_err, Database};

/// Key-value store backed by the `settings` table.
///
/// Each `put` is a single UPSERT statement, so SQLite's transaction
/// guarantees make it atomic per key.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open the database named in `config`.
    pub async fn open(config: &StorageConfig) -> Result<Self, LynqarError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        Ok(Self { db })
    }

    pub async fn open_in_memory() -> Result<Self, LynqarError> {
        Ok(Self {
            db: Database::open_in_memory().await?,
        })
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LynqarError> {
        let key = key.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<Option<Vec<u8>>, rusqlite::Error> {
                conn.query_row(
                    "SELECT value FROM settings WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LynqarError> {
        let owned_key = key.to_string();
        let len = value.len();
        let updated_at = chrono::Utc::now().to_rfc3339();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                    updated_at = excluded.updated_at",
                    params![owned_key, value, updated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(key, bytes = len, "setting written");
        Ok(())
    }

    async fn flush(&self) -> Result<(), LynqarError> {
        self.db.checkpoint().await
    }
}

// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness that assembles a session over a chosen substrate.
//!
//! Uses a cheap KDF work factor so tests derive keys in milliseconds.

use std::sync::Arc;
use std::time::Duration;

use lynqar_core::{KeyValueStore, LynqarError};
use lynqar_storage::{MemoryStore, SqliteStore};
use lynqar_vault::{SessionGuard, SessionPolicy, VaultStore};
use secrecy::SecretString;
use tempfile::TempDir;

/// Passphrase used by the scenario tests.
pub const TEST_PASSPHRASE: &str = "correcthorse1";

/// Iteration count for tests. Far below the production floor.
pub const FAST_KDF_ITERATIONS: u32 = 1_000;

/// Wrap a literal as a secret.
pub fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

enum Backend {
    Memory,
    Sqlite,
    Custom(Arc<dyn KeyValueStore>),
}

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    backend: Backend,
    policy: SessionPolicy,
    setup_with: Option<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            backend: Backend::Memory,
            policy: SessionPolicy {
                kdf_iterations: FAST_KDF_ITERATIONS,
                ..SessionPolicy::default()
            },
            setup_with: None,
        }
    }

    /// Back the vault with an on-disk SQLite database in a temp directory.
    pub fn with_sqlite(mut self) -> Self {
        self.backend = Backend::Sqlite;
        self
    }

    /// Back the vault with a caller-provided store.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.backend = Backend::Custom(store);
        self
    }

    pub fn with_auto_lock(mut self, timeout: Duration) -> Self {
        self.policy.auto_lock = timeout;
        self
    }

    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.policy.check_interval = interval;
        self
    }

    /// Run `setup` with `passphrase` as part of `build`, leaving the session unlocked.
    pub fn set_up_with(mut self, passphrase: &str) -> Self {
        self.setup_with = Some(passphrase.to_string());
        self
    }

    pub async fn build(self) -> Result<TestHarness, LynqarError> {
        let (kv, temp_dir): (Arc<dyn KeyValueStore>, Option<TempDir>) = match self.backend {
            Backend::Memory => (Arc::new(MemoryStore::new()), None),
            Backend::Custom(kv) => (kv, None),
            Backend::Sqlite => {
                let dir = TempDir::new().map_err(LynqarError::storage)?;
                let config = lynqar_config::StorageConfig {
                    database_path: dir.path().join("test.db").to_string_lossy().into_owned(),
                    wal_mode: true,
                };
                (Arc::new(SqliteStore::open(&config).await?), Some(dir))
            }
        };

        let guard = SessionGuard::open(VaultStore::new(kv.clone()), self.policy.clone()).await?;
        if let Some(passphrase) = &self.setup_with {
            guard.setup(secret(passphrase), secret(passphrase)).await?;
        }

        Ok(TestHarness {
            guard: Arc::new(guard),
            kv,
            policy: self.policy,
            _temp_dir: temp_dir,
        })
    }
}

/// A session plus the substrate behind it.
pub struct TestHarness {
    guard: Arc<SessionGuard>,
    kv: Arc<dyn KeyValueStore>,
    policy: SessionPolicy,
    _temp_dir: Option<TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn guard(&self) -> &Arc<SessionGuard> {
        &self.guard
    }

    pub fn kv(&self) -> &Arc<dyn KeyValueStore> {
        &self.kv
    }

    pub fn vault_store(&self) -> VaultStore {
        VaultStore::new(self.kv.clone())
    }

    /// Simulate a process restart: a fresh, locked session over the same substrate.
    pub async fn restart(&mut self) -> Result<(), LynqarError> {
        let guard = SessionGuard::open(self.vault_store(), self.policy.clone()).await?;
        self.guard = Arc::new(guard);
        Ok(())
    }
}

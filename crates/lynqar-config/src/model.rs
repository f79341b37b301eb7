// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Lynqar vault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently falling back to a default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lowest PBKDF2 iteration count the configuration accepts.
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Lowest master passphrase length policy the configuration accepts.
pub const MIN_PASSPHRASE_LENGTH: usize = 8;

/// Top-level Lynqar configuration.
///
/// Every section is optional and defaults to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LynqarConfig {
    /// Key derivation and passphrase policy.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Session lock behavior.
    #[serde(default)]
    pub session: SessionConfig,

    /// Durable storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Key derivation and passphrase policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// PBKDF2-HMAC-SHA256 iteration count (default: 100000).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Minimum master passphrase length in characters (default: 8).
    #[serde(default = "default_min_passphrase_length")]
    pub min_passphrase_length: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: default_kdf_iterations(),
            min_passphrase_length: default_min_passphrase_length(),
        }
    }
}

fn default_kdf_iterations() -> u32 {
    MIN_KDF_ITERATIONS
}

fn default_min_passphrase_length() -> usize {
    MIN_PASSPHRASE_LENGTH
}

/// Session lock behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Idle time after which an unlocked vault locks itself (default: 900 = 15 minutes).
    #[serde(default = "default_auto_lock_secs")]
    pub auto_lock_secs: u64,

    /// How often the idle check runs (default: 30).
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_lock_secs: default_auto_lock_secs(),
            check_interval_secs: default_check_interval_secs(),
        }
    }
}

impl SessionConfig {
    pub fn auto_lock(&self) -> Duration {
        Duration::from_secs(self.auto_lock_secs)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}

fn default_auto_lock_secs() -> u64 {
    15 * 60
}

fn default_check_interval_secs() -> u64 {
    30
}

/// Durable storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("lynqar").join("lynqar.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("lynqar.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level for lynqar crates (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

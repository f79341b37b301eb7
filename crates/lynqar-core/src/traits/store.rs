// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable key-value substrate consumed by the vault store.

use async_trait::async_trait;

use crate::error::LynqarError;

/// Logical key holding the "vault initialized" marker.
pub const MARKER_KEY: &str = "initialized";

/// Logical key holding the encrypted entry collection.
pub const ENTRIES_KEY: &str = "entries";

/// A durable store offering get/put by key.
///
/// Implementations must make each `put` atomic for its key: a concurrent or
/// later `get` sees either the previous value or the new one, never a
/// partial write. No cross-key transactionality is assumed.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Fetch the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LynqarError>;

    /// Replace the value stored under `key`.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LynqarError>;

    /// Make committed writes self-contained on disk before shutdown.
    async fn flush(&self) -> Result<(), LynqarError> {
        Ok(())
    }
}

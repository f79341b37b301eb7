// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Volatile [`KeyValueStore`] for tests and throwaway sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use lynqar_core::{KeyValueStore, LynqarError};

/// In-memory store. Contents are lost when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LynqarError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LynqarError> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

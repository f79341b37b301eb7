// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A [`KeyValueStore`] whose writes and reads can be made to fail on demand.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use lynqar_core::{KeyValueStore, LynqarError};
use lynqar_storage::MemoryStore;

const NO_LIMIT: usize = usize::MAX;

/// In-memory store with fault injection.
///
/// A failed `put` leaves the previous value in place, like an aborted
/// SQLite transaction.
#[derive(Debug)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_next_put: AtomicBool,
    fail_next_get: AtomicBool,
    /// Remaining successful puts before every put fails.
    puts_left: AtomicUsize,
    puts: AtomicUsize,
}

impl Default for FlakyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_next_put: AtomicBool::new(false),
            fail_next_get: AtomicBool::new(false),
            puts_left: AtomicUsize::new(NO_LIMIT),
            puts: AtomicUsize::new(0),
        }
    }

    /// Make the next `put` fail once.
    pub fn fail_next_put(&self) {
        self.fail_next_put.store(true, Ordering::SeqCst);
    }

    /// Make the next `get` fail once.
    pub fn fail_next_get(&self) {
        self.fail_next_get.store(true, Ordering::SeqCst);
    }

    /// Allow `n` more successful puts, then fail every put.
    pub fn fail_puts_after(&self, n: usize) {
        self.puts_left.store(n, Ordering::SeqCst);
    }

    /// Clear all injected failures.
    pub fn heal(&self) {
        self.fail_next_put.store(false, Ordering::SeqCst);
        self.fail_next_get.store(false, Ordering::SeqCst);
        self.puts_left.store(NO_LIMIT, Ordering::SeqCst);
    }

    /// Number of successful puts so far.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    fn injected(op: &str) -> LynqarError {
        LynqarError::storage(std::io::Error::other(format!("injected {op} failure")))
    }

    fn take_put_budget(&self) -> bool {
        if self.fail_next_put.swap(false, Ordering::SeqCst) {
            return false;
        }
        self.puts_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                NO_LIMIT => Some(NO_LIMIT),
                0 => None,
                n => Some(n - 1),
            })
            .is_ok()
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LynqarError> {
        if self.fail_next_get.swap(false, Ordering::SeqCst) {
            return Err(Self::injected("get"));
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LynqarError> {
        if !self.take_put_budget() {
            return Err(Self::injected("put"));
        }
        self.inner.put(key, value).await?;
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

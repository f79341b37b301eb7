// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Lynqar vault.

use thiserror::Error;

/// The error type shared by every Lynqar crate.
#[derive(Debug, Error)]
pub enum LynqarError {
    /// Configuration errors (invalid TOML, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The key derivation primitive failed. Fatal; do not retry with the same input.
    #[error("key derivation failed: {0}")]
    Derivation(String),

    /// Wrong key, or tampered/truncated ciphertext.
    ///
    /// Both causes render the same message.
    #[error("invalid passphrase or corrupted vault")]
    Authentication,

    /// Decryption succeeded but the plaintext is not a well-formed entry collection.
    #[error("vault store is corrupt: {0}")]
    CorruptStore(String),

    /// Durable substrate failure (database connection, write failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An operation that needs the master key was attempted while the vault is locked.
    #[error("vault is locked")]
    NotUnlocked,

    /// Unlock was attempted before the vault was set up.
    #[error("vault has not been set up")]
    NotInitialized,

    /// Setup was attempted on a vault that already exists.
    #[error("vault is already set up")]
    AlreadyInitialized,

    /// Unlock was attempted while a key is already held.
    #[error("vault is already unlocked")]
    AlreadyUnlocked,

    /// The new master passphrase is shorter than the configured minimum.
    #[error("passphrase must be at least {min} characters long")]
    PassphraseTooShort { min: usize },

    /// Passphrase and confirmation differ during setup.
    #[error("passphrases do not match")]
    PassphraseMismatch,

    /// A draft entry failed validation.
    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LynqarError {
    /// Wrap any substrate error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }

    /// Whether the caller may reasonably retry the same operation.
    ///
    /// Only substrate failures qualify. An authentication failure needs a
    /// different passphrase, not a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted persistence of the entry collection.
//!
//! The whole collection is sealed as one blob and written with a single
//! `put`, so the substrate always holds either the previous or the new
//! collection. Nothing here keeps a key; every operation borrows one.

use std::sync::Arc;

use chrono::Utc;
use lynqar_core::{
    EntryCollection, EntryId, KeyValueStore, LynqarError, NewEntry, ENTRIES_KEY, MARKER_KEY,
};
use tracing::debug;

use crate::crypto::{self, EncryptedBlob};
use crate::kdf::MasterKey;

/// Value stored under [`MARKER_KEY`] once setup has completed.
pub const MARKER_VALUE: &[u8] = b"true";

/// Fixed plaintext sealed and opened by [`VaultStore::verify_passphrase`].
const VERIFY_PLAINTEXT: &[u8] = b"lynqar-test";

/// Result of [`VaultStore::remove_entry`].
#[derive(Debug)]
pub struct Removal {
    pub collection: EntryCollection,
    pub removed: bool,
}

/// Mediates every read and write of vault state through the envelope.
#[derive(Clone)]
pub struct VaultStore {
    kv: Arc<dyn KeyValueStore>,
}

impl VaultStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub fn backend(&self) -> &str {
        self.kv.name()
    }

    /// Write the initialized marker. Safe to call more than once.
    pub async fn initialize(&self) -> Result<(), LynqarError> {
        if self.is_initialized().await? {
            return Ok(());
        }
        self.kv.put(MARKER_KEY, MARKER_VALUE.to_vec()).await?;
        debug!(backend = self.backend(), "vault marker written");
        Ok(())
    }

    pub async fn is_initialized(&self) -> Result<bool, LynqarError> {
        let marker = self.kv.get(MARKER_KEY).await?;
        Ok(marker.as_deref() == Some(MARKER_VALUE))
    }

    async fn stored_blob(&self) -> Result<Option<EncryptedBlob>, LynqarError> {
        match self.kv.get(ENTRIES_KEY).await? {
            Some(bytes) => EncryptedBlob::from_stored(bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Decrypt and parse the persisted collection.
    ///
    /// No blob means an empty collection. A blob that does not authenticate
    /// is [`LynqarError::Authentication`]; one that authenticates but does not
    /// parse is [`LynqarError::CorruptStore`].
    pub async fn load(&self, key: &MasterKey) -> Result<EntryCollection, LynqarError> {
        let Some(blob) = self.stored_blob().await? else {
            return Ok(EntryCollection::new());
        };
        let plaintext = crypto::open(key, &blob)?;
        EntryCollection::from_json(&plaintext)
    }

    /// Seal `collection` and replace the stored blob.
    pub async fn commit(
        &self,
        key: &MasterKey,
        collection: &EntryCollection,
    ) -> Result<(), LynqarError> {
        let json = collection.to_json()?;
        let blob = crypto::seal(key, &json)?;
        self.kv.put(ENTRIES_KEY, blob.into_bytes()).await?;
        debug!(entries = collection.len(), "collection committed");
        Ok(())
    }

    /// Append a new entry built from `draft` and commit.
    ///
    /// `collection` is left untouched; the committed collection is returned.
    pub async fn add_entry(
        &self,
        key: &MasterKey,
        collection: &EntryCollection,
        draft: NewEntry,
    ) -> Result<EntryCollection, LynqarError> {
        draft.validate()?;

        let mut id = EntryId::generate();
        while collection.contains(&id) {
            id = EntryId::generate();
        }

        let mut updated = collection.clone();
        updated.push(draft.into_entry(id, Utc::now()));
        self.commit(key, &updated).await?;
        Ok(updated)
    }

    /// Remove the entry with `id` and commit.
    ///
    /// An absent id commits nothing and reports `removed == false`.
    pub async fn remove_entry(
        &self,
        key: &MasterKey,
        collection: &EntryCollection,
        id: &EntryId,
    ) -> Result<Removal, LynqarError> {
        if !collection.contains(id) {
            return Ok(Removal {
                collection: collection.clone(),
                removed: false,
            });
        }

        let mut updated = collection.clone();
        updated.remove(id);
        self.commit(key, &updated).await?;
        Ok(Removal {
            collection: updated,
            removed: true,
        })
    }

    /// Flush the substrate before the process exits.
    pub async fn flush(&self) -> Result<(), LynqarError> {
        self.kv.flush().await
    }

    /// Whether `key` is the vault key.
    ///
    /// Seals and opens a fixed plaintext, then opens the stored blob if one
    /// exists. Authentication failures yield `false`; substrate errors
    /// propagate.
    pub async fn verify_passphrase(&self, key: &MasterKey) -> Result<bool, LynqarError> {
        let probe = crypto::seal(key, VERIFY_PLAINTEXT)?;
        match crypto::open(key, &probe) {
            Ok(plain) if plain.as_slice() == VERIFY_PLAINTEXT => {}
            Ok(_) | Err(LynqarError::Authentication) => return Ok(false),
            Err(e) => return Err(e),
        }

        let blob = match self.stored_blob().await {
            Ok(Some(blob)) => blob,
            Ok(None) => return Ok(true),
            Err(LynqarError::Authentication) => return Ok(false),
            Err(e) => return Err(e),
        };
        match crypto::open(key, &blob) {
            Ok(_) => Ok(true),
            Err(LynqarError::Authentication) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

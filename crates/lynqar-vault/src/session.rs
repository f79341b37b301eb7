// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session lock state machine.
//!
//! States: Setup (no vault) -> Unlocked <-> Locked. The master key and the
//! decrypted collection live only inside the `Unlocked` variant, so leaving
//! that state drops both together.
//!
//! All load-modify-commit sequences run while holding the state mutex.
//! Key derivation runs outside it, and the state is re-checked before a
//! derived key is installed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use lynqar_config::LynqarConfig;
use lynqar_core::{Entry, EntryCollection, EntryId, LynqarError, NewEntry};
use secrecy::{ExposeSecret, SecretString};
use strum::Display;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::kdf::{self, MasterKey};
use crate::store::VaultStore;

/// Tunables for one session.
#[derive(Debug, Clone)]
pub struct SessionPolicy {
    pub kdf_iterations: u32,
    pub min_passphrase_length: usize,
    pub auto_lock: Duration,
    pub check_interval: Duration,
}

impl SessionPolicy {
    pub fn from_config(config: &LynqarConfig) -> Self {
        Self {
            kdf_iterations: config.vault.kdf_iterations,
            min_passphrase_length: config.vault.min_passphrase_length,
            auto_lock: config.session.auto_lock(),
            check_interval: config.session.check_interval(),
        }
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::from_config(&LynqarConfig::default())
    }
}

/// Externally visible session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    /// No vault exists yet.
    Setup,
    Locked,
    Unlocked,
}

enum SessionState {
    Setup,
    Locked,
    Unlocked {
        key: MasterKey,
        entries: EntryCollection,
    },
}

impl SessionState {
    fn status(&self) -> SessionStatus {
        match self {
            Self::Setup => SessionStatus::Setup,
            Self::Locked => SessionStatus::Locked,
            Self::Unlocked { .. } => SessionStatus::Unlocked,
        }
    }
}

/// Owns the master key and gates every operation that needs it.
pub struct SessionGuard {
    store: VaultStore,
    policy: SessionPolicy,
    state: Mutex<SessionState>,
    epoch: Instant,
    last_activity_ms: AtomicU64,
    status_tx: watch::Sender<SessionStatus>,
}

impl SessionGuard {
    /// Start a session over `store`, in `Locked` if a vault exists and `Setup` otherwise.
    pub async fn open(store: VaultStore, policy: SessionPolicy) -> Result<Self, LynqarError> {
        let state = if store.is_initialized().await? {
            SessionState::Locked
        } else {
            SessionState::Setup
        };
        let (status_tx, _) = watch::channel(state.status());
        debug!(backend = store.backend(), status = %state.status(), "session opened");

        Ok(Self {
            store,
            policy,
            state: Mutex::new(state),
            epoch: Instant::now(),
            last_activity_ms: AtomicU64::new(0),
            status_tx,
        })
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub fn status(&self) -> SessionStatus {
        *self.status_tx.borrow()
    }

    /// Name of the substrate behind the vault.
    pub fn backend(&self) -> &str {
        self.store.backend()
    }

    pub fn is_initialized(&self) -> bool {
        self.status() != SessionStatus::Setup
    }

    /// Receive every status change, including automatic locks.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    fn transition(&self, state: &mut SessionState, next: SessionState) {
        *state = next;
        self.status_tx.send_replace(state.status());
    }

    /// Record activity now.
    pub fn touch(&self) {
        let now = self.epoch.elapsed().as_millis() as u64;
        self.last_activity_ms.store(now, Ordering::Release);
    }

    /// Time since the last recorded activity.
    pub fn idle_for(&self) -> Duration {
        let now = self.epoch.elapsed().as_millis() as u64;
        let last = self.last_activity_ms.load(Ordering::Acquire);
        Duration::from_millis(now.saturating_sub(last))
    }

    /// Create the vault and leave the session unlocked.
    pub async fn setup(
        &self,
        passphrase: SecretString,
        confirmation: SecretString,
    ) -> Result<(), LynqarError> {
        if !matches!(*self.state.lock().await, SessionState::Setup) {
            return Err(LynqarError::AlreadyInitialized);
        }
        if passphrase.expose_secret() != confirmation.expose_secret() {
            return Err(LynqarError::PassphraseMismatch);
        }
        let min = self.policy.min_passphrase_length;
        if passphrase.expose_secret().chars().count() < min {
            return Err(LynqarError::PassphraseTooShort { min });
        }
        drop(confirmation);

        let key = kdf::derive_key_blocking(passphrase, self.policy.kdf_iterations).await?;

        let mut state = self.state.lock().await;
        if !matches!(*state, SessionState::Setup) || self.store.is_initialized().await? {
            return Err(LynqarError::AlreadyInitialized);
        }

        // Blob before marker: a crash in between leaves a vault that is still "not set up".
        let entries = EntryCollection::new();
        self.store.commit(&key, &entries).await?;
        self.store.initialize().await?;

        self.touch();
        self.transition(&mut state, SessionState::Unlocked { key, entries });
        info!("vault created and unlocked");
        Ok(())
    }

    /// Derive a key from `passphrase`, verify it and load the collection.
    ///
    /// A wrong passphrase and a corrupt store both fail with
    /// [`LynqarError::Authentication`]; the session stays locked.
    pub async fn unlock(&self, passphrase: SecretString) -> Result<(), LynqarError> {
        Self::check_unlockable(&*self.state.lock().await)?;

        let key = kdf::derive_key_blocking(passphrase, self.policy.kdf_iterations).await?;

        let mut state = self.state.lock().await;
        Self::check_unlockable(&state)?;

        if !self.store.verify_passphrase(&key).await? {
            warn!("unlock rejected");
            return Err(LynqarError::Authentication);
        }
        let entries = match self.store.load(&key).await {
            Ok(entries) => entries,
            Err(LynqarError::Authentication | LynqarError::CorruptStore(_)) => {
                warn!("unlock rejected: stored collection unreadable");
                return Err(LynqarError::Authentication);
            }
            Err(e) => return Err(e),
        };

        let count = entries.len();
        self.touch();
        self.transition(&mut state, SessionState::Unlocked { key, entries });
        info!(entries = count, "vault unlocked");
        Ok(())
    }

    fn check_unlockable(state: &SessionState) -> Result<(), LynqarError> {
        match state {
            SessionState::Setup => Err(LynqarError::NotInitialized),
            SessionState::Unlocked { .. } => Err(LynqarError::AlreadyUnlocked),
            SessionState::Locked => Ok(()),
        }
    }

    /// Drop the key and collection. Returns whether the session was unlocked.
    ///
    /// Waits for any in-flight commit to finish first.
    pub async fn lock(&self) -> bool {
        let mut state = self.state.lock().await;
        let was_unlocked = self.lock_state(&mut state);
        if was_unlocked {
            info!("vault locked");
        }
        was_unlocked
    }

    /// Lock and flush the substrate. Used on process exit.
    ///
    /// A flush failure is logged; every commit was already durable.
    pub async fn close(&self) {
        self.lock().await;
        if let Err(e) = self.store.flush().await {
            warn!(error = %e, backend = self.store.backend(), "flush on close failed");
        }
    }

    fn lock_state(&self, state: &mut SessionState) -> bool {
        if matches!(*state, SessionState::Unlocked { .. }) {
            self.transition(state, SessionState::Locked);
            true
        } else {
            false
        }
    }

    /// Lock if the session has been idle longer than the auto-lock timeout.
    ///
    /// Returns whether this call locked the session.
    pub async fn check_idle(&self) -> bool {
        if self.status() != SessionStatus::Unlocked || self.idle_for() <= self.policy.auto_lock {
            return false;
        }
        let mut state = self.state.lock().await;
        // Activity may have been recorded while waiting for the mutex.
        if self.idle_for() <= self.policy.auto_lock {
            return false;
        }
        let locked = self.lock_state(&mut state);
        if locked {
            warn!(
                idle_secs = self.idle_for().as_secs(),
                "vault auto-locked after inactivity"
            );
        }
        locked
    }

    /// Snapshot of every entry.
    pub async fn entries(&self) -> Result<EntryCollection, LynqarError> {
        let state = self.state.lock().await;
        let SessionState::Unlocked { entries, .. } = &*state else {
            return Err(LynqarError::NotUnlocked);
        };
        self.touch();
        Ok(entries.clone())
    }

    /// Entries whose title or username contains `query`, case-insensitively.
    pub async fn search(&self, query: &str) -> Result<Vec<Entry>, LynqarError> {
        let state = self.state.lock().await;
        let SessionState::Unlocked { entries, .. } = &*state else {
            return Err(LynqarError::NotUnlocked);
        };
        self.touch();
        Ok(entries.search(query).into_iter().cloned().collect())
    }

    /// Add an entry and commit. Returns the stored entry.
    pub async fn add_entry(&self, draft: NewEntry) -> Result<Entry, LynqarError> {
        let mut state = self.state.lock().await;
        let SessionState::Unlocked { key, entries } = &mut *state else {
            return Err(LynqarError::NotUnlocked);
        };
        self.touch();

        let updated = self.store.add_entry(key, entries, draft).await?;
        let added = updated
            .last()
            .cloned()
            .ok_or_else(|| LynqarError::Internal("added entry missing from collection".into()))?;
        *entries = updated;
        debug!(id = %added.id, "entry added");
        Ok(added)
    }

    /// Remove the entry with `id`. Returns whether it existed.
    pub async fn remove_entry(&self, id: &EntryId) -> Result<bool, LynqarError> {
        let mut state = self.state.lock().await;
        let SessionState::Unlocked { key, entries } = &mut *state else {
            return Err(LynqarError::NotUnlocked);
        };
        self.touch();

        let removal = self.store.remove_entry(key, entries, id).await?;
        if removal.removed {
            *entries = removal.collection;
            debug!(%id, "entry removed");
        }
        Ok(removal.removed)
    }

    /// Re-read the stored collection with the held key.
    ///
    /// Returns the number of entries loaded.
    pub async fn reload(&self) -> Result<usize, LynqarError> {
        let mut state = self.state.lock().await;
        let SessionState::Unlocked { key, entries } = &mut *state else {
            return Err(LynqarError::NotUnlocked);
        };

        let fresh = self.store.load(key).await.map_err(|e| match e {
            LynqarError::Authentication => LynqarError::CorruptStore(
                "stored collection no longer authenticates under the session key".to_string(),
            ),
            other => other,
        })?;
        *entries = fresh;
        self.touch();
        Ok(entries.len())
    }
}

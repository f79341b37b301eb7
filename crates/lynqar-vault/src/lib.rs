// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Lynqar cryptographic storage engine.
//!
//! A passphrase is stretched with PBKDF2-HMAC-SHA256 into a [`MasterKey`],
//! which seals the whole entry collection as one AES-256-GCM blob. The
//! [`SessionGuard`] owns that key while unlocked and drops it on lock or
//! after inactivity.
//!
//! # Security model
//!
//! - The passphrase itself is never stored; verification is an authenticated
//!   decryption under the candidate key.
//! - Key material and decrypted passwords are zeroed on drop.
//! - The salt is fixed and shared, so the iteration count is the only brake on
//!   offline guessing against a copied database.

pub mod autolock;
pub mod classifier;
pub mod crypto;
pub mod kdf;
pub mod password;
pub mod prompt;
pub mod session;
pub mod store;

pub use autolock::spawn_auto_lock;
pub use classifier::classify;
pub use crypto::EncryptedBlob;
pub use kdf::MasterKey;
pub use password::{generate_password, strength, Strength, StrengthLabel};
pub use prompt::{read_new_passphrase, read_passphrase, PASSPHRASE_ENV_VAR};
pub use session::{SessionGuard, SessionPolicy, SessionStatus};
pub use store::{Removal, VaultStore};

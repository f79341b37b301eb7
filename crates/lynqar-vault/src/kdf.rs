// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation from the master passphrase.
//!
//! Every installation uses the same fixed salt, so the same passphrase and
//! iteration count always yield the same key.

use std::fmt;
use std::num::NonZeroU32;

use lynqar_core::LynqarError;
use ring::pbkdf2;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

/// Salt shared by all vaults.
pub const FIXED_SALT: &[u8] = b"lynqar-fixed-salt-2025";

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// The 256-bit vault key.
///
/// Not `Clone`. Bytes are zeroed on drop and never printed.
pub struct MasterKey(Zeroizing<[u8; KEY_LEN]>);

impl MasterKey {
    pub(crate) fn expose(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// Derive the vault key from `passphrase`.
///
/// The only failure is a zero iteration count.
pub fn derive_key(passphrase: &[u8], iterations: u32) -> Result<MasterKey, LynqarError> {
    let iterations = NonZeroU32::new(iterations)
        .ok_or_else(|| LynqarError::Derivation("iteration count must be non-zero".to_string()))?;

    let mut out = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        FIXED_SALT,
        passphrase,
        &mut out[..],
    );
    Ok(MasterKey(out))
}

/// [`derive_key`] on the blocking pool, so timers and other tasks keep running.
pub async fn derive_key_blocking(
    passphrase: SecretString,
    iterations: u32,
) -> Result<MasterKey, LynqarError> {
    tokio::task::spawn_blocking(move || {
        derive_key(passphrase.expose_secret().as_bytes(), iterations)
    })
    .await
    .map_err(|e| LynqarError::Derivation(format!("derivation worker failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: u32 = 1_000;

    #[test]
    fn same_input_same_key() {
        let a = derive_key(b"correcthorse1", FAST).unwrap();
        let b = derive_key(b"correcthorse1", FAST).unwrap();
        assert_eq!(a.expose(), b.expose());
    }

    #[test]
    fn different_passphrase_different_key() {
        let a = derive_key(b"correcthorse1", FAST).unwrap();
        let b = derive_key(b"wrongpass", FAST).unwrap();
        assert_ne!(a.expose(), b.expose());
    }

    #[test]
    fn iteration_count_changes_key() {
        let a = derive_key(b"correcthorse1", FAST).unwrap();
        let b = derive_key(b"correcthorse1", FAST + 1).unwrap();
        assert_ne!(a.expose(), b.expose());
    }

    #[test]
    fn matches_ring_verify() {
        let key = derive_key(b"correcthorse1", FAST).unwrap();
        let iterations = NonZeroU32::new(FAST).unwrap();
        assert!(pbkdf2::verify(
            pbkdf2::PBKDF2_HMAC_SHA256,
            iterations,
            FIXED_SALT,
            b"correcthorse1",
            key.expose(),
        )
        .is_ok());
    }

    #[test]
    fn zero_iterations_is_a_derivation_error() {
        let err = derive_key(b"correcthorse1", 0).unwrap_err();
        assert!(matches!(err, LynqarError::Derivation(_)));
    }

    #[test]
    fn empty_and_long_passphrases_are_accepted() {
        assert!(derive_key(b"", FAST).is_ok());
        assert!(derive_key(&[b'x'; 4096], FAST).is_ok());
    }

    #[test]
    fn debug_does_not_leak_bytes() {
        let key = MasterKey::from_bytes([0xAB; KEY_LEN]);
        let debug = format!("{key:?}");
        assert_eq!(debug, "MasterKey([REDACTED])");
        assert!(!debug.contains("171"));
    }

    #[tokio::test]
    async fn blocking_derivation_matches_inline() {
        let inline = derive_key(b"correcthorse1", FAST).unwrap();
        let pooled = derive_key_blocking(SecretString::from("correcthorse1".to_string()), FAST)
            .await
            .unwrap();
        assert_eq!(inline.expose(), pooled.expose());
    }
}

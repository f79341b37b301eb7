// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM envelope around the persisted entry collection.
//!
//! Every [`seal`] draws a fresh random 96-bit nonce from the system CSPRNG.
//! The stored form is base64 of `nonce || ciphertext || tag`.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lynqar_core::LynqarError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::kdf::MasterKey;

/// GCM authentication tag length.
pub const TAG_LEN: usize = 16;

/// Base64 text of `nonce (12) || ciphertext || tag (16)`.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedBlob(String);

impl EncryptedBlob {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0.into_bytes()
    }

    /// Interpret stored bytes as a blob. Non-UTF-8 input cannot be a blob.
    pub fn from_stored(bytes: Vec<u8>) -> Result<Self, LynqarError> {
        String::from_utf8(bytes)
            .map(Self)
            .map_err(|_| LynqarError::Authentication)
    }
}

impl From<String> for EncryptedBlob {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for EncryptedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptedBlob({} chars)", self.0.len())
    }
}

fn aead_key(key: &MasterKey) -> Result<LessSafeKey, LynqarError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key.expose())
        .map_err(|_| LynqarError::Internal("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under `key` with a fresh random nonce.
pub fn seal(key: &MasterKey, plaintext: &[u8]) -> Result<EncryptedBlob, LynqarError> {
    let aead = aead_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| LynqarError::Internal("failed to generate random nonce".to_string()))?;

    let mut in_out = Zeroizing::new(plaintext.to_vec());
    aead.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::empty(),
        &mut *in_out,
    )
    .map_err(|_| LynqarError::Internal("AES-256-GCM encryption failed".to_string()))?;

    let mut framed = Vec::with_capacity(NONCE_LEN + in_out.len());
    framed.extend_from_slice(&nonce_bytes);
    framed.extend_from_slice(&in_out);
    Ok(EncryptedBlob(STANDARD.encode(framed)))
}

/// Decrypt a blob produced by [`seal`].
///
/// Wrong key, tampering, truncation and undecodable text all fail with
/// [`LynqarError::Authentication`].
pub fn open(key: &MasterKey, blob: &EncryptedBlob) -> Result<Zeroizing<Vec<u8>>, LynqarError> {
    let framed = STANDARD
        .decode(blob.as_str())
        .map_err(|_| LynqarError::Authentication)?;
    if framed.len() < NONCE_LEN + TAG_LEN {
        return Err(LynqarError::Authentication);
    }

    let (nonce_part, sealed) = framed.split_at(NONCE_LEN);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(nonce_part);

    let aead = aead_key(key)?;
    let mut in_out = Zeroizing::new(sealed.to_vec());
    let len = aead
        .open_in_place(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|_| LynqarError::Authentication)?
        .len();
    in_out.truncate(len);
    Ok(in_out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::{derive_key, KEY_LEN};
    use proptest::prelude::*;

    fn key(byte: u8) -> MasterKey {
        MasterKey::from_bytes([byte; KEY_LEN])
    }

    fn decoded_len(blob: &EncryptedBlob) -> usize {
        STANDARD.decode(blob.as_str()).unwrap().len()
    }

    #[test]
    fn derived_key_round_trip() {
        let k = derive_key(b"correcthorse1", 1_000).unwrap();
        let blob = seal(&k, b"[]").unwrap();
        let again = derive_key(b"correcthorse1", 1_000).unwrap();
        assert_eq!(&*open(&again, &blob).unwrap(), b"[]");
    }

    #[test]
    fn layout_is_nonce_ciphertext_tag() {
        let blob = seal(&key(1), b"hello").unwrap();
        assert_eq!(decoded_len(&blob), NONCE_LEN + 5 + TAG_LEN);
    }

    #[test]
    fn same_plaintext_seals_differently() {
        let k = key(2);
        let a = seal(&k, b"same input twice").unwrap();
        let b = seal(&k, b"same input twice").unwrap();
        assert_ne!(a, b);

        let a = STANDARD.decode(a.as_str()).unwrap();
        let b = STANDARD.decode(b.as_str()).unwrap();
        assert_ne!(&a[..NONCE_LEN], &b[..NONCE_LEN]);
    }

    #[test]
    fn wrong_key_is_authentication_error() {
        let blob = seal(&key(3), b"secret").unwrap();
        let err = open(&key(4), &blob).unwrap_err();
        assert!(matches!(err, LynqarError::Authentication));
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let k = key(5);
        let blob = seal(&k, b"do not tamper").unwrap();
        let mut raw = STANDARD.decode(blob.as_str()).unwrap();
        raw[NONCE_LEN] ^= 0x01;
        let tampered = EncryptedBlob::from(STANDARD.encode(raw));
        assert!(matches!(
            open(&k, &tampered),
            Err(LynqarError::Authentication)
        ));
    }

    #[test]
    fn truncated_and_garbage_blobs_are_rejected() {
        let k = key(6);
        let blob = seal(&k, b"payload").unwrap();
        let raw = STANDARD.decode(blob.as_str()).unwrap();

        let short = EncryptedBlob::from(STANDARD.encode(&raw[..NONCE_LEN + TAG_LEN - 1]));
        assert!(matches!(open(&k, &short), Err(LynqarError::Authentication)));

        let garbage = EncryptedBlob::from("not base64 at all!".to_string());
        assert!(matches!(open(&k, &garbage), Err(LynqarError::Authentication)));

        assert!(matches!(
            EncryptedBlob::from_stored(vec![0xff, 0xfe]),
            Err(LynqarError::Authentication)
        ));
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let k = key(7);
        let blob = seal(&k, b"").unwrap();
        assert!(open(&k, &blob).unwrap().is_empty());
    }

    #[test]
    fn debug_hides_content() {
        let blob = seal(&key(8), b"x").unwrap();
        assert!(format!("{blob:?}").starts_with("EncryptedBlob("));
        assert!(!format!("{blob:?}").contains(blob.as_str()));
    }

    proptest! {
        #[test]
        fn open_inverts_seal(data in proptest::collection::vec(any::<u8>(), 0..512), byte in any::<u8>()) {
            let k = key(byte);
            let blob = seal(&k, &data).unwrap();
            prop_assert_eq!(&*open(&k, &blob).unwrap(), &data[..]);
        }
    }
}

// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Password-based authenticated encryption of the envelope body.
//!
//! Key derivation uses Argon2id with a fresh random 16-byte salt per
//! operation; the default Argon2 parameters (19 MiB, 2 passes) cost tens of
//! milliseconds. The derived 32-byte key drives AES-256-GCM-SIV with a fresh
//! random 12-byte nonce and no associated data. The 16-byte tag is appended
//! to the ciphertext.
//!
//! Salt and nonce travel in the envelope header. Without a password the body
//! passes through untouched and both are empty.

use aes_gcm_siv::aead::Aead;
use aes_gcm_siv::{Aes256GcmSiv, KeyInit, Nonce};
use argon2::Argon2;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::stego::error::StegoError;

/// AES-GCM-SIV nonce length in bytes.
pub const NONCE_LEN: usize = 12;
/// Argon2 salt length in bytes.
pub const SALT_LEN: usize = 16;
/// AES-GCM-SIV authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Name of the cipher, as reported to callers.
pub const CIPHER_NAME: &str = "AES-256-GCM-SIV";
/// Name of the key derivation function, as reported to callers.
pub const KDF_NAME: &str = "Argon2id";

/// Derive the AES-256 key from passphrase + salt.
///
/// Fails with [`StegoError::Authentication`] if Argon2 rejects the salt
/// (e.g. a truncated salt read back from a damaged envelope).
pub fn derive_key(passphrase: &str, salt: &[u8]) -> Result<Zeroizing<[u8; 32]>, StegoError> {
    let mut key = Zeroizing::new([0u8; 32]);
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), salt, &mut *key)
        .map_err(|_| StegoError::Authentication)?;
    Ok(key)
}

/// Encrypt plaintext with AES-256-GCM-SIV under a freshly salted key.
///
/// Returns (ciphertext_with_tag, salt, nonce).
pub fn encrypt(
    plaintext: &[u8],
    passphrase: &str,
) -> Result<(Vec<u8>, [u8; SALT_LEN], [u8; NONCE_LEN]), StegoError> {
    let mut rng = rand::thread_rng();

    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(passphrase, &salt)?;
    let cipher = Aes256GcmSiv::new_from_slice(&*key).expect("32-byte key is valid for AES-256");
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| StegoError::InvalidParameter("plaintext too large for AES-GCM-SIV"))?;

    Ok((ciphertext, salt, nonce_bytes))
}

/// Decrypt and verify AES-256-GCM-SIV ciphertext.
///
/// A wrong password and a corrupted ciphertext both fail the tag check and
/// are reported identically as [`StegoError::Authentication`].
pub fn decrypt(
    ciphertext: &[u8],
    passphrase: &str,
    salt: &[u8],
    nonce_bytes: &[u8; NONCE_LEN],
) -> Result<Vec<u8>, StegoError> {
    let key = derive_key(passphrase, salt)?;
    let cipher = Aes256GcmSiv::new_from_slice(&*key).expect("32-byte key is valid for AES-256");
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| StegoError::Authentication)
}

/// Envelope body after the optional encryption stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub body: Vec<u8>,
    /// Empty when no password was used.
    pub salt: Vec<u8>,
    /// Empty when no password was used.
    pub nonce: Vec<u8>,
}

impl Sealed {
    pub fn is_encrypted(&self) -> bool {
        !self.salt.is_empty() || !self.nonce.is_empty()
    }
}

/// Encrypt if a non-empty password is given, otherwise pass through.
pub fn seal(data: Vec<u8>, password: Option<&str>) -> Result<Sealed, StegoError> {
    match password.filter(|p| !p.is_empty()) {
        Some(pw) => {
            let (body, salt, nonce) = encrypt(&data, pw)?;
            Ok(Sealed { body, salt: salt.to_vec(), nonce: nonce.to_vec() })
        }
        None => Ok(Sealed { body: data, salt: Vec::new(), nonce: Vec::new() }),
    }
}

/// Inverse of [`seal`].
///
/// An envelope without salt and nonce was never encrypted and opens without
/// a password (any password given is ignored). An encrypted envelope without
/// a password fails authentication.
pub fn open(
    body: &[u8],
    password: Option<&str>,
    salt: &[u8],
    nonce: &[u8],
) -> Result<Vec<u8>, StegoError> {
    if salt.is_empty() && nonce.is_empty() {
        if password.is_some_and(|p| !p.is_empty()) {
            log::debug!("envelope is not encrypted; ignoring supplied password");
        }
        return Ok(body.to_vec());
    }
    let nonce: &[u8; NONCE_LEN] = nonce
        .try_into()
        .map_err(|_| StegoError::Format("nonce has wrong length"))?;
    match password.filter(|p| !p.is_empty()) {
        Some(pw) => decrypt(body, pw, salt, nonce),
        None => Err(StegoError::Authentication),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let msg = b"Hello, steganography!";
        let (ct, salt, nonce) = encrypt(msg, "secret123").unwrap();
        assert_eq!(ct.len(), msg.len() + TAG_LEN);
        let pt = decrypt(&ct, "secret123", &salt, &nonce).unwrap();
        assert_eq!(pt, msg);
    }

    #[test]
    fn wrong_password_fails() {
        let (ct, salt, nonce) = encrypt(b"secret message", "A").unwrap();
        let result = decrypt(&ct, "B", &salt, &nonce);
        assert!(matches!(result, Err(StegoError::Authentication)));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let (mut ct, salt, nonce) = encrypt(b"secret message", "pw").unwrap();
        ct[0] ^= 0x01;
        assert!(matches!(decrypt(&ct, "pw", &salt, &nonce), Err(StegoError::Authentication)));
    }

    #[test]
    fn empty_message_works() {
        let (ct, salt, nonce) = encrypt(b"", "pass").unwrap();
        assert_eq!(ct.len(), TAG_LEN);
        assert_eq!(decrypt(&ct, "pass", &salt, &nonce).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn salt_and_nonce_fresh_per_call() {
        let (ct1, salt1, nonce1) = encrypt(b"same message", "pass").unwrap();
        let (ct2, salt2, nonce2) = encrypt(b"same message", "pass").unwrap();
        assert_ne!(salt1, salt2);
        assert_ne!(nonce1, nonce2);
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn key_differs_by_salt() {
        let a = derive_key("pass", &[0u8; SALT_LEN]).unwrap();
        let b = derive_key("pass", &[1u8; SALT_LEN]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn short_salt_is_authentication_failure() {
        assert!(matches!(derive_key("pass", &[0u8; 3]), Err(StegoError::Authentication)));
    }

    #[test]
    fn seal_without_password_passes_through() {
        let sealed = seal(b"plain".to_vec(), None).unwrap();
        assert!(!sealed.is_encrypted());
        assert_eq!(sealed.body, b"plain");

        let sealed = seal(b"plain".to_vec(), Some("")).unwrap();
        assert!(!sealed.is_encrypted());
    }

    #[test]
    fn seal_open_roundtrip() {
        let sealed = seal(b"payload".to_vec(), Some("pw")).unwrap();
        assert!(sealed.is_encrypted());
        assert_eq!(sealed.salt.len(), SALT_LEN);
        assert_eq!(sealed.nonce.len(), NONCE_LEN);
        let opened = open(&sealed.body, Some("pw"), &sealed.salt, &sealed.nonce).unwrap();
        assert_eq!(opened, b"payload");
    }

    #[test]
    fn open_encrypted_without_password_fails() {
        let sealed = seal(b"payload".to_vec(), Some("pw")).unwrap();
        assert!(matches!(
            open(&sealed.body, None, &sealed.salt, &sealed.nonce),
            Err(StegoError::Authentication)
        ));
    }

    #[test]
    fn open_plaintext_ignores_password() {
        assert_eq!(open(b"abc", Some("whatever"), &[], &[]).unwrap(), b"abc");
    }

    #[test]
    fn open_rejects_bad_nonce_length() {
        assert!(matches!(
            open(b"abc", Some("pw"), &[0u8; SALT_LEN], &[0u8; 5]),
            Err(StegoError::Format(_))
        ));
    }
}

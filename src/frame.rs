//! Password-wrapped frame layouts: salt-prefixed CTR and AEAD, the
//! user-facing formats password callers actually exchange (spec §3/§6).

use crate::aead;
use crate::constants::SALT_SIZE;
use crate::error::{Error, Result};
use crate::kdf::{self, KdfProfile};
use crate::modes::ctr;

/// `salt(16) ‖ nonce(16) ‖ ciphertext ‖ tag(32)`. The recommended
/// password-based format: AEAD, so a wrong password (and therefore a wrong
/// derived key) fails authentication instead of silently producing garbage
/// plaintext.
pub fn encrypt_with_password(plaintext: &[u8], password: &[u8], profile: KdfProfile) -> Result<Vec<u8>> {
    let (key, salt) = kdf::derive_key(password, None, profile)?;
    let aead_frame = aead::aead_encrypt(plaintext, &key, None, None)?;
    let mut out = Vec::with_capacity(SALT_SIZE + aead_frame.len());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&aead_frame);
    Ok(out)
}

/// Inverse of [`encrypt_with_password`]. `profile` must match the profile
/// used to encrypt — the frame carries the salt but not the profile, by
/// design (spec §4.9: the profile is a caller contract, not wire data).
pub fn decrypt_with_password(frame: &[u8], password: &[u8], profile: KdfProfile) -> Result<Vec<u8>> {
    if frame.len() < SALT_SIZE {
        return Err(Error::MalformedFrame("frame shorter than a salt".into()));
    }
    let (salt_bytes, rest) = frame.split_at(SALT_SIZE);
    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(salt_bytes);
    let (key, _) = kdf::derive_key(password, Some(salt), profile)?;
    aead::aead_decrypt(rest, &key, None)
}

/// `salt(16) ‖ nonce(16) ‖ ciphertext`. The CTR variant: smaller, but
/// unauthenticated — a wrong password decrypts to garbage instead of
/// failing.
pub fn encrypt_with_password_ctr(plaintext: &[u8], password: &[u8], profile: KdfProfile) -> Result<Vec<u8>> {
    let (key, salt) = kdf::derive_key(password, None, profile)?;
    let ctr_frame = ctr::encrypt_ctr(plaintext, &key, None)?;
    let mut out = Vec::with_capacity(SALT_SIZE + ctr_frame.len());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&ctr_frame);
    Ok(out)
}

/// Inverse of [`encrypt_with_password_ctr`].
pub fn decrypt_with_password_ctr(frame: &[u8], password: &[u8], profile: KdfProfile) -> Result<Vec<u8>> {
    if frame.len() < SALT_SIZE {
        return Err(Error::MalformedFrame("frame shorter than a salt".into()));
    }
    let (salt_bytes, rest) = frame.split_at(SALT_SIZE);
    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(salt_bytes);
    let (key, _) = kdf::derive_key(password, Some(salt), profile)?;
    ctr::decrypt_ctr(rest, &key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aead_roundtrip() {
        let frame = encrypt_with_password(b"attack at dawn", b"correct horse battery staple", KdfProfile::Interactive).unwrap();
        let plaintext = decrypt_with_password(&frame, b"correct horse battery staple", KdfProfile::Interactive).unwrap();
        assert_eq!(plaintext, b"attack at dawn");
    }

    #[test]
    fn ctr_roundtrip() {
        let frame = encrypt_with_password_ctr(b"payload", b"hunter2", KdfProfile::Moderate).unwrap();
        let plaintext = decrypt_with_password_ctr(&frame, b"hunter2", KdfProfile::Moderate).unwrap();
        assert_eq!(plaintext, b"payload");
    }

    #[test]
    fn wrong_password_fails_authentication() {
        let frame = encrypt_with_password(b"secret", b"right-password", KdfProfile::Interactive).unwrap();
        let result = decrypt_with_password(&frame, b"wrong-password", KdfProfile::Interactive);
        assert!(matches!(result, Err(Error::Authentication)));
    }

    #[test]
    fn tampered_tag_after_flip() {
        let mut frame = encrypt_with_password(b"attack at dawn", b"correct horse battery staple", KdfProfile::Interactive).unwrap();
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;
        let result = decrypt_with_password(&frame, b"correct horse battery staple", KdfProfile::Interactive);
        assert!(matches!(result, Err(Error::Authentication)));
    }
}

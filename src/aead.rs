//! Authenticated encryption: encrypt-then-MAC composition over CTR mode,
//! with sub-keys derived from the caller's master key so the CTR
//! encryption key and the HMAC key are never the same bytes.

use crate::constants::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use crate::error::{Error, Result};
use crate::modes::ctr;
use crate::observability::{self, Operation};
use crate::primitives::{constant_time_equal, hmac_sha256, shake::shake256_with_domain};
use zeroize::Zeroize;

const AEAD_ENC_KEY_LEN: usize = 64;
const AEAD_MAC_KEY_LEN: usize = 32;

/// The CTR-encryption key and HMAC key derived from a caller's master key.
/// Zeroized on drop — the spec requires derived sub-keys to be overwritten
/// before deallocation, the same as the master key itself.
struct SubKeys {
    enc_key: [u8; AEAD_ENC_KEY_LEN],
    mac_key: [u8; AEAD_MAC_KEY_LEN],
}

impl Drop for SubKeys {
    fn drop(&mut self) {
        self.enc_key.zeroize();
        self.mac_key.zeroize();
    }
}

fn derive_subkeys(key: &[u8]) -> SubKeys {
    let enc = shake256_with_domain(key, crate::constants::domain::AEAD_ENC, &[], &[], AEAD_ENC_KEY_LEN);
    let mac = shake256_with_domain(key, crate::constants::domain::AEAD_MAC, &[], &[], AEAD_MAC_KEY_LEN);
    let mut enc_key = [0u8; AEAD_ENC_KEY_LEN];
    let mut mac_key = [0u8; AEAD_MAC_KEY_LEN];
    enc_key.copy_from_slice(&enc);
    mac_key.copy_from_slice(&mac);
    SubKeys { enc_key, mac_key }
}

fn mac_input(associated_data: &[u8], ct: &[u8]) -> Vec<u8> {
    let mut input = Vec::with_capacity(8 + associated_data.len() + ct.len());
    input.extend_from_slice(&(associated_data.len() as u64).to_be_bytes());
    input.extend_from_slice(associated_data);
    input.extend_from_slice(ct);
    input
}

/// `aead_encrypt(plaintext, key, ad?, nonce?) → nonce ‖ ct ‖ tag`.
#[tracing::instrument(skip(plaintext, key, associated_data, nonce))]
pub fn aead_encrypt(
    plaintext: &[u8],
    key: &[u8],
    associated_data: Option<&[u8]>,
    nonce: Option<[u8; NONCE_SIZE]>,
) -> Result<Vec<u8>> {
    let timer = observability::global().start(Operation::AeadEncrypt);
    if key.len() != KEY_SIZE {
        let err = Error::InvalidLength {
            what: "key",
            expected: KEY_SIZE,
            actual: key.len(),
        };
        timer.fail("invalid key length");
        return Err(err);
    }
    let sub_keys = derive_subkeys(key);
    let ct = match ctr::encrypt_ctr(plaintext, &sub_keys.enc_key, nonce) {
        Ok(ct) => ct,
        Err(e) => {
            timer.fail("ctr encryption failed");
            return Err(e);
        }
    };
    let ad = associated_data.unwrap_or(&[]);
    let tag = hmac_sha256(&sub_keys.mac_key, &mac_input(ad, &ct));

    let mut out = Vec::with_capacity(ct.len() + TAG_SIZE);
    out.extend_from_slice(&ct);
    out.extend_from_slice(&tag);
    timer.finish(out.len());
    Ok(out)
}

/// `aead_decrypt(nonce ‖ ct ‖ tag, key, ad?) → plaintext`. Verifies the tag
/// before CTR-decrypting anything, so no plaintext is ever derived from a
/// frame that fails authentication.
#[tracing::instrument(skip(frame, key, associated_data))]
pub fn aead_decrypt(frame: &[u8], key: &[u8], associated_data: Option<&[u8]>) -> Result<Vec<u8>> {
    let timer = observability::global().start(Operation::AeadDecrypt);
    if key.len() != KEY_SIZE {
        timer.fail("invalid key length");
        return Err(Error::InvalidLength {
            what: "key",
            expected: KEY_SIZE,
            actual: key.len(),
        });
    }
    if frame.len() < TAG_SIZE {
        timer.fail("frame shorter than a tag");
        return Err(Error::MalformedFrame("frame shorter than a tag".into()));
    }
    let (ct, tag) = frame.split_at(frame.len() - TAG_SIZE);

    // nonce (16) + at least one block (32) = 48 bytes minimum.
    if ct.len() < NONCE_SIZE + 32 {
        timer.fail("ciphertext shorter than nonce plus one block");
        return Err(Error::MalformedFrame(
            "ciphertext shorter than nonce plus one block".into(),
        ));
    }

    let sub_keys = derive_subkeys(key);
    let ad = associated_data.unwrap_or(&[]);
    let expected_tag = hmac_sha256(&sub_keys.mac_key, &mac_input(ad, ct));

    if !constant_time_equal(tag, &expected_tag) {
        timer.fail("tag verification failed");
        return Err(Error::Authentication);
    }

    match ctr::decrypt_ctr(ct, &sub_keys.enc_key) {
        Ok(plaintext) => {
            timer.finish(plaintext.len());
            Ok(plaintext)
        }
        Err(e) => {
            timer.fail("ctr decryption failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; KEY_SIZE] {
        let mut key = [0u8; KEY_SIZE];
        for (i, b) in key.iter_mut().enumerate() {
            *b = i as u8;
        }
        key
    }

    #[test]
    fn roundtrip() {
        let key = test_key();
        let plaintext = b"attack at dawn";
        let frame = aead_encrypt(plaintext, &key, None, Some([1u8; NONCE_SIZE])).unwrap();
        let decrypted = aead_decrypt(&frame, &key, None).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn roundtrip_with_associated_data() {
        let key = test_key();
        let plaintext = b"payload";
        let ad = b"header-metadata";
        let frame = aead_encrypt(plaintext, &key, Some(ad), Some([2u8; NONCE_SIZE])).unwrap();
        assert_eq!(aead_decrypt(&frame, &key, Some(ad)).unwrap(), plaintext);
    }

    #[test]
    fn tampered_tag_is_rejected() {
        let key = test_key();
        let mut frame = aead_encrypt(b"attack at dawn", &key, None, Some([1u8; NONCE_SIZE])).unwrap();
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;
        assert!(matches!(aead_decrypt(&frame, &key, None), Err(Error::Authentication)));
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let key = test_key();
        let mut frame = aead_encrypt(b"attack at dawn", &key, None, Some([1u8; NONCE_SIZE])).unwrap();
        frame[NONCE_SIZE] ^= 0x01;
        assert!(matches!(aead_decrypt(&frame, &key, None), Err(Error::Authentication)));
    }

    #[test]
    fn mismatched_associated_data_is_rejected() {
        let key = test_key();
        let frame = aead_encrypt(b"payload", &key, Some(b"correct-ad"), Some([3u8; NONCE_SIZE])).unwrap();
        assert!(matches!(
            aead_decrypt(&frame, &key, Some(b"wrong-ad")),
            Err(Error::Authentication)
        ));
    }

    #[test]
    fn undersized_frame_is_malformed() {
        let key = test_key();
        assert!(matches!(
            aead_decrypt(&[0u8; 10], &key, None),
            Err(Error::MalformedFrame(_))
        ));
    }
}

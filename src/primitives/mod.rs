//! Cryptographic primitives the rest of the crate is built on.
//!
//! Every key-material derivation in [`crate::key_material`] and
//! [`crate::block_core`] goes through [`shake256`]; [`ChaCha20Prng`] drives
//! per-block selector ordering and key-expansion's selector permutation;
//! [`hmac_sha256`] authenticates AEAD frames.

pub mod chacha_prng;
pub mod ct;
pub mod shake;

pub use chacha_prng::ChaCha20Prng;
pub use ct::constant_time_equal;
pub use shake::{shake256, shake256_with_domain};

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Compute HMAC-SHA256 over `message` with `key`.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(key)
        .expect("HMAC-SHA256 accepts keys of any length");
    Mac::update(&mut mac, message);
    mac.finalize().into_bytes().into()
}

//! # RUC — Random Universe Cipher
//!
//! A symmetric, key-derived, round-based authenticated block cipher with a
//! password-based KDF front end.
//!
//! A 64-byte master key expands into a 7-register, 512-bit-wide state, a
//! key-derived set of "selectors", per-round S-boxes, and round keys
//! ([`key_material`]). Encryption runs that state through a 24-round
//! transform per 32-byte block ([`block_core`]) in CTR mode ([`modes::ctr`]),
//! optionally wrapped in encrypt-then-MAC authentication ([`aead`]), and
//! optionally fronted by a password instead of a raw key ([`kdf`],
//! [`frame`]). Large inputs are processed across a worker pool with
//! adaptive chunk sizing ([`pipeline`]), since every block in CTR mode is
//! independent of every other.
//!
//! ## Quick start
//!
//! ```
//! use ruc::{aead_encrypt, aead_decrypt};
//!
//! # fn main() -> ruc::Result<()> {
//! let key = [0x42u8; 64];
//! let frame = aead_encrypt(b"attack at dawn", &key, None, None)?;
//! let plaintext = aead_decrypt(&frame, &key, None)?;
//! assert_eq!(plaintext, b"attack at dawn");
//! # Ok(())
//! # }
//! ```
//!
//! Password-based callers skip key management entirely:
//!
//! ```
//! use ruc::{encrypt_with_password, decrypt_with_password, KdfProfile};
//!
//! # fn main() -> ruc::Result<()> {
//! let frame = encrypt_with_password(b"secret note", b"correct horse battery staple", KdfProfile::default())?;
//! let plaintext = decrypt_with_password(&frame, b"correct horse battery staple", KdfProfile::default())?;
//! assert_eq!(plaintext, b"secret note");
//! # Ok(())
//! # }
//! ```
//!
//! ## Module structure
//!
//! - [`error`]: the crate's error taxonomy
//! - [`constants`]: fixed sizes and domain-separation tags
//! - [`wide`]: big-endian fixed-width integer helpers for the register file
//! - [`primitives`]: SHAKE256, the ChaCha20-backed PRNG, HMAC-SHA256, constant-time comparison
//! - [`gf256`]: GF(2^8) arithmetic
//! - [`sbox`]: key-derived S-box generation and property verification
//! - [`key_material`]: key expansion and IV mixing
//! - [`block_core`]: the per-block round transform
//! - [`modes`]: PKCS#7 padding and CTR mode
//! - [`pipeline`]: the parallel block-processing pipeline
//! - [`aead`]: authenticated encryption
//! - [`kdf`]: password-based key derivation
//! - [`frame`]: password-wrapped frame layouts
//! - [`observability`]: structured logging and operation counters
//!
//! ## Security considerations
//!
//! 1. Keys and derived secrets are zeroized on drop ([`key_material::KeyMaterial`], [`block_core::CipherState`]).
//! 2. AEAD tag comparison is constant-time and happens before any ciphertext is decrypted.
//! 3. The CTR-only frame formats ([`modes::ctr`], [`frame::encrypt_with_password_ctr`]) are unauthenticated — prefer the AEAD formats unless the caller authenticates the frame some other way.
//! 4. This cipher has not undergone independent cryptanalysis. Treat it as an engineering exercise, not a vetted primitive.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unused_qualifications,
    missing_debug_implementations
)]

pub mod error;
pub mod constants;
pub mod wide;
pub mod primitives;
pub mod gf256;
pub mod sbox;
pub mod key_material;
pub mod block_core;
pub mod modes;
pub mod pipeline;
pub mod aead;
pub mod kdf;
pub mod frame;
pub mod observability;

pub use crate::error::{Error, Result};

pub use crate::aead::{aead_decrypt, aead_encrypt};
pub use crate::frame::{
    decrypt_with_password, decrypt_with_password_ctr, encrypt_with_password,
    encrypt_with_password_ctr,
};
pub use crate::kdf::{derive_key, KdfProfile};
pub use crate::modes::{decrypt_ctr, encrypt_ctr};

/// Common imports for using `ruc`.
pub mod prelude {
    //! Re-exports the functions and types most callers need.
    //!
    //! ```
    //! use ruc::prelude::*;
    //! ```
    pub use crate::{
        aead_decrypt, aead_encrypt, decrypt_ctr, decrypt_with_password,
        decrypt_with_password_ctr, derive_key, encrypt_ctr, encrypt_with_password,
        encrypt_with_password_ctr, Error, KdfProfile, Result,
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn library_compiles() {
        assert_eq!(2 + 2, 4);
    }
}

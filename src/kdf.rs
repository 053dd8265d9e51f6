//! Password-based key derivation. Argon2id is primary; an iterated-SHAKE256
//! construction is the fallback for environments where Argon2id cannot run
//! (spec §4.9) — weaker, but deterministic and always available.

use crate::constants::{KEY_SIZE, SALT_SIZE};
use crate::error::{Error, Result};
use crate::observability::{self, Operation};
use crate::primitives::shake::shake256;
use argon2::{Algorithm, Argon2, Params, Version};

/// Named Argon2id cost profiles. Parallelism is fixed at 1 across all three
/// so a derived key only depends on (password, salt, profile).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfProfile {
    /// iterations 2, memory 64 MiB — fast, for interactive unlocks.
    Interactive,
    /// iterations 3, memory 64 MiB — default for most stored secrets.
    Moderate,
    /// iterations 4, memory 128 MiB — for long-lived, high-value secrets.
    Sensitive,
}

impl KdfProfile {
    fn argon2_params(self) -> (u32, u32) {
        // (iterations, memory_kib)
        match self {
            KdfProfile::Interactive => (2, 64 * 1024),
            KdfProfile::Moderate => (3, 64 * 1024),
            KdfProfile::Sensitive => (4, 128 * 1024),
        }
    }

    fn iterations(self) -> u32 {
        self.argon2_params().0
    }
}

impl Default for KdfProfile {
    fn default() -> Self {
        KdfProfile::Moderate
    }
}

fn random_salt() -> Result<[u8; SALT_SIZE]> {
    let mut salt = [0u8; SALT_SIZE];
    getrandom::getrandom(&mut salt)
        .map_err(|e| Error::Kdf(format!("secure random source unavailable: {e}")))?;
    Ok(salt)
}

fn argon2id(password: &[u8], salt: &[u8; SALT_SIZE], profile: KdfProfile) -> Result<[u8; KEY_SIZE]> {
    let (iterations, memory_kib) = profile.argon2_params();
    let params = Params::new(memory_kib, iterations, 1, Some(KEY_SIZE))
        .map_err(|e| Error::Kdf(format!("invalid Argon2id parameters: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let mut out = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(password, salt, &mut out)
        .map_err(|e| Error::Kdf(format!("Argon2id derivation failed: {e}")))?;
    Ok(out)
}

/// Iterated-SHAKE256 fallback: `key = SHAKE256(password ‖ salt, 64)`, then
/// `iterations * 10_000` rounds of `key = SHAKE256(key ‖ salt ‖ password, 64)`.
pub fn fallback_derive(password: &[u8], salt: &[u8; SALT_SIZE], profile: KdfProfile) -> [u8; KEY_SIZE] {
    let mut input = Vec::with_capacity(password.len() + SALT_SIZE);
    input.extend_from_slice(password);
    input.extend_from_slice(salt);
    let mut key = shake256(&input, KEY_SIZE);

    let rounds = profile.iterations() as u64 * 10_000;
    for _ in 0..rounds {
        let mut round_input = Vec::with_capacity(key.len() + SALT_SIZE + password.len());
        round_input.extend_from_slice(&key);
        round_input.extend_from_slice(salt);
        round_input.extend_from_slice(password);
        key = shake256(&round_input, KEY_SIZE);
    }

    let mut out = [0u8; KEY_SIZE];
    out.copy_from_slice(&key);
    out
}

/// Derive a 64-byte master key from a password. Generates a random salt if
/// one isn't supplied. Tries Argon2id first, falling back to iterated
/// SHAKE256 only if Argon2id itself reports an error (misconfigured
/// parameters, not an expected runtime condition on any supported
/// platform, but the fallback exists for environments where Argon2id is
/// unavailable at all).
#[tracing::instrument(skip(password, salt))]
pub fn derive_key(
    password: &[u8],
    salt: Option<[u8; SALT_SIZE]>,
    profile: KdfProfile,
) -> Result<([u8; KEY_SIZE], [u8; SALT_SIZE])> {
    let timer = observability::global().start(Operation::KdfDerive);
    let salt = match salt {
        Some(s) => s,
        None => match random_salt() {
            Ok(s) => s,
            Err(e) => {
                timer.fail("random salt generation failed");
                return Err(e);
            }
        },
    };
    let key = match argon2id(password, &salt, profile) {
        Ok(key) => key,
        Err(_) => {
            tracing::warn!("argon2id derivation failed, falling back to iterated SHAKE256");
            fallback_derive(password, &salt, profile)
        }
    };
    timer.finish(KEY_SIZE);
    Ok((key, salt))
}

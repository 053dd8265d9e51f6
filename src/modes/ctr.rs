//! CTR mode: every block is encrypted independently from a fresh clone of
//! the key material's registers, mixed with the nonce-derived IV and a
//! per-block counter hash. That independence is what makes the mode
//! embarrassingly parallel (spec §4.6-§4.7).

use crate::block_core::{self, CipherState};
use crate::constants::{domain, BLOCK_SIZE, IV_SIZE, KEY_SIZE, NONCE_SIZE, REGISTER_SIZE};
use crate::error::{Error, Result};
use crate::key_material::{mix_iv, KeyMaterial};
use crate::observability::{self, Operation};
use crate::primitives::shake::{shake256, u64_be};
use crate::wide;

/// Derive the per-block IV from a nonce: `SHAKE256(nonce ‖ "RUC-CTR-IV", 32)`.
/// Not keyed on the master key; the IV's only job is to perturb the
/// register state per nonce, and the registers themselves already carry the
/// key.
pub fn derive_iv(nonce: &[u8; NONCE_SIZE]) -> [u8; IV_SIZE] {
    let mut input = Vec::with_capacity(NONCE_SIZE + domain::CTR_IV.len());
    input.extend_from_slice(nonce);
    input.extend_from_slice(domain::CTR_IV);
    let derived = shake256(&input, IV_SIZE);
    let mut iv = [0u8; IV_SIZE];
    iv.copy_from_slice(&derived);
    iv
}

/// Build the per-block state: clone key material's registers, mix in the
/// IV, then XOR in the counter hash `SHAKE256(u64_be(n) ‖ "CTR", 64)`.
pub fn init_block_state(key_material: &KeyMaterial, iv: &[u8; IV_SIZE], block_number: u64) -> CipherState {
    let mixed = mix_iv(&key_material.registers, iv);
    let mut state = CipherState::new(mixed);

    let mut counter_input = Vec::with_capacity(8 + domain::CTR.len());
    counter_input.extend_from_slice(&u64_be(block_number));
    counter_input.extend_from_slice(domain::CTR);
    let counter_hash = shake256(&counter_input, REGISTER_SIZE);
    wide::xor_assign(&mut state.registers[0], &counter_hash);

    state
}

fn xor_block(block: &[u8], keystream: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for i in 0..32 {
        out[i] = block[i] ^ keystream[i];
    }
    out
}

fn random_nonce() -> Result<[u8; NONCE_SIZE]> {
    let mut nonce = [0u8; NONCE_SIZE];
    getrandom::getrandom(&mut nonce).map_err(|e| Error::Kdf(format!("secure random source unavailable: {e}")))?;
    Ok(nonce)
}

/// Process `blocks` independently, one `CipherState` per block (no state
/// persists across blocks in CTR mode). `block_number` offsets are used as
/// the per-block counter so chunked/parallel callers can process a
/// contiguous range starting anywhere. `key_const` resolves each selector's
/// `RUC-CONST` byte; see [`crate::block_core::derive_keystream_with`].
pub fn process_blocks_with(
    key_material: &KeyMaterial,
    iv: &[u8; IV_SIZE],
    start_block_number: u64,
    blocks: &[u8],
    key_const: impl Fn(u16) -> u8 + Copy,
) -> Vec<u8> {
    debug_assert_eq!(blocks.len() % BLOCK_SIZE, 0);
    let num_blocks = blocks.len() / BLOCK_SIZE;
    let mut out = Vec::with_capacity(blocks.len());
    for n in 0..num_blocks {
        let block_number = start_block_number + n as u64;
        let block = &blocks[n * BLOCK_SIZE..(n + 1) * BLOCK_SIZE];
        let mut state = init_block_state(key_material, iv, block_number);
        let keystream = block_core::derive_keystream_with(key_material, iv, block_number, &mut state, key_const);
        let result = xor_block(block, &keystream);
        block_core::apply_ciphertext_feedback(&mut state, &result);
        out.extend_from_slice(&result);
    }
    out
}

/// [`process_blocks_with`] using [`KeyMaterial::key_const`] directly.
pub fn process_blocks(
    key_material: &KeyMaterial,
    iv: &[u8; IV_SIZE],
    start_block_number: u64,
    blocks: &[u8],
) -> Vec<u8> {
    process_blocks_with(key_material, iv, start_block_number, blocks, |sel| {
        key_material.key_const(sel)
    })
}

/// `encrypt_ctr(plaintext, key, nonce) → nonce ‖ ct`. Generates a random
/// nonce if `nonce` is `None`.
#[tracing::instrument(skip(plaintext, key, nonce))]
pub fn encrypt_ctr(plaintext: &[u8], key: &[u8], nonce: Option<[u8; NONCE_SIZE]>) -> Result<Vec<u8>> {
    let timer = observability::global().start(Operation::EncryptCtr);
    if key.len() != KEY_SIZE {
        timer.fail("invalid key length");
        return Err(Error::InvalidLength {
            what: "key",
            expected: KEY_SIZE,
            actual: key.len(),
        });
    }
    let nonce = match nonce {
        Some(n) => n,
        None => match random_nonce() {
            Ok(n) => n,
            Err(e) => {
                timer.fail("random nonce generation failed");
                return Err(e);
            }
        },
    };
    let key_material = match KeyMaterial::expand(key) {
        Ok(km) => km,
        Err(e) => {
            timer.fail("key expansion failed");
            return Err(e);
        }
    };
    let iv = derive_iv(&nonce);
    let padded = super::pkcs7::pad(plaintext);
    let ciphertext = process_blocks(&key_material, &iv, 0, &padded);

    let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    timer.finish(out.len());
    Ok(out)
}

/// `decrypt_ctr(nonce ‖ ct, key) → plaintext`.
#[tracing::instrument(skip(frame, key))]
pub fn decrypt_ctr(frame: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let timer = observability::global().start(Operation::DecryptCtr);
    if key.len() != KEY_SIZE {
        timer.fail("invalid key length");
        return Err(Error::InvalidLength {
            what: "key",
            expected: KEY_SIZE,
            actual: key.len(),
        });
    }
    if frame.len() < NONCE_SIZE {
        timer.fail("frame shorter than a nonce");
        return Err(Error::MalformedFrame("frame shorter than a nonce".into()));
    }
    let (nonce_bytes, ct) = frame.split_at(NONCE_SIZE);
    if ct.is_empty() || ct.len() % BLOCK_SIZE != 0 {
        timer.fail("ciphertext body length is not a block multiple");
        return Err(Error::MalformedFrame(
            "ciphertext body length is not a block multiple".into(),
        ));
    }
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(nonce_bytes);

    let key_material = match KeyMaterial::expand(key) {
        Ok(km) => km,
        Err(e) => {
            timer.fail("key expansion failed");
            return Err(e);
        }
    };
    let iv = derive_iv(&nonce);
    let padded_plaintext = process_blocks(&key_material, &iv, 0, ct);
    match super::pkcs7::unpad(&padded_plaintext) {
        Ok(plaintext) => {
            timer.finish(plaintext.len());
            Ok(plaintext)
        }
        Err(e) => {
            timer.fail("padding removal failed");
            Err(e)
        }
    }
}

//! The per-block transformation: selector ordering, the 24-round diffusion
//! over the 7-register state, keystream derivation, and ciphertext
//! feedback. Encryption and decryption call exactly the same functions
//! here; only the caller's XOR target (plaintext vs. ciphertext) differs.

use crate::constants::{domain, ACCUMULATOR_SIZE, REGISTER_COUNT, REGISTER_SIZE, ROUNDS};
use crate::gf256;
use crate::key_material::KeyMaterial;
use crate::primitives::chacha_prng::ChaCha20Prng;
use crate::primitives::shake::{shake256, shake256_with_domain, u64_be};
use crate::wide;
use zeroize::Zeroize;

/// Mutable per-block state: the register file (seeded from key material and
/// mixed with an IV) and the round accumulator.
pub struct CipherState {
    pub registers: [[u8; REGISTER_SIZE]; REGISTER_COUNT],
    pub accumulator: [u8; ACCUMULATOR_SIZE],
}

impl Drop for CipherState {
    fn drop(&mut self) {
        for register in self.registers.iter_mut() {
            register.zeroize();
        }
        self.accumulator.zeroize();
    }
}

impl CipherState {
    /// Start a block transformation from an already IV-mixed register file.
    pub fn new(registers: [[u8; REGISTER_SIZE]; REGISTER_COUNT]) -> Self {
        Self {
            registers,
            accumulator: [0u8; ACCUMULATOR_SIZE],
        }
    }
}

/// Step 1: order the selectors for this block. Seeds a fresh ChaCha20 PRNG
/// from `key ‖ iv ‖ block_number ‖ "RUC-PRIO"`, draws a priority in `[0, 7)`
/// per selector (in the key schedule's stored order), then stable-sorts
/// ascending by that priority so ties keep their original relative order.
fn order_selectors(key: &[u8], iv: &[u8], block_number: u64, selectors: &[u16]) -> Vec<u16> {
    let mut seed_input = Vec::with_capacity(key.len() + iv.len() + 8 + domain::PRIO.len());
    seed_input.extend_from_slice(key);
    seed_input.extend_from_slice(iv);
    seed_input.extend_from_slice(&u64_be(block_number));
    seed_input.extend_from_slice(domain::PRIO);
    let seed_bytes = shake256(&seed_input, 32);
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&seed_bytes);

    let mut prng = ChaCha20Prng::new(&seed);
    let mut indexed: Vec<(u32, u16)> = selectors
        .iter()
        .map(|&sel| (prng.next_int(7), sel))
        .collect();
    indexed.sort_by_key(|&(priority, _)| priority);
    indexed.into_iter().map(|(_, sel)| sel).collect()
}

/// Run one selector's 13-step transformation against round `r`'s S-box and
/// round key, mutating `state` in place (spec §4.5, step 3).
fn apply_selector(state: &mut CipherState, sbox: &[u8; 256], round_key: &[u8; REGISTER_SIZE], sel: u16, key_const: u8) {
    let reg0_low = wide::low_u32(&state.registers[0]);
    let rk_low = wide::low_u32(round_key);
    let dest = ((reg0_low ^ (sel as u32) ^ rk_low) % REGISTER_COUNT as u32) as usize;

    let temp = sel.wrapping_mul(2);
    let state_byte = state.registers[dest][0];
    let mut gf = gf256::gf_mul_table((temp & 0xFF) as u8, state_byte);
    gf ^= key_const;
    let result = sbox[gf as usize];

    gf256::gf_mul_register(&mut state.registers[dest], result);

    let shift_amount = (sel % 16) as usize;
    let widened = wide::widen_low(&[result], REGISTER_SIZE);
    let shifted = wide::shift_left(&widened, shift_amount);
    wide::xor_assign(&mut state.registers[dest], &shifted);

    let last = REGISTER_SIZE - 1;
    let low_byte = state.registers[dest][last];
    state.registers[dest][last] ^= sbox[low_byte as usize];

    let rotated = wide::rotate_left(&state.registers[dest], 1);
    state.registers[dest].copy_from_slice(&rotated);

    let next = (dest + 1) % REGISTER_COUNT;
    let next_register = state.registers[next];
    wide::xor_assign(&mut state.registers[dest], &next_register);

    wide::add_u64_assign(&mut state.accumulator, result as u64);
}

fn inter_round_mix(state: &mut CipherState) {
    for i in 0..REGISTER_COUNT {
        let a = state.registers[(i + 1) % REGISTER_COUNT];
        let b = state.registers[(i + 2) % REGISTER_COUNT];
        wide::xor_assign(&mut state.registers[i], &a);
        wide::xor_assign(&mut state.registers[i], &b);
    }
}

/// Steps 1-4: order selectors, reset the accumulator, run 24 rounds, then
/// derive the 32-byte keystream. Does not touch the ciphertext; callers XOR
/// the result with plaintext (encrypt) or ciphertext (decrypt) themselves.
///
/// `key_const` resolves round step 6's per-selector byte. The default
/// software path ([`derive_keystream`]) calls [`KeyMaterial::key_const`]
/// directly; [`crate::pipeline`]'s accelerated backend instead passes a
/// closure over a table precomputed once per chunk — same bytes, fewer
/// SHAKE256 calls.
pub fn derive_keystream_with(
    key_material: &KeyMaterial,
    iv: &[u8],
    block_number: u64,
    state: &mut CipherState,
    key_const: impl Fn(u16) -> u8,
) -> [u8; 32] {
    let ordered_selectors = order_selectors(key_material.key(), iv, block_number, &key_material.selectors);
    state.accumulator = [0u8; ACCUMULATOR_SIZE];

    for r in 0..ROUNDS {
        let sbox = &key_material.sboxes[r];
        let round_key = &key_material.round_keys[r];
        for &sel in &ordered_selectors {
            apply_selector(state, sbox, round_key, sel, key_const(sel));
        }
        inter_round_mix(state);
    }

    let mut ks_input = Vec::with_capacity(16 + REGISTER_SIZE * REGISTER_COUNT + domain::KS.len() + 8);
    ks_input.extend_from_slice(&state.accumulator[ACCUMULATOR_SIZE - 16..]);
    for register in &state.registers {
        ks_input.extend_from_slice(register);
    }
    ks_input.extend_from_slice(domain::KS);
    ks_input.extend_from_slice(&u64_be(block_number));

    let keystream = shake256(&ks_input, 32);
    let mut out = [0u8; 32];
    out.copy_from_slice(&keystream);
    out
}

/// Convenience wrapper over [`derive_keystream_with`] that recomputes each
/// selector's `RUC-CONST` byte on demand.
pub fn derive_keystream(
    key_material: &KeyMaterial,
    iv: &[u8],
    block_number: u64,
    state: &mut CipherState,
) -> [u8; 32] {
    derive_keystream_with(key_material, iv, block_number, state, |sel| key_material.key_const(sel))
}

/// Step 5: fold the ciphertext back into the register state. Always the
/// ciphertext, in both encrypt and decrypt directions, so the two stay in
/// lockstep (spec §4.5).
pub fn apply_ciphertext_feedback(state: &mut CipherState, ciphertext: &[u8; 32]) {
    let widened = wide::widen_low(ciphertext, REGISTER_SIZE);
    for (i, register) in state.registers.iter_mut().enumerate() {
        let shifted = wide::shift_left(&widened, (i * 37) % (REGISTER_SIZE * 8));
        wide::xor_assign(register, &shifted);
    }
}

/// Run a full block transformation: derive the keystream, let the caller
/// fold it with plaintext or ciphertext to recover the other side, then
/// apply ciphertext feedback to `state`. Matches the per-block flow CTR
/// mode drives directly; `xor_block` receives the keystream and must return
/// the resulting ciphertext (for both encrypt and decrypt, since the
/// feedback step always uses the ciphertext).
pub fn run_block(
    key_material: &KeyMaterial,
    iv: &[u8],
    block_number: u64,
    state: &mut CipherState,
    xor_block: impl FnOnce(&[u8; 32]) -> [u8; 32],
) -> [u8; 32] {
    let keystream = derive_keystream(key_material, iv, block_number, state);
    let ciphertext = xor_block(&keystream);
    apply_ciphertext_feedback(state, &ciphertext);
    ciphertext
}

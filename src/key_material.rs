//! Key expansion: turns a 64-byte master key into the registers, selectors,
//! round keys, and S-boxes a block transformation needs, plus the IV-mixing
//! routine shared by every block mode.

use crate::constants::{
    domain, IV_MIX_ROTATE_STEP, IV_MIX_SWEEP_ROTATE_A, IV_MIX_SWEEP_ROTATE_B, KEY_SIZE,
    REGISTER_COUNT, REGISTER_SIZE, ROUNDS,
};
use crate::error::{Error, Result};
use crate::observability::{self, Operation};
use crate::primitives::chacha_prng::ChaCha20Prng;
use crate::primitives::shake::{shake256, shake256_with_domain, u16_be};
use crate::sbox::generate_sbox;
use crate::wide;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use zeroize::Zeroize;

/// Everything derived from a master key: registers, the key-derived
/// selector schedule, round keys, and per-round S-boxes. Pure function of
/// the key and fixed domain strings — identical keys yield identical
/// material (spec invariant, §3).
pub struct KeyMaterial {
    key: Vec<u8>,
    /// Initial register state before any IV mixing.
    pub registers: [[u8; REGISTER_SIZE]; REGISTER_COUNT],
    /// Key-derived, permuted selector schedule. Every entry is odd and
    /// non-zero.
    pub selectors: Vec<u16>,
    /// Per-round 512-bit round keys.
    pub round_keys: Vec<[u8; REGISTER_SIZE]>,
    /// Per-round S-boxes, each a bijection over `0..256`.
    pub sboxes: Vec<[u8; 256]>,
    /// Caches `key_const(sel)`, bounded to the largest possible selector
    /// count (spec Design Notes §9: optional, bounded, per-call only —
    /// here "per call" is "per `KeyMaterial`", which never outlives the key
    /// it was derived from).
    key_const_cache: Mutex<LruCache<u16, u8>>,
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.key.zeroize();
        for register in self.registers.iter_mut() {
            register.zeroize();
        }
        for round_key in self.round_keys.iter_mut() {
            round_key.zeroize();
        }
    }
}

impl KeyMaterial {
    /// Derive the full key schedule from a 64-byte master key.
    #[tracing::instrument(skip(key))]
    pub fn expand(key: &[u8]) -> Result<Self> {
        let timer = observability::global().start(Operation::KeyExpansion);
        if key.len() != KEY_SIZE {
            timer.fail("invalid key length");
            return Err(Error::InvalidLength {
                what: "master key",
                expected: KEY_SIZE,
                actual: key.len(),
            });
        }

        let mut registers = [[0u8; REGISTER_SIZE]; REGISTER_COUNT];
        for (i, register) in registers.iter_mut().enumerate() {
            let derived =
                shake256_with_domain(key, domain::REG, &u16_be(i as u16), &[], REGISTER_SIZE);
            register.copy_from_slice(&derived);
        }

        let selector_count = 16 + (key[1] as usize % 16);
        let mut selectors = Vec::with_capacity(selector_count);
        for i in 0..selector_count {
            let bytes = shake256_with_domain(key, domain::SEL, &u16_be(i as u16), &[], 2);
            let mut value = u16::from_be_bytes([bytes[0], bytes[1]]);
            if value % 2 == 0 {
                value = value.wrapping_add(1);
            }
            if value == 0 {
                value = 1;
            }
            selectors.push(value);
        }

        let perm_seed_bytes = shake256_with_domain(key, domain::PERM, &[], &[], 32);
        let mut perm_seed = [0u8; 32];
        perm_seed.copy_from_slice(&perm_seed_bytes);
        let mut prng = ChaCha20Prng::new(&perm_seed);
        for i in (1..selectors.len()).rev() {
            let j = prng.next_int((i + 1) as u32) as usize;
            selectors.swap(i, j);
        }

        let mut round_keys = Vec::with_capacity(ROUNDS);
        for r in 0..ROUNDS {
            let derived =
                shake256_with_domain(key, domain::RK, &u16_be(r as u16), &[], REGISTER_SIZE);
            let mut round_key = [0u8; REGISTER_SIZE];
            round_key.copy_from_slice(&derived);
            round_keys.push(round_key);
        }

        let mut sboxes = Vec::with_capacity(ROUNDS);
        for r in 0..ROUNDS {
            sboxes.push(generate_sbox(key, r as u16));
        }

        timer.finish(key.len());
        Ok(Self {
            key: key.to_vec(),
            registers,
            selectors,
            round_keys,
            sboxes,
            key_const_cache: Mutex::new(LruCache::new(NonZeroUsize::new(31).expect("nonzero"))),
        })
    }

    /// The master key this material was derived from. Round execution needs
    /// it to recompute the per-selector `RUC-CONST` byte.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// `SHAKE256(key ‖ "RUC-CONST" ‖ u16_be(sel), 1)`, the single byte mixed
    /// into round step 6. Cached per selector value since every round of
    /// every block recomputes the same selectors.
    pub fn key_const(&self, sel: u16) -> u8 {
        if let Some(&cached) = self.key_const_cache.lock().get(&sel) {
            return cached;
        }
        let value = shake256_with_domain(&self.key, domain::CONST, &u16_be(sel), &[], 1)[0];
        self.key_const_cache.lock().put(sel, value);
        value
    }

    /// Precompute [`Self::key_const`] for a whole ordered selector list in
    /// one pass. Used by the accelerated pipeline backend, which hoists
    /// this out of the round loop instead of recomputing it per round; the
    /// software backend calls [`Self::key_const`] directly and gets the
    /// same bytes.
    pub fn key_constants(&self, ordered_selectors: &[u16]) -> Vec<u8> {
        ordered_selectors
            .iter()
            .map(|&sel| self.key_const(sel))
            .collect()
    }
}

/// Mix a 32-byte IV into a copy of `registers`, producing the per-block
/// initial state used by every block mode (spec §4.4).
pub fn mix_iv(
    registers: &[[u8; REGISTER_SIZE]; REGISTER_COUNT],
    iv: &[u8],
) -> [[u8; REGISTER_SIZE]; REGISTER_COUNT] {
    let mut state = *registers;

    let mut expand_input = iv.to_vec();
    expand_input.extend_from_slice(domain::IV_EXPAND);
    let expanded = shake256(&expand_input, REGISTER_SIZE);

    let width_bits = REGISTER_SIZE * 8;
    for (i, register) in state.iter_mut().enumerate() {
        let rotated = wide::rotate_left(&expanded, (i * IV_MIX_ROTATE_STEP) % width_bits);
        wide::xor_assign(register, &rotated);
    }

    for _ in 0..3 {
        for i in 0..REGISTER_COUNT {
            let a = wide::rotate_left(&state[(i + 1) % REGISTER_COUNT], IV_MIX_SWEEP_ROTATE_A);
            let b = wide::rotate_left(&state[(i + 3) % REGISTER_COUNT], IV_MIX_SWEEP_ROTATE_B);
            wide::xor_assign(&mut state[i], &a);
            wide::xor_assign(&mut state[i], &b);
        }
    }

    state
}

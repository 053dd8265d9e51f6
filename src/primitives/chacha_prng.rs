//! ChaCha20 PRNG: a deterministic keystream generator seeded by a 32-byte
//! key (and optional 12-byte nonce), built on the RustCrypto `chacha20`
//! block function. Used wherever the spec calls for a ChaCha20-seeded
//! pseudo-random sequence rather than a direct SHAKE256 byte stream:
//! key-expansion's selector permutation and per-block selector-priority
//! ordering.

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::ChaCha20;

const REFILL_SIZE: usize = 1024;

/// A deterministic pseudo-random byte generator backed by ChaCha20.
pub struct ChaCha20Prng {
    cipher: ChaCha20,
    buffer: Vec<u8>,
    pos: usize,
}

impl ChaCha20Prng {
    /// Seed with a 32-byte key and an all-zero 12-byte nonce.
    pub fn new(seed: &[u8; 32]) -> Self {
        Self::with_nonce(seed, &[0u8; 12])
    }

    /// Seed with an explicit 32-byte key and 12-byte nonce.
    pub fn with_nonce(seed: &[u8; 32], nonce: &[u8; 12]) -> Self {
        let cipher = ChaCha20::new(seed.into(), nonce.into());
        Self {
            cipher,
            buffer: Vec::new(),
            pos: 0,
        }
    }

    fn refill(&mut self) {
        let mut block = vec![0u8; REFILL_SIZE];
        self.cipher.apply_keystream(&mut block);
        self.buffer = block;
        self.pos = 0;
    }

    /// Draw `n` pseudo-random bytes.
    pub fn next_bytes(&mut self, n: usize) -> Vec<u8> {
        let mut out = vec![0u8; n];
        let mut filled = 0;
        while filled < n {
            if self.pos >= self.buffer.len() {
                self.refill();
            }
            let available = self.buffer.len() - self.pos;
            let take = available.min(n - filled);
            out[filled..filled + take].copy_from_slice(&self.buffer[self.pos..self.pos + take]);
            self.pos += take;
            filled += take;
        }
        out
    }

    /// Draw a little-endian u32.
    pub fn next_u32(&mut self) -> u32 {
        let b = self.next_bytes(4);
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }

    /// Draw a uniform integer in `[0, max)` using rejection sampling, so the
    /// result is not biased toward small remainders.
    pub fn next_int(&mut self, max: u32) -> u32 {
        assert!(max > 0, "next_int requires a positive upper bound");
        let range = max as u64;
        let span = u32::MAX as u64 + 1;
        let limit = span - (span % range);
        loop {
            let candidate = self.next_u32() as u64;
            if candidate < limit {
                return (candidate % range) as u32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_seed() {
        let seed = [7u8; 32];
        let mut a = ChaCha20Prng::new(&seed);
        let mut b = ChaCha20Prng::new(&seed);
        assert_eq!(a.next_bytes(100), b.next_bytes(100));
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = ChaCha20Prng::new(&[1u8; 32]);
        let mut b = ChaCha20Prng::new(&[2u8; 32]);
        assert_ne!(a.next_bytes(32), b.next_bytes(32));
    }

    #[test]
    fn next_int_stays_in_range() {
        let mut prng = ChaCha20Prng::new(&[9u8; 32]);
        for _ in 0..1000 {
            let v = prng.next_int(7);
            assert!(v < 7);
        }
    }

    #[test]
    fn refills_across_buffer_boundary() {
        let mut prng = ChaCha20Prng::new(&[3u8; 32]);
        let bytes = prng.next_bytes(REFILL_SIZE * 3 + 17);
        assert_eq!(bytes.len(), REFILL_SIZE * 3 + 17);
    }
}

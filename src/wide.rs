//! Fixed-size big-endian integers used for registers and the round
//! accumulator.
//!
//! Byte order is big-endian throughout: byte 0 is the most significant byte.
//! Modeled as stack-allocated byte arrays rather than a general big-number
//! type, per the port-time guidance in spec.md §9.

use zeroize::Zeroize;

/// XOR `b` into `a` in place.
pub fn xor_assign(a: &mut [u8], b: &[u8]) {
    debug_assert_eq!(a.len(), b.len());
    for (x, y) in a.iter_mut().zip(b.iter()) {
        *x ^= y;
    }
}

/// Rotate a big-endian bit string left by `bits`, wrapping around the full
/// width of `data`.
pub fn rotate_left(data: &[u8], bits: usize) -> Vec<u8> {
    let width_bits = data.len() * 8;
    if width_bits == 0 {
        return Vec::new();
    }
    let bits = bits % width_bits;
    if bits == 0 {
        return data.to_vec();
    }
    let byte_shift = bits / 8;
    let bit_shift = bits % 8;
    let len = data.len();
    let mut out = vec![0u8; len];
    for i in 0..len {
        let src = (i + byte_shift) % len;
        let next = (i + byte_shift + 1) % len;
        let hi = data[src] << bit_shift;
        let lo = if bit_shift > 0 {
            data[next] >> (8 - bit_shift)
        } else {
            0
        };
        out[i] = hi | lo;
    }
    out
}

/// Add a small unsigned value into the least-significant end of a
/// big-endian bit string, modulo 2^(8 * data.len()), propagating carries
/// toward the most significant byte.
pub fn add_u64_assign(data: &mut [u8], mut value: u64) {
    for byte in data.iter_mut().rev() {
        if value == 0 {
            break;
        }
        let sum = *byte as u64 + (value & 0xFF);
        *byte = sum as u8;
        value = (value >> 8) + (sum >> 8);
    }
}

/// Logically shift a big-endian bit string left by `bits`, within the fixed
/// width of `data`. Unlike [`rotate_left`], bits shifted past the most
/// significant end are dropped rather than wrapped, and the vacated low end
/// is zero-filled.
pub fn shift_left(data: &[u8], bits: usize) -> Vec<u8> {
    let len = data.len();
    let total_bits = len * 8;
    if bits >= total_bits {
        return vec![0u8; len];
    }
    let byte_shift = bits / 8;
    let bit_shift = bits % 8;
    let mut out = vec![0u8; len];
    for i in 0..len {
        let src = i + byte_shift;
        if src >= len {
            continue;
        }
        let hi = data[src] << bit_shift;
        let lo = if bit_shift > 0 && src + 1 < len {
            data[src + 1] >> (8 - bit_shift)
        } else {
            0
        };
        out[i] = hi | lo;
    }
    out
}

/// Zero-extend `data` into a buffer of `width` bytes, placing `data` at the
/// least-significant end (the tail, since byte order is big-endian).
pub fn widen_low(data: &[u8], width: usize) -> Vec<u8> {
    debug_assert!(data.len() <= width);
    let mut out = vec![0u8; width];
    out[width - data.len()..].copy_from_slice(data);
    out
}

/// Interpret the last 4 bytes of a big-endian bit string as a u32.
pub fn low_u32(data: &[u8]) -> u32 {
    let len = data.len();
    debug_assert!(len >= 4);
    u32::from_be_bytes([
        data[len - 4],
        data[len - 3],
        data[len - 2],
        data[len - 1],
    ])
}

/// Zeroizing wrapper around a fixed-size secret byte array.
#[derive(Clone)]
pub struct Secret<const N: usize>(pub [u8; N]);

impl<const N: usize> Secret<N> {
    pub fn zero() -> Self {
        Self([0u8; N])
    }

    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut arr = [0u8; N];
        arr.copy_from_slice(bytes);
        Self(arr)
    }
}

impl<const N: usize> AsRef<[u8]> for Secret<N> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const N: usize> AsMut<[u8]> for Secret<N> {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl<const N: usize> Zeroize for Secret<N> {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl<const N: usize> Drop for Secret<N> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<const N: usize> std::fmt::Debug for Secret<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret").field("len", &N).finish()
    }
}

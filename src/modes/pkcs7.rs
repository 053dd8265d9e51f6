//! PKCS#7 padding to a 32-byte block boundary.

use crate::constants::BLOCK_SIZE;
use crate::error::{Error, Result};

/// Pad `data` up to a multiple of [`BLOCK_SIZE`]. The pad length is always
/// in `1..=BLOCK_SIZE`, even when `data` is already block-aligned (a full
/// padding block is appended in that case, so unpadding is unambiguous).
pub fn pad(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_SIZE - (data.len() % BLOCK_SIZE);
    let mut out = Vec::with_capacity(data.len() + pad_len);
    out.extend_from_slice(data);
    out.extend(std::iter::repeat(pad_len as u8).take(pad_len));
    out
}

/// Remove and validate PKCS#7 padding. Rejects anything that isn't a
/// consistent pad of `1..=BLOCK_SIZE` identical trailing bytes.
pub fn unpad(data: &[u8]) -> Result<Vec<u8>> {
    if data.is_empty() || data.len() % BLOCK_SIZE != 0 {
        return Err(Error::MalformedFrame(
            "ciphertext body length is not a block multiple".into(),
        ));
    }
    let pad_len = *data.last().expect("checked non-empty above") as usize;
    if pad_len == 0 || pad_len > BLOCK_SIZE {
        return Err(Error::Padding);
    }
    let (body, padding) = data.split_at(data.len() - pad_len);
    if !padding.iter().all(|&b| b as usize == pad_len) {
        return Err(Error::Padding);
    }
    Ok(body.to_vec())
}

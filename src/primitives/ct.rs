//! Constant-time comparison for authentication tags and other secrets.

use subtle::ConstantTimeEq;

/// Compare `a` and `b` without leaking timing information about where they
/// first differ. A length mismatch is not secret and is checked up front.
pub fn constant_time_equal(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

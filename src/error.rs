//! Error types for cipher operations

/// Result type alias using our [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during key derivation, encryption, or decryption
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An input was not the required fixed size (key, salt, nonce, or block)
    #[error("invalid length for {what}: expected {expected}, got {actual}")]
    InvalidLength {
        /// Name of the field that failed the length check
        what: &'static str,
        /// Required length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// PKCS#7 padding was absent, exceeded a block, or was inconsistent
    #[error("invalid padding")]
    Padding,

    /// Ciphertext was too short to contain its declared components, or the
    /// ciphertext body length was not a block multiple
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// AEAD tag verification failed. Carries no detail about which byte
    /// differed.
    #[error("authentication failed")]
    Authentication,

    /// Password-based key derivation failed
    #[error("key derivation failed: {0}")]
    Kdf(String),
}

//! FHE backend error types

use thiserror::Error;

/// Errors raised at the homomorphic-encryption backend boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FheError {
    /// Ciphertext bytes do not decode to a well-formed ciphertext
    #[error("Invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    /// Admission proof rejected for the supplied context
    #[error("Invalid admission proof: {0}")]
    InvalidProof(String),

    /// Ciphertext decodes, but not at the expected bit width
    #[error("Width mismatch: expected {expected} bits, got {actual}")]
    WidthMismatch { expected: u8, actual: u8 },

    /// Handle does not refer to a ciphertext in this backend's store
    #[error("Unknown handle: {0}")]
    UnknownHandle(String),

    /// Homomorphic operation failed
    #[error("Homomorphic operation failed: {0}")]
    OperationFailed(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for backend operations
pub type FheResult<T> = Result<T, FheError>;

//! Ledger error types

use thiserror::Error;
use umbra_fhe::FheError;

/// Errors returned by ledger operations.
///
/// Every failure leaves the ledger unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Record already exists: {0}")]
    DuplicateRecord(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Invalid ciphertext proof: {0}")]
    InvalidCiphertextProof(String),

    #[error("Record already verified: {0}")]
    AlreadyVerified(String),

    #[error("Invalid decryption proof for record {0}")]
    InvalidDecryptionProof(String),

    /// Rate or term does not fit the fixed-point representation
    #[error("Numeric overflow: {0}")]
    NumericOverflow(String),

    /// Term of zero months, or beyond the configured maximum
    #[error("Invalid loan terms: {0}")]
    InvalidTerms(String),

    /// Proof checks out but the cleartext is not a 32-bit amount
    #[error("Malformed cleartext for record {0}")]
    MalformedCleartext(String),

    #[error("Backend error: {0}")]
    Backend(#[from] FheError),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

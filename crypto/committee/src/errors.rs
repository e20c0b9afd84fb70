//! Committee error types

use thiserror::Error;
use umbra_fhe::FheError;

/// Errors raised by the decryption committee
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitteeError {
    /// Threshold outside `1..=members`
    #[error("Invalid threshold: {threshold} of {members}")]
    InvalidThreshold { threshold: usize, members: usize },

    /// Handle was never granted public decryption
    #[error("Decryption not authorized for {0}")]
    NotAuthorized(String),

    /// Cleartext word does not decode to the expected numeric type
    #[error("Malformed cleartext: {0}")]
    MalformedCleartext(String),

    /// Invalid key material
    #[error("Invalid key: {0}")]
    KeyError(String),

    /// Backend failure while serving a disclosure
    #[error("Backend error: {0}")]
    Backend(#[from] FheError),
}

/// Result type for committee operations
pub type CommitteeResult<T> = Result<T, CommitteeError>;

//! UMBRA: encrypted debt ledger
//!
//! Root crate re-exporting the UMBRA components for integration testing
//! and embedding.
//!
//! ## Architecture Overview
//!
//! A borrower registers a debt whose amount is encrypted under a
//! homomorphic scheme. The ledger:
//!
//! - **Admits** ciphertexts only with a proof binding them to the caller
//!   and this ledger's context
//! - **Computes** the monthly amortization payment over the ciphertext
//! - **Discloses** the amount once, when a threshold of the decryption
//!   committee attests the cleartext
//!
//! ## Crate Organization
//!
//! - `umbra-fhe`: handles, admission proofs and homomorphic backends
//! - `umbra-committee`: decryption committee keys, attestations and proofs
//! - `umbra-ledger`: records, registry, verification and amortization

pub use umbra_committee as committee;
pub use umbra_fhe as fhe;
pub use umbra_ledger as ledger;

/// UMBRA protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use umbra_committee::{Committee, CommitteeKeys, CommitteeMember, DecryptionProof};
    pub use umbra_fhe::{
        AdmissionAuthority, AdmissionContext, AdmissionProof, Handle, HomomorphicBackend,
        Principal, SealedBackend, SealingKey,
    };
    pub use umbra_ledger::{
        DebtLedger, LedgerConfig, LedgerError, LedgerEvent, LedgerResult, RecordView,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}

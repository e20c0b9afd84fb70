//! UMBRA Decryption Committee
//!
//! Public key material and proofs for the threshold decryption committee
//! that discloses encrypted amounts.
//!
//! # Protocol
//!
//! 1. A ciphertext admitted by the ledger is granted public decryption.
//! 2. Off-ledger, the committee opens the handle and `t` of `n` members sign
//!    `(digest(ciphertext), cleartext word)` with ed25519.
//! 3. The ledger checks the [`DecryptionProof`] against [`CommitteeKeys`]
//!    with [`verify_decryption`] and commits the cleartext once.

pub mod cleartext;
pub mod errors;
pub mod keys;
pub mod oracle;
pub mod proof;

pub use cleartext::{decode_u32, encode_word, WORD_SIZE};
pub use errors::{CommitteeError, CommitteeResult};
pub use keys::{CommitteeKeys, CommitteeMember};
pub use oracle::{Committee, Decryptor, Disclosure};
pub use proof::{decryption_message, verify_decryption, Attestation, DecryptionProof};

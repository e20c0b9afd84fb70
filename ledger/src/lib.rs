//! Encrypted debt ledger
//!
//! A principal registers a debt whose amount is encrypted end to end.
//! The ledger computes amortization over the ciphertext and accepts a
//! single verified disclosure of the amount from the decryption
//! committee.
//!
//! Disclosure is two-phase. Admitting a ciphertext (phase one) marks it
//! publicly decryptable, which lets the committee open it off-ledger.
//! `verify_amount` (phase two) checks the committee's proof and commits
//! the cleartext exactly once.

pub mod amortization;
pub mod clock;
pub mod config;
pub mod errors;
pub mod events;
pub mod ingress;
pub mod ledger;
pub mod record;
pub mod registry;
pub mod verifier;

pub use amortization::{
    fixed_power, plaintext_payment, AmortizationEngine, FixedPointTerms, POWER_CAP, SCALE,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::LedgerConfig;
pub use errors::{LedgerError, LedgerResult};
pub use events::{EventBus, EventReceiver, LedgerEvent};
pub use ingress::CiphertextIngress;
pub use ledger::DebtLedger;
pub use record::{DebtRecord, RecordView};
pub use registry::DebtRecordRegistry;
pub use verifier::DecryptionVerifier;

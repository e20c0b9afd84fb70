//! UMBRA FHE Boundary
//!
//! The homomorphic-encryption capability the debt ledger is built on.
//! The ledger only ever holds [`Handle`]s; ciphertexts live in a
//! backend-owned store and are never handed out as plaintext.
//!
//! # Backends
//!
//! - [`SealedBackend`]: in-process coprocessor over ChaCha20-Poly1305 sealed
//!   words. Deterministic and fast; used by tests and local simulation.
//! - `TfheBackend` (feature `tfhe`): TFHE-rs integer ciphertexts.
//!
//! # Admission
//!
//! External ciphertexts enter through [`HomomorphicBackend::admit`] together
//! with an [`AdmissionProof`] bound to an [`AdmissionContext`] (caller and
//! target ledger). Admitted handles are granted public decryption, which
//! authorizes the decryption committee to open them later.

pub mod backend;
pub mod context;
pub mod errors;
pub mod handle;
pub mod proof;
pub mod sealed;
mod store;
#[cfg(feature = "tfhe")]
pub mod tfhe_backend;

pub use backend::{HomomorphicBackend, ADMITTED_WIDTH, COMPUTE_WIDTH};
pub use context::{AdmissionContext, Principal};
pub use errors::{FheError, FheResult};
pub use handle::Handle;
pub use proof::{AdmissionAuthority, AdmissionProof};
pub use sealed::{SealedBackend, SealingKey};
#[cfg(feature = "tfhe")]
pub use tfhe_backend::{TfheBackend, TfheClient};

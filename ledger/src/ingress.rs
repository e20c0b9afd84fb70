//! Ciphertext admission

use std::sync::Arc;

use tracing::{debug, warn};
use umbra_fhe::{AdmissionContext, AdmissionProof, FheError, Handle, HomomorphicBackend};

use crate::{LedgerError, LedgerResult};

/// Admits externally supplied ciphertexts into the backend
pub struct CiphertextIngress<B: ?Sized> {
    backend: Arc<B>,
}

impl<B: HomomorphicBackend + ?Sized> CiphertextIngress<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Validate `raw_ciphertext` against its admission proof and context.
    ///
    /// On success the handle is publicly decryptable. Each call yields a new
    /// handle; nothing is deduplicated.
    pub fn admit(
        &self,
        raw_ciphertext: &[u8],
        proof: &AdmissionProof,
        context: &AdmissionContext,
    ) -> LedgerResult<Handle> {
        match self.backend.admit(raw_ciphertext, proof, context) {
            Ok(handle) => {
                debug!(%handle, caller = ?context.caller, "ciphertext admitted");
                Ok(handle)
            }
            Err(err @ (FheError::InvalidProof(_)
            | FheError::InvalidCiphertext(_)
            | FheError::WidthMismatch { .. })) => {
                warn!(caller = ?context.caller, error = %err, "ciphertext rejected");
                Err(LedgerError::InvalidCiphertextProof(err.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

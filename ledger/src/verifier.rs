//! Verified decryption
//!
//! Phase two of disclosure. Admission granted the committee the right to
//! open a record's ciphertext; here the committee's answer is checked and
//! committed. Proof checking runs without the record's lock held; the
//! commit re-checks the verified flag under the lock, so exactly one
//! disclosure wins a race.

use std::sync::Arc;

use tracing::{info, warn};
use umbra_committee::{decode_u32, verify_decryption, CommitteeKeys, DecryptionProof};
use umbra_fhe::HomomorphicBackend;

use crate::registry::DebtRecordRegistry;
use crate::{LedgerError, LedgerResult};

/// Checks committee decryption proofs and commits cleartexts
pub struct DecryptionVerifier<B: ?Sized> {
    backend: Arc<B>,
    committee: CommitteeKeys,
}

impl<B: HomomorphicBackend + ?Sized> DecryptionVerifier<B> {
    pub fn new(backend: Arc<B>, committee: CommitteeKeys) -> Self {
        Self { backend, committee }
    }

    pub fn committee(&self) -> &CommitteeKeys {
        &self.committee
    }

    /// Commit `clear_value` into record `id` if `proof` opens its ciphertext.
    ///
    /// Returns the disclosed amount. Fails `AlreadyVerified` before looking
    /// at the proof once the record is verified.
    pub fn verify(
        &self,
        registry: &DebtRecordRegistry,
        id: &str,
        clear_value: &[u8],
        proof: &DecryptionProof,
    ) -> LedgerResult<u32> {
        let slot = registry.slot(id)?;
        let handle = {
            let record = slot.lock();
            if record.verified() {
                warn!(id, "verification replay rejected");
                return Err(LedgerError::AlreadyVerified(id.to_string()));
            }
            record.encrypted_amount()
        };

        let digest = self.backend.digest(handle)?;
        if !verify_decryption(&self.committee, &digest, clear_value, proof) {
            warn!(id, attestations = proof.attestations.len(), "decryption proof rejected");
            return Err(LedgerError::InvalidDecryptionProof(id.to_string()));
        }

        let amount = decode_u32(clear_value)
            .map_err(|_| LedgerError::MalformedCleartext(id.to_string()))?;

        // the handle is immutable, so only the flag needs re-checking
        if let Err(e) = slot.lock().disclose(amount) {
            warn!(id, "lost disclosure race");
            return Err(e);
        }

        info!(id, amount, "amount disclosed");
        Ok(amount)
    }
}

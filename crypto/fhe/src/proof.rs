//! Admission proofs
//!
//! An admission proof attests that a ciphertext was checked by the input
//! gateway and is bound to one caller and one ledger context. It is a
//! blake3 keyed MAC under the gateway's attestation key over:
//!
//! ```text
//! DOMAIN || len(ciphertext) || ciphertext || caller || context_id
//! ```

use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::context::AdmissionContext;

/// Domain separation for admission MACs
const DOMAIN_ADMISSION: &[u8] = b"umbra/admission/v1";

/// Proof that a ciphertext is admitted for a specific context
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionProof {
    tag: [u8; 32],
}

impl AdmissionProof {
    pub fn from_bytes(tag: [u8; 32]) -> Self {
        Self { tag }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.tag
    }
}

impl std::fmt::Debug for AdmissionProof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionProof")
            .field("tag", &hex::encode(&self.tag[..8]))
            .finish()
    }
}

/// Gateway attestation key: issues and checks admission proofs
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct AdmissionAuthority {
    key: [u8; 32],
}

impl AdmissionAuthority {
    /// Generate a fresh attestation key
    pub fn generate() -> Self {
        let mut rng = ChaCha20Rng::from_entropy();
        let mut key = [0u8; 32];
        rng.fill_bytes(&mut key);
        Self { key }
    }

    pub fn from_bytes(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Issue a proof binding `ciphertext` to `context`
    pub fn issue(&self, ciphertext: &[u8], context: &AdmissionContext) -> AdmissionProof {
        AdmissionProof {
            tag: *self.mac(ciphertext, context).as_bytes(),
        }
    }

    /// Check a proof. Comparison is constant-time.
    pub fn check(
        &self,
        ciphertext: &[u8],
        context: &AdmissionContext,
        proof: &AdmissionProof,
    ) -> bool {
        self.mac(ciphertext, context) == blake3::Hash::from(proof.tag)
    }

    fn mac(&self, ciphertext: &[u8], context: &AdmissionContext) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new_keyed(&self.key);
        hasher.update(DOMAIN_ADMISSION);
        hasher.update(&(ciphertext.len() as u64).to_le_bytes());
        hasher.update(ciphertext);
        hasher.update(context.caller.as_bytes());
        hasher.update(&context.context_id);
        hasher.finalize()
    }
}

impl std::fmt::Debug for AdmissionAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionAuthority").finish_non_exhaustive()
    }
}

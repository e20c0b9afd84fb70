//! Committee oracle
//!
//! Serves disclosure requests for publicly decryptable handles: opens the
//! exported ciphertext with the committee's decryption capability and
//! collects member attestations over the result. In a deployment this runs
//! off-ledger between admission and verification.

use tracing::{debug, warn};
use umbra_fhe::{FheResult, Handle, HomomorphicBackend, SealingKey};

use crate::cleartext::{encode_word, WORD_SIZE};
use crate::keys::{CommitteeKeys, CommitteeMember};
use crate::proof::DecryptionProof;
use crate::{CommitteeError, CommitteeResult};

/// Decryption capability over exported ciphertext bytes
pub trait Decryptor: Send + Sync {
    fn decrypt(&self, exported: &[u8]) -> FheResult<u64>;
}

impl Decryptor for SealingKey {
    fn decrypt(&self, exported: &[u8]) -> FheResult<u64> {
        self.open(exported).map(|(_, value)| value)
    }
}

#[cfg(feature = "tfhe")]
impl Decryptor for umbra_fhe::TfheClient {
    fn decrypt(&self, exported: &[u8]) -> FheResult<u64> {
        self.decrypt_export(exported)
    }
}

/// A cleartext and the committee's proof for it
#[derive(Clone, Debug)]
pub struct Disclosure {
    pub word: [u8; WORD_SIZE],
    pub proof: DecryptionProof,
}

/// Simulated decryption committee
pub struct Committee {
    members: Vec<CommitteeMember>,
    threshold: usize,
    decryptor: Box<dyn Decryptor>,
}

impl Committee {
    /// Create a committee with `n` fresh members and threshold `t`
    pub fn generate(n: u16, t: usize, decryptor: impl Decryptor + 'static) -> CommitteeResult<Self> {
        let members = (0..n).map(CommitteeMember::generate).collect();
        Self::from_members(members, t, decryptor)
    }

    /// Build from existing members. Indices must be exactly `0..n`.
    pub fn from_members(
        mut members: Vec<CommitteeMember>,
        threshold: usize,
        decryptor: impl Decryptor + 'static,
    ) -> CommitteeResult<Self> {
        if threshold == 0 || threshold > members.len() {
            return Err(CommitteeError::InvalidThreshold {
                threshold,
                members: members.len(),
            });
        }
        members.sort_by_key(|m| m.index());
        if members.iter().enumerate().any(|(pos, m)| usize::from(m.index()) != pos) {
            return Err(CommitteeError::KeyError("member indices must be 0..n".into()));
        }
        Ok(Self {
            members,
            threshold,
            decryptor: Box::new(decryptor),
        })
    }

    /// Public key material for ledgers
    pub fn keys(&self) -> CommitteeKeys {
        CommitteeKeys::from_parts(
            self.members.iter().map(|m| m.verifying_key()).collect(),
            self.threshold,
        )
    }

    pub fn members(&self) -> &[CommitteeMember] {
        &self.members
    }

    /// Decrypt a publicly decryptable handle and attest the result
    pub fn disclose<B>(&self, backend: &B, handle: Handle) -> CommitteeResult<Disclosure>
    where
        B: HomomorphicBackend + ?Sized,
    {
        if !backend.is_publicly_decryptable(handle)? {
            warn!(%handle, "disclosure requested for handle without public decryption");
            return Err(CommitteeError::NotAuthorized(handle.to_string()));
        }

        let exported = backend.export(handle)?;
        let value = self.decryptor.decrypt(&exported)?;
        let word = encode_word(value);
        let digest = backend.digest(handle)?;

        debug!(%handle, signers = self.threshold, "disclosure attested");
        Ok(Disclosure {
            word,
            proof: self.attest(&digest, &word),
        })
    }

    /// Attest an arbitrary `(digest, word)` pair with `threshold` members
    pub fn attest(&self, digest: &[u8; 32], word: &[u8]) -> DecryptionProof {
        DecryptionProof::new(
            self.members
                .iter()
                .take(self.threshold)
                .map(|member| member.attest(digest, word))
                .collect(),
        )
    }
}

impl std::fmt::Debug for Committee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Committee")
            .field("members", &self.members.len())
            .field("threshold", &self.threshold)
            .finish()
    }
}

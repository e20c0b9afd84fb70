//! Committee key material
//!
//! [`CommitteeKeys`] is the public half: member verifying keys and the
//! threshold. It is what a ledger needs to check disclosures.
//! [`CommitteeMember`] holds a signing key and lives with the oracle.

use std::fmt;

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::proof::{decryption_message, Attestation};
use crate::{CommitteeError, CommitteeResult};

/// Public verification material for a t-of-n decryption committee
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CommitteeKeysRepr", into = "CommitteeKeysRepr")]
pub struct CommitteeKeys {
    members: Vec<VerifyingKey>,
    threshold: usize,
}

impl CommitteeKeys {
    pub fn new(members: Vec<VerifyingKey>, threshold: usize) -> CommitteeResult<Self> {
        if threshold == 0 || threshold > members.len() {
            return Err(CommitteeError::InvalidThreshold {
                threshold,
                members: members.len(),
            });
        }
        Ok(Self { members, threshold })
    }

    /// Construct without validation; callers guarantee `1 <= threshold <= n`
    pub(crate) fn from_parts(members: Vec<VerifyingKey>, threshold: usize) -> Self {
        Self { members, threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Verifying key of a member, by index
    pub fn member(&self, index: u16) -> Option<&VerifyingKey> {
        self.members.get(usize::from(index))
    }
}

impl fmt::Debug for CommitteeKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitteeKeys")
            .field("members", &self.members.len())
            .field("threshold", &self.threshold)
            .finish()
    }
}

/// Serialized form: hex-encoded verifying keys
#[derive(Serialize, Deserialize)]
struct CommitteeKeysRepr {
    threshold: usize,
    members: Vec<String>,
}

impl TryFrom<CommitteeKeysRepr> for CommitteeKeys {
    type Error = CommitteeError;

    fn try_from(repr: CommitteeKeysRepr) -> CommitteeResult<Self> {
        let members = repr
            .members
            .iter()
            .map(|encoded| parse_verifying_key(encoded))
            .collect::<CommitteeResult<Vec<_>>>()?;
        Self::new(members, repr.threshold)
    }
}

impl From<CommitteeKeys> for CommitteeKeysRepr {
    fn from(keys: CommitteeKeys) -> Self {
        Self {
            threshold: keys.threshold,
            members: keys
                .members
                .iter()
                .map(|key| hex::encode(key.as_bytes()))
                .collect(),
        }
    }
}

fn parse_verifying_key(encoded: &str) -> CommitteeResult<VerifyingKey> {
    let bytes = hex::decode(encoded)
        .map_err(|e| CommitteeError::KeyError(format!("member key hex: {}", e)))?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|_| CommitteeError::KeyError("member key must be 32 bytes".into()))?;
    VerifyingKey::from_bytes(&bytes)
        .map_err(|e| CommitteeError::KeyError(format!("member key: {}", e)))
}

/// A committee member able to attest decryptions
#[derive(Clone)]
pub struct CommitteeMember {
    index: u16,
    signing_key: SigningKey,
}

impl CommitteeMember {
    pub fn generate(index: u16) -> Self {
        Self {
            index,
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_seed(index: u16, seed: &[u8; 32]) -> Self {
        Self {
            index,
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Secret seed, for persisting committee keys
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Attest that `word` opens the ciphertext with digest `digest`
    pub fn attest(&self, digest: &[u8; 32], word: &[u8]) -> Attestation {
        let signature = self.signing_key.sign(&decryption_message(digest, word));
        Attestation {
            member: self.index,
            signature: signature.to_bytes(),
        }
    }
}

impl fmt::Debug for CommitteeMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitteeMember")
            .field("index", &self.index)
            .field("verifying_key", &hex::encode(&self.verifying_key().as_bytes()[..8]))
            .finish()
    }
}

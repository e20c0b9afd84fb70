//! Decryption proofs
//!
//! A decryption proof is a set of member attestations over
//!
//! ```text
//! DOMAIN || ciphertext digest (32) || cleartext word
//! ```
//!
//! It is valid when at least `threshold` distinct, known members signed the
//! exact message. Unknown members, bad signatures and repeated members do
//! not count towards the threshold.

use std::collections::BTreeSet;

use ed25519_dalek::{Signature, Verifier};
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

use crate::keys::CommitteeKeys;

/// Domain separation for decryption attestations
const DOMAIN_DECRYPTION: &[u8] = b"umbra/decryption/v1";

/// One member's signature over a decryption result
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    /// Member index within the committee
    pub member: u16,
    /// Ed25519 signature
    #[serde(with = "BigArray")]
    pub signature: [u8; 64],
}

/// Committee evidence that a cleartext opens a specific ciphertext
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionProof {
    pub attestations: Vec<Attestation>,
}

impl DecryptionProof {
    pub fn new(attestations: Vec<Attestation>) -> Self {
        Self { attestations }
    }
}

/// Message attested by committee members
pub fn decryption_message(digest: &[u8; 32], word: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(DOMAIN_DECRYPTION.len() + 32 + word.len());
    message.extend_from_slice(DOMAIN_DECRYPTION);
    message.extend_from_slice(digest);
    message.extend_from_slice(word);
    message
}

/// Check a decryption proof against committee key material
pub fn verify_decryption(
    keys: &CommitteeKeys,
    digest: &[u8; 32],
    word: &[u8],
    proof: &DecryptionProof,
) -> bool {
    let message = decryption_message(digest, word);
    let mut signers = BTreeSet::new();

    for attestation in &proof.attestations {
        if signers.contains(&attestation.member) {
            continue;
        }
        let Some(key) = keys.member(attestation.member) else {
            continue;
        };
        let signature = Signature::from_bytes(&attestation.signature);
        if key.verify(&message, &signature).is_ok() {
            signers.insert(attestation.member);
        }
    }

    signers.len() >= keys.threshold()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleartext::encode_word;
    use crate::keys::CommitteeMember;

    struct Setup {
        members: Vec<CommitteeMember>,
        keys: CommitteeKeys,
    }

    fn setup(n: u16, t: usize) -> Setup {
        let members: Vec<_> = (0..n).map(CommitteeMember::generate).collect();
        let keys = CommitteeKeys::new(members.iter().map(|m| m.verifying_key()).collect(), t)
            .unwrap();
        Setup { members, keys }
    }

    const DIGEST: [u8; 32] = [9u8; 32];

    #[test]
    fn test_threshold_met() {
        let s = setup(5, 3);
        let word = encode_word(1000);
        let proof = DecryptionProof::new(
            s.members[..3].iter().map(|m| m.attest(&DIGEST, &word)).collect(),
        );
        assert!(verify_decryption(&s.keys, &DIGEST, &word, &proof));
    }

    #[test]
    fn test_threshold_not_met() {
        let s = setup(5, 3);
        let word = encode_word(1000);
        let proof = DecryptionProof::new(
            s.members[..2].iter().map(|m| m.attest(&DIGEST, &word)).collect(),
        );
        assert!(!verify_decryption(&s.keys, &DIGEST, &word, &proof));
    }

    #[test]
    fn test_repeated_member_counts_once() {
        let s = setup(3, 2);
        let word = encode_word(1);
        let one = s.members[0].attest(&DIGEST, &word);
        let proof = DecryptionProof::new(vec![one.clone(), one]);
        assert!(!verify_decryption(&s.keys, &DIGEST, &word, &proof));
    }

    #[test]
    fn test_unknown_member_ignored() {
        let s = setup(2, 2);
        let word = encode_word(1);
        let outsider = CommitteeMember::generate(1);
        let proof = DecryptionProof::new(vec![
            s.members[0].attest(&DIGEST, &word),
            outsider.attest(&DIGEST, &word),
        ]);
        assert!(!verify_decryption(&s.keys, &DIGEST, &word, &proof));

        let out_of_range = CommitteeMember::generate(7);
        let proof = DecryptionProof::new(vec![
            s.members[0].attest(&DIGEST, &word),
            out_of_range.attest(&DIGEST, &word),
        ]);
        assert!(!verify_decryption(&s.keys, &DIGEST, &word, &proof));
    }

    #[test]
    fn test_proof_bound_to_word_and_digest() {
        let s = setup(1, 1);
        let word = encode_word(1000);
        let proof = DecryptionProof::new(vec![s.members[0].attest(&DIGEST, &word)]);

        assert!(!verify_decryption(&s.keys, &DIGEST, &encode_word(1001), &proof));
        assert!(!verify_decryption(&s.keys, &[8u8; 32], &word, &proof));
    }

    #[test]
    fn test_empty_proof_rejected() {
        let s = setup(1, 1);
        assert!(!verify_decryption(
            &s.keys,
            &DIGEST,
            &encode_word(0),
            &DecryptionProof::default()
        ));
    }

    #[test]
    fn test_proof_serde_roundtrip() {
        let s = setup(2, 2);
        let word = encode_word(5);
        let proof = DecryptionProof::new(s.members.iter().map(|m| m.attest(&DIGEST, &word)).collect());
        let json = serde_json::to_string(&proof).unwrap();
        let back: DecryptionProof = serde_json::from_str(&json).unwrap();
        assert_eq!(back, proof);
        assert!(verify_decryption(&s.keys, &DIGEST, &word, &back));
    }
}

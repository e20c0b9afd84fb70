//! Admission context: who is submitting a ciphertext, and to which ledger

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{FheError, FheResult};

/// A 32-byte principal identifier (caller identity)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Principal([u8; 32]);

impl Principal {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive a principal from a human-readable name
    pub fn from_name(name: &str) -> Self {
        Self(blake3::derive_key("umbra principal v1", name.as_bytes()))
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Principal {
    type Err = FheError;

    fn from_str(s: &str) -> FheResult<Self> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| FheError::Serialization(format!("principal hex: {}", e)))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| FheError::Serialization("principal must be 32 bytes".into()))?;
        Ok(Self(arr))
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Binding for an admission proof: the submitting caller plus the target
/// ledger context. A proof minted for one context does not admit the same
/// ciphertext into another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AdmissionContext {
    /// Caller submitting the ciphertext
    pub caller: Principal,
    /// Identifier of the ledger instance receiving it
    pub context_id: [u8; 32],
}

impl AdmissionContext {
    pub fn new(caller: Principal, context_id: [u8; 32]) -> Self {
        Self { caller, context_id }
    }
}

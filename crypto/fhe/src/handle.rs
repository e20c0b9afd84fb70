//! Ciphertext handles
//!
//! A [`Handle`] is a capability token: an index into the ciphertext store
//! owned by a backend. It carries no ciphertext bytes and no plaintext, and
//! it is intentionally not serializable.

use std::fmt;

/// Opaque reference to a ciphertext held by a homomorphic backend
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// Wrap a raw store index. Only meaningful to the backend that issued it.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw store index
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ct#{}", self.0)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ct#{}", self.0)
    }
}

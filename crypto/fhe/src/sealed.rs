//! In-process coprocessor backend
//!
//! Ciphertexts are machine words sealed with ChaCha20-Poly1305 under a
//! [`SealingKey`]. The backend holds the key so it can evaluate operations,
//! but plaintexts never cross its API: callers only ever receive handles or
//! sealed bytes. The same key is the decryption capability handed to the
//! committee oracle.
//!
//! Wire format of a sealed word:
//!
//! ```text
//! width (1) || nonce (12) || ChaCha20-Poly1305(word as u64 LE, aad = width)
//! ```

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::backend::{HomomorphicBackend, ADMITTED_WIDTH, COMPUTE_WIDTH};
use crate::context::AdmissionContext;
use crate::handle::Handle;
use crate::proof::{AdmissionAuthority, AdmissionProof};
use crate::store::CiphertextStore;
use crate::{FheError, FheResult};

/// Nonce size for ChaCha20-Poly1305
const NONCE_SIZE: usize = 12;

/// Poly1305 tag size
const TAG_SIZE: usize = 16;

/// Total size of a sealed word
pub const SEALED_SIZE: usize = 1 + NONCE_SIZE + 8 + TAG_SIZE;

/// Symmetric key sealing ciphertext words
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SealingKey {
    key: [u8; 32],
}

impl SealingKey {
    /// Generate a fresh key
    pub fn generate() -> Self {
        let mut rng = ChaCha20Rng::from_entropy();
        let mut key = [0u8; 32];
        rng.fill_bytes(&mut key);
        Self { key }
    }

    pub fn from_bytes(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Encrypt a 32-bit amount for admission
    pub fn encrypt_u32(&self, value: u32) -> FheResult<Vec<u8>> {
        self.seal(ADMITTED_WIDTH, u64::from(value))
    }

    /// Seal a word at the given width
    pub fn seal(&self, width: u8, value: u64) -> FheResult<Vec<u8>> {
        if width < 64 && value >> width != 0 {
            return Err(FheError::OperationFailed(format!(
                "value does not fit in {} bits",
                width
            )));
        }

        let mut nonce = [0u8; NONCE_SIZE];
        ChaCha20Rng::from_entropy().fill_bytes(&mut nonce);

        let sealed = self
            .cipher()
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &value.to_le_bytes(),
                    aad: &[width],
                },
            )
            .map_err(|_| FheError::OperationFailed("sealing failed".into()))?;

        let mut bytes = Vec::with_capacity(SEALED_SIZE);
        bytes.push(width);
        bytes.extend_from_slice(&nonce);
        bytes.extend_from_slice(&sealed);
        Ok(bytes)
    }

    /// Open a sealed word, returning `(width, value)`
    pub fn open(&self, bytes: &[u8]) -> FheResult<(u8, u64)> {
        if bytes.len() != SEALED_SIZE {
            return Err(FheError::InvalidCiphertext(format!(
                "expected {} bytes, got {}",
                SEALED_SIZE,
                bytes.len()
            )));
        }

        let width = bytes[0];
        let nonce = &bytes[1..1 + NONCE_SIZE];
        let plaintext = self
            .cipher()
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: &bytes[1 + NONCE_SIZE..],
                    aad: &[width],
                },
            )
            .map_err(|_| FheError::InvalidCiphertext("authentication failed".into()))?;

        let word: [u8; 8] = plaintext
            .as_slice()
            .try_into()
            .map_err(|_| FheError::InvalidCiphertext("bad word length".into()))?;
        let value = u64::from_le_bytes(word);

        if width != ADMITTED_WIDTH && width != COMPUTE_WIDTH {
            return Err(FheError::InvalidCiphertext(format!("unsupported width {}", width)));
        }
        if width == ADMITTED_WIDTH && value > u64::from(u32::MAX) {
            return Err(FheError::InvalidCiphertext("value exceeds declared width".into()));
        }

        Ok((width, value))
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.key))
    }
}

impl std::fmt::Debug for SealingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealingKey").finish_non_exhaustive()
    }
}

/// Coprocessor backend over sealed words
pub struct SealedBackend {
    key: SealingKey,
    authority: AdmissionAuthority,
    store: CiphertextStore<Vec<u8>>,
}

impl SealedBackend {
    /// Create a backend. `authority` must be the gateway key that issues
    /// admission proofs for this deployment.
    pub fn new(key: SealingKey, authority: AdmissionAuthority) -> Self {
        Self {
            key,
            authority,
            store: CiphertextStore::new(),
        }
    }

    /// Number of ciphertexts held
    pub fn ciphertext_count(&self) -> usize {
        self.store.len()
    }

    fn value(&self, handle: Handle) -> FheResult<u64> {
        let sealed = self.store.get(handle)?;
        self.key.open(&sealed).map(|(_, value)| value)
    }

    fn computed(&self, value: u64) -> FheResult<Handle> {
        let sealed = self.key.seal(COMPUTE_WIDTH, value)?;
        Ok(self.store.insert(sealed, false))
    }

    fn binary(&self, a: Handle, b: Handle, op: impl FnOnce(u64, u64) -> u64) -> FheResult<Handle> {
        let lhs = self.value(a)?;
        let rhs = self.value(b)?;
        self.computed(op(lhs, rhs))
    }
}

impl HomomorphicBackend for SealedBackend {
    fn admit(
        &self,
        raw_ciphertext: &[u8],
        proof: &AdmissionProof,
        context: &AdmissionContext,
    ) -> FheResult<Handle> {
        if !self.authority.check(raw_ciphertext, context, proof) {
            warn!(caller = ?context.caller, "admission proof rejected");
            return Err(FheError::InvalidProof("proof does not match ciphertext and context".into()));
        }

        let (width, _) = self.key.open(raw_ciphertext)?;
        if width != ADMITTED_WIDTH {
            return Err(FheError::WidthMismatch {
                expected: ADMITTED_WIDTH,
                actual: width,
            });
        }

        let handle = self.store.insert(raw_ciphertext.to_vec(), true);
        debug!(%handle, "ciphertext admitted");
        Ok(handle)
    }

    fn is_publicly_decryptable(&self, handle: Handle) -> FheResult<bool> {
        self.store.is_publicly_decryptable(handle)
    }

    fn trivial(&self, value: u64) -> FheResult<Handle> {
        self.computed(value)
    }

    fn add(&self, a: Handle, b: Handle) -> FheResult<Handle> {
        self.binary(a, b, u64::wrapping_add)
    }

    fn sub(&self, a: Handle, b: Handle) -> FheResult<Handle> {
        self.binary(a, b, u64::wrapping_sub)
    }

    fn mul(&self, a: Handle, b: Handle) -> FheResult<Handle> {
        self.binary(a, b, u64::wrapping_mul)
    }

    fn div(&self, a: Handle, b: Handle) -> FheResult<Handle> {
        self.binary(a, b, |lhs, rhs| lhs.checked_div(rhs).unwrap_or(u64::MAX))
    }

    fn mul_scalar(&self, a: Handle, scalar: u64) -> FheResult<Handle> {
        let value = self.value(a)?;
        self.computed(value.wrapping_mul(scalar))
    }

    fn div_scalar(&self, a: Handle, divisor: u64) -> FheResult<Handle> {
        if divisor == 0 {
            return Err(FheError::OperationFailed("scalar division by zero".into()));
        }
        let value = self.value(a)?;
        self.computed(value / divisor)
    }

    fn export(&self, handle: Handle) -> FheResult<Vec<u8>> {
        self.store.get(handle)
    }
}

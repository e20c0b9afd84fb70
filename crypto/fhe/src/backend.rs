//! The homomorphic-encryption capability consumed by the ledger
//!
//! The ledger never sees plaintext amounts. It hands opaque [`Handle`]s to a
//! backend and receives new handles back. All arithmetic is over 64-bit
//! unsigned ciphertexts with wrapping `add`/`sub`/`mul`; dividing by an
//! encrypted zero yields `u64::MAX`, as TFHE integer division does.

use crate::context::AdmissionContext;
use crate::handle::Handle;
use crate::proof::AdmissionProof;
use crate::FheResult;

/// Width in bits of externally admitted ciphertexts
pub const ADMITTED_WIDTH: u8 = 32;

/// Width in bits of computed ciphertexts
pub const COMPUTE_WIDTH: u8 = 64;

/// Homomorphic backend contract
pub trait HomomorphicBackend: Send + Sync {
    /// Validate an externally supplied ciphertext and its admission proof,
    /// store it, and grant it public decryption.
    ///
    /// Every call issues a new handle, even for identical input.
    fn admit(
        &self,
        raw_ciphertext: &[u8],
        proof: &AdmissionProof,
        context: &AdmissionContext,
    ) -> FheResult<Handle>;

    /// Whether the decryption committee may open this handle
    fn is_publicly_decryptable(&self, handle: Handle) -> FheResult<bool>;

    /// Trivially encrypt a public constant
    fn trivial(&self, value: u64) -> FheResult<Handle>;

    fn add(&self, a: Handle, b: Handle) -> FheResult<Handle>;

    fn sub(&self, a: Handle, b: Handle) -> FheResult<Handle>;

    fn mul(&self, a: Handle, b: Handle) -> FheResult<Handle>;

    /// Encrypted division, truncating
    fn div(&self, a: Handle, b: Handle) -> FheResult<Handle>;

    fn mul_scalar(&self, a: Handle, scalar: u64) -> FheResult<Handle>;

    /// Division by a public divisor. A zero divisor is an error.
    fn div_scalar(&self, a: Handle, divisor: u64) -> FheResult<Handle>;

    /// Serialized ciphertext behind a handle. The bytes stay encrypted.
    fn export(&self, handle: Handle) -> FheResult<Vec<u8>>;

    /// Content digest binding decryption proofs to a specific ciphertext
    fn digest(&self, handle: Handle) -> FheResult<[u8; 32]> {
        Ok(*blake3::hash(&self.export(handle)?).as_bytes())
    }

    /// Whether the backend can serve requests
    fn is_ready(&self) -> bool {
        true
    }
}

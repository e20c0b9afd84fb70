//! TFHE-rs backend
//!
//! Production homomorphic backend over `tfhe::FheUint64`. Admitted inputs
//! are bincode-encoded `FheUint32` ciphertexts which are widened on
//! admission. TFHE-rs keeps the server key in thread-local state, so every
//! operation installs it before evaluating.

use tfhe::prelude::*;
use tfhe::{
    generate_keys, set_server_key, ClientKey, ConfigBuilder, FheUint32, FheUint64, ServerKey,
};
use tracing::{debug, warn};

use crate::backend::HomomorphicBackend;
use crate::context::AdmissionContext;
use crate::handle::Handle;
use crate::proof::{AdmissionAuthority, AdmissionProof};
use crate::store::CiphertextStore;
use crate::{FheError, FheResult};

/// Client side of the TFHE backend: encrypts amounts, decrypts exports.
/// Held by record owners and by the decryption committee.
#[derive(Clone)]
pub struct TfheClient {
    client_key: ClientKey,
}

impl TfheClient {
    /// Generate a client key and the matching server key
    pub fn generate() -> (Self, ServerKey) {
        let config = ConfigBuilder::default().build();
        let (client_key, server_key) = generate_keys(config);
        (Self { client_key }, server_key)
    }

    /// Encrypt a 32-bit amount into the admission wire format
    pub fn encrypt_u32(&self, value: u32) -> FheResult<Vec<u8>> {
        let ciphertext = FheUint32::encrypt(value, &self.client_key);
        bincode::serialize(&ciphertext).map_err(|e| FheError::Serialization(e.to_string()))
    }

    /// Decrypt bytes produced by [`HomomorphicBackend::export`]
    pub fn decrypt_export(&self, bytes: &[u8]) -> FheResult<u64> {
        let ciphertext: FheUint64 = bincode::deserialize(bytes)
            .map_err(|e| FheError::InvalidCiphertext(e.to_string()))?;
        Ok(ciphertext.decrypt(&self.client_key))
    }
}

impl std::fmt::Debug for TfheClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfheClient").finish_non_exhaustive()
    }
}

/// Homomorphic backend evaluating with a TFHE server key
pub struct TfheBackend {
    server_key: ServerKey,
    authority: AdmissionAuthority,
    store: CiphertextStore<FheUint64>,
}

impl TfheBackend {
    pub fn new(server_key: ServerKey, authority: AdmissionAuthority) -> Self {
        Self {
            server_key,
            authority,
            store: CiphertextStore::new(),
        }
    }

    fn install_key(&self) {
        set_server_key(self.server_key.clone());
    }

    fn binary(
        &self,
        a: Handle,
        b: Handle,
        op: impl FnOnce(&FheUint64, &FheUint64) -> FheUint64,
    ) -> FheResult<Handle> {
        let lhs = self.store.get(a)?;
        let rhs = self.store.get(b)?;
        self.install_key();
        Ok(self.store.insert(op(&lhs, &rhs), false))
    }
}

impl HomomorphicBackend for TfheBackend {
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

        let narrow: FheUint32 = bincode::deserialize(raw_ciphertext)
            .map_err(|e| FheError::InvalidCiphertext(e.to_string()))?;

        self.install_key();
        let handle = self.store.insert(FheUint64::cast_from(narrow), true);
        debug!(%handle, "ciphertext admitted");
        Ok(handle)
    }

    fn is_publicly_decryptable(&self, handle: Handle) -> FheResult<bool> {
        self.store.is_publicly_decryptable(handle)
    }

    fn trivial(&self, value: u64) -> FheResult<Handle> {
        Ok(self.store.insert(FheUint64::encrypt_trivial(value), false))
    }

    fn add(&self, a: Handle, b: Handle) -> FheResult<Handle> {
        self.binary(a, b, |lhs, rhs| lhs + rhs)
    }

    fn sub(&self, a: Handle, b: Handle) -> FheResult<Handle> {
        self.binary(a, b, |lhs, rhs| lhs - rhs)
    }

    fn mul(&self, a: Handle, b: Handle) -> FheResult<Handle> {
        self.binary(a, b, |lhs, rhs| lhs * rhs)
    }

    fn div(&self, a: Handle, b: Handle) -> FheResult<Handle> {
        self.binary(a, b, |lhs, rhs| lhs / rhs)
    }

    fn mul_scalar(&self, a: Handle, scalar: u64) -> FheResult<Handle> {
        let value = self.store.get(a)?;
        self.install_key();
        Ok(self.store.insert(&value * scalar, false))
    }

    fn div_scalar(&self, a: Handle, divisor: u64) -> FheResult<Handle> {
        if divisor == 0 {
            return Err(FheError::OperationFailed("scalar division by zero".into()));
        }
        let value = self.store.get(a)?;
        self.install_key();
        Ok(self.store.insert(&value / divisor, false))
    }

    fn export(&self, handle: Handle) -> FheResult<Vec<u8>> {
        let value = self.store.get(handle)?;
        bincode::serialize(&value).map_err(|e| FheError::Serialization(e.to_string()))
    }
}

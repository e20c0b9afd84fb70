//! Debt ledger facade
//!
//! Ties admission, the registry, verified decryption and amortization
//! together behind the caller-facing operations, and emits the one-shot
//! notifications for record creation and disclosure.

use std::sync::Arc;

use tracing::{debug, info, instrument};
use umbra_committee::{CommitteeKeys, DecryptionProof};
use umbra_fhe::{AdmissionContext, AdmissionProof, Handle, HomomorphicBackend, Principal};

use crate::amortization::{AmortizationEngine, FixedPointTerms};
use crate::clock::{Clock, SystemClock};
use crate::config::LedgerConfig;
use crate::events::{EventBus, EventReceiver, LedgerEvent};
use crate::ingress::CiphertextIngress;
use crate::record::RecordView;
use crate::registry::DebtRecordRegistry;
use crate::verifier::DecryptionVerifier;
use crate::{LedgerError, LedgerResult};

/// Encrypted debt ledger over a homomorphic backend
pub struct DebtLedger<B: ?Sized> {
    config: LedgerConfig,
    context_id: [u8; 32],
    backend: Arc<B>,
    registry: DebtRecordRegistry,
    ingress: CiphertextIngress<B>,
    verifier: DecryptionVerifier<B>,
    engine: AmortizationEngine<B>,
    events: EventBus,
    clock: Box<dyn Clock>,
}

impl<B: HomomorphicBackend + ?Sized> DebtLedger<B> {
    pub fn new(config: LedgerConfig, backend: Arc<B>, committee: CommitteeKeys) -> Self {
        info!(
            context = %config.context_label,
            committee = ?committee,
            "debt ledger initialized"
        );
        Self {
            context_id: config.context_id(),
            events: EventBus::new(config.event_capacity),
            registry: DebtRecordRegistry::new(),
            ingress: CiphertextIngress::new(backend.clone()),
            verifier: DecryptionVerifier::new(backend.clone(), committee),
            engine: AmortizationEngine::new(backend.clone()),
            clock: Box::new(SystemClock),
            backend,
            config,
        }
    }

    /// Replace the creation-time source
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn committee(&self) -> &CommitteeKeys {
        self.verifier.committee()
    }

    /// Context a ciphertext from `caller` must be bound to for admission
    pub fn admission_context(&self, caller: Principal) -> AdmissionContext {
        AdmissionContext::new(caller, self.context_id)
    }

    /// Admit `raw_ciphertext` and register it as debt `id` owned by `caller`.
    ///
    /// Nothing is registered or announced unless every check passes.
    #[instrument(skip(self, caller, raw_ciphertext, proof), fields(caller = %caller))]
    pub fn create_record(
        &self,
        caller: Principal,
        id: &str,
        raw_ciphertext: &[u8],
        proof: &AdmissionProof,
        interest_rate_annual: u32,
        term_months: u32,
    ) -> LedgerResult<()> {
        self.check_terms(interest_rate_annual, term_months)?;

        if self.registry.contains(id) {
            return Err(LedgerError::DuplicateRecord(id.to_string()));
        }

        let context = self.admission_context(caller);
        let handle = self.ingress.admit(raw_ciphertext, proof, &context)?;

        // published before the record becomes readable, so its
        // AmountDisclosed can never precede it
        self.registry.create_then(
            id,
            handle,
            interest_rate_annual,
            term_months,
            caller,
            self.clock.now(),
            |record| {
                self.events.publish(LedgerEvent::RecordCreated {
                    id: record.id().to_string(),
                    owner: record.owner(),
                });
            },
        )?;

        info!(id, %handle, "record created");
        Ok(())
    }

    /// Commit the committee's disclosure of record `id`'s amount
    #[instrument(skip(self, clear_value, proof))]
    pub fn verify_amount(
        &self,
        id: &str,
        clear_value: &[u8],
        proof: &DecryptionProof,
    ) -> LedgerResult<()> {
        let amount = self.verifier.verify(&self.registry, id, clear_value, proof)?;
        self.events.publish(LedgerEvent::AmountDisclosed {
            id: id.to_string(),
            clear_value: amount,
        });
        Ok(())
    }

    /// Encrypted monthly payment for record `id`
    pub fn monthly_payment(&self, id: &str) -> LedgerResult<Handle> {
        let record = self.registry.get(id)?;
        self.engine.monthly_payment(&record)
    }

    pub fn get_record(&self, id: &str) -> LedgerResult<RecordView> {
        Ok(RecordView::from(&self.registry.get(id)?))
    }

    /// Handle of record `id`'s encrypted amount, for the committee to open
    pub fn encrypted_amount(&self, id: &str) -> LedgerResult<Handle> {
        Ok(self.registry.get(id)?.encrypted_amount())
    }

    /// Ids in creation order
    pub fn list_ids(&self) -> Vec<String> {
        self.registry.list_ids()
    }

    pub fn record_count(&self) -> usize {
        self.registry.len()
    }

    /// Whether the ledger can serve requests
    pub fn is_available(&self) -> bool {
        self.backend.is_ready()
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    fn check_terms(&self, interest_rate_annual: u32, term_months: u32) -> LedgerResult<()> {
        if term_months == 0 {
            return Err(LedgerError::InvalidTerms("term must be at least one month".into()));
        }
        if term_months > self.config.max_term_months {
            return Err(LedgerError::InvalidTerms(format!(
                "term of {} months exceeds maximum of {}",
                term_months, self.config.max_term_months
            )));
        }
        let terms = FixedPointTerms::derive(interest_rate_annual, term_months)?;
        debug!(rate_fixed = terms.rate_fixed, term_fixed = terms.term_fixed, "terms accepted");
        Ok(())
    }
}

impl<B: ?Sized> std::fmt::Debug for DebtLedger<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebtLedger")
            .field("context", &self.config.context_label)
            .field("records", &self.registry.len())
            .finish()
    }
}

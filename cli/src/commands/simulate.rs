//! Simulate Command - run the two-phase disclosure protocol in-process

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::info;
use umbra_committee::Committee;
use umbra_fhe::{AdmissionAuthority, HomomorphicBackend, Principal, SealedBackend, SealingKey};
use umbra_ledger::{DebtLedger, LedgerEvent, RecordView};

use crate::config::{CommitteeSeeds, UmbraConfig};

/// Create a record, compute its payment and disclose its amount
#[derive(Args)]
pub struct SimulateCommand {
    /// Record id
    #[arg(long)]
    id: String,

    /// Debt amount, encrypted before it reaches the ledger
    #[arg(long)]
    amount: u32,

    /// Annual interest rate
    #[arg(long)]
    rate: u32,

    /// Term in months
    #[arg(long)]
    term: u32,

    /// Name the owner principal is derived from
    #[arg(long, default_value = "alice")]
    owner: String,
}

/// Outcome printed as JSON
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub record: RecordView,
    /// Decrypted by the owner's key; never disclosed through the ledger
    pub monthly_payment: u64,
    pub events: Vec<LedgerEvent>,
}

impl SimulateCommand {
    pub fn execute(self, config: &UmbraConfig) -> anyhow::Result<()> {
        let report = self.run(config)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }

    fn run(&self, config: &UmbraConfig) -> anyhow::Result<SimulationReport> {
        let key = SealingKey::generate();
        let authority = AdmissionAuthority::generate();
        let backend = Arc::new(SealedBackend::new(key.clone(), authority.clone()));
        let committee = load_committee(config, key.clone())?;

        let ledger = DebtLedger::new(config.ledger.clone(), backend.clone(), committee.keys());
        let mut events = ledger.subscribe();
        let owner = Principal::from_name(&self.owner);

        // Phase one: the owner encrypts and the ledger admits
        let raw = key.encrypt_u32(self.amount)?;
        let proof = authority.issue(&raw, &ledger.admission_context(owner));
        ledger.create_record(owner, &self.id, &raw, &proof, self.rate, self.term)?;

        let payment = ledger.monthly_payment(&self.id)?;
        let (_, monthly_payment) = key.open(&backend.export(payment)?)?;

        // Phase two: the committee opens the admitted ciphertext off-ledger
        let handle = ledger.encrypted_amount(&self.id)?;
        let disclosure = committee
            .disclose(backend.as_ref(), handle)
            .context("committee disclosure failed")?;
        ledger.verify_amount(&self.id, &disclosure.word, &disclosure.proof)?;

        info!(id = %self.id, "simulation complete");

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }

        Ok(SimulationReport {
            record: ledger.get_record(&self.id)?,
            monthly_payment,
            events: seen,
        })
    }
}

/// Committee from the configured seed file, or a fresh one of the
/// configured size
fn load_committee(config: &UmbraConfig, key: SealingKey) -> anyhow::Result<Committee> {
    let settings = &config.committee;
    let committee = match &settings.seeds_file {
        Some(path) => {
            let seeds = CommitteeSeeds::load(path)
                .with_context(|| format!("loading committee seeds from {}", path.display()))?;
            Committee::from_members(seeds.members()?, seeds.threshold, key)?
        }
        None => Committee::generate(settings.size, settings.threshold, key)?,
    };

    if let Some(expected) = &settings.keys {
        if committee.keys() != *expected {
            anyhow::bail!("committee seeds do not match the configured keys");
        }
    }
    Ok(committee)
}

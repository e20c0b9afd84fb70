//! Debt records

use serde::{Deserialize, Serialize};
use umbra_fhe::{Handle, Principal};

use crate::{LedgerError, LedgerResult};

/// A debt whose amount stays encrypted until the committee discloses it.
///
/// All fields except the disclosure are fixed at construction and have no
/// setters. `decrypted_amount` doubles as the verified flag, so the two can
/// never be observed out of step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebtRecord {
    id: String,
    encrypted_amount: Handle,
    interest_rate_annual: u32,
    term_months: u32,
    owner: Principal,
    created_at: u64,
    decrypted_amount: Option<u32>,
}

impl DebtRecord {
    pub(crate) fn new(
        id: String,
        encrypted_amount: Handle,
        interest_rate_annual: u32,
        term_months: u32,
        owner: Principal,
        created_at: u64,
    ) -> Self {
        Self {
            id,
            encrypted_amount,
            interest_rate_annual,
            term_months,
            owner,
            created_at,
            decrypted_amount: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn encrypted_amount(&self) -> Handle {
        self.encrypted_amount
    }

    pub fn interest_rate_annual(&self) -> u32 {
        self.interest_rate_annual
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    pub fn owner(&self) -> Principal {
        self.owner
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn verified(&self) -> bool {
        self.decrypted_amount.is_some()
    }

    pub fn decrypted_amount(&self) -> Option<u32> {
        self.decrypted_amount
    }

    /// The single state transition: sealed -> disclosed
    pub(crate) fn disclose(&mut self, amount: u32) -> LedgerResult<()> {
        if self.verified() {
            return Err(LedgerError::AlreadyVerified(self.id.clone()));
        }
        self.decrypted_amount = Some(amount);
        Ok(())
    }
}

/// Public view of a record, as returned by `getRecord`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordView {
    pub id: String,
    pub interest_rate_annual: u32,
    pub term_months: u32,
    pub owner: Principal,
    pub created_at: u64,
    pub verified: bool,
    pub decrypted_amount: Option<u32>,
}

impl From<&DebtRecord> for RecordView {
    fn from(record: &DebtRecord) -> Self {
        Self {
            id: record.id.clone(),
            interest_rate_annual: record.interest_rate_annual,
            term_months: record.term_months,
            owner: record.owner,
            created_at: record.created_at,
            verified: record.verified(),
            decrypted_amount: record.decrypted_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DebtRecord {
        DebtRecord::new(
            "d1".into(),
            Handle::new(0),
            12,
            24,
            Principal::from_name("alice"),
            1_700_000_000,
        )
    }

    #[test]
    fn test_new_record_is_sealed() {
        let r = record();
        assert!(!r.verified());
        assert_eq!(r.decrypted_amount(), None);
    }

    #[test]
    fn test_disclose_once() {
        let mut r = record();
        r.disclose(1000).unwrap();
        assert!(r.verified());
        assert_eq!(r.decrypted_amount(), Some(1000));

        assert_eq!(r.disclose(5), Err(LedgerError::AlreadyVerified("d1".into())));
        assert_eq!(r.decrypted_amount(), Some(1000));
    }

    #[test]
    fn test_view_omits_handle() {
        let view = RecordView::from(&record());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("encrypted_amount").is_none());
        assert_eq!(json["term_months"], 24);
        assert_eq!(json["verified"], false);
        assert!(json["decrypted_amount"].is_null());
    }
}

//! Ledger settings

use serde::{Deserialize, Serialize};

/// Default longest accepted term, 100 years
pub const DEFAULT_MAX_TERM_MONTHS: u32 = 1200;

/// Tunables of a [`DebtLedger`](crate::DebtLedger)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Names this ledger instance. Admission proofs are bound to the
    /// context id derived from it, so proofs do not carry across ledgers.
    pub context_label: String,
    /// Buffered events per subscriber
    pub event_capacity: usize,
    /// Longest term accepted by `create_record`
    pub max_term_months: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            context_label: "umbra-ledger".into(),
            event_capacity: 1024,
            max_term_months: DEFAULT_MAX_TERM_MONTHS,
        }
    }
}

impl LedgerConfig {
    pub fn with_context_label(mut self, label: impl Into<String>) -> Self {
        self.context_label = label.into();
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn with_max_term_months(mut self, months: u32) -> Self {
        self.max_term_months = months;
        self
    }

    /// 32-byte context id admission proofs are bound to
    pub fn context_id(&self) -> [u8; 32] {
        blake3::derive_key("umbra ledger context v1", self.context_label.as_bytes())
    }
}

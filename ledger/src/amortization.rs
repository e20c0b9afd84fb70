//! Homomorphic loan amortization
//!
//! Computes the encrypted monthly payment of a record
//!
//! ```text
//! payment = P * r / (1 - (1 + r)^-n)
//! ```
//!
//! in fixed point with [`SCALE`] = 1000, without ever opening `P`.
//!
//! Rate and term are public, so the whole denominator is evaluated over
//! public constants and only the principal is touched homomorphically.
//! No negative exponent is formed; the positive power is inverted by
//! division instead:
//!
//! ```text
//! power       = (SCALE + rate_fixed)^n            fixed-point square-and-multiply
//! reciprocal  = SCALE^2 / power
//! denominator = SCALE - reciprocal
//! payment     = enc(P) * rate_fixed / denominator  two ciphertext operations
//! ```
//!
//! `n` is the integral part of `term_fixed / SCALE`, i.e. the term in
//! months. A zero rate degenerates to straight-line repayment `P / n`.
//! The power saturates at [`POWER_CAP`]: past `SCALE^2` the reciprocal
//! truncates to zero, so every longer term yields the same denominator
//! and no term within the fixed-point range can overflow.

use std::sync::Arc;

use tracing::debug;
use umbra_fhe::{Handle, HomomorphicBackend};

use crate::record::DebtRecord;
use crate::{LedgerError, LedgerResult};

/// Fixed-point scale for rates and terms
pub const SCALE: u64 = 1000;

/// Saturation point of [`fixed_power`], the first value whose fixed-point
/// reciprocal is zero
pub const POWER_CAP: u64 = SCALE * SCALE + 1;

const MONTHS_PER_YEAR: u64 = 12;

/// Rate and term in fixed point
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedPointTerms {
    /// round(annual_rate / 12 * SCALE), half-up
    pub rate_fixed: u32,
    /// term_months * SCALE
    pub term_fixed: u32,
}

impl FixedPointTerms {
    pub fn derive(interest_rate_annual: u32, term_months: u32) -> LedgerResult<Self> {
        let rate_scaled = u64::from(interest_rate_annual) * SCALE;
        let rate_fixed = (rate_scaled + MONTHS_PER_YEAR / 2) / MONTHS_PER_YEAR;
        let rate_fixed = u32::try_from(rate_fixed).map_err(|_| {
            LedgerError::NumericOverflow(format!(
                "rate {} does not fit fixed point",
                interest_rate_annual
            ))
        })?;

        let term_fixed = u32::try_from(u64::from(term_months) * SCALE).map_err(|_| {
            LedgerError::NumericOverflow(format!("term {} does not fit fixed point", term_months))
        })?;

        Ok(Self { rate_fixed, term_fixed })
    }

    /// Number of compounding periods
    pub fn periods(&self) -> u32 {
        (u64::from(self.term_fixed) / SCALE) as u32
    }

    /// One period's growth factor, `SCALE + rate_fixed`
    pub fn growth(&self) -> u64 {
        SCALE + u64::from(self.rate_fixed)
    }

    /// Fixed-point amortization denominator `SCALE - SCALE^2 / power`.
    ///
    /// In `1..=SCALE` whenever the rate and the period count are nonzero.
    pub fn denominator(&self) -> u64 {
        SCALE - (SCALE * SCALE) / fixed_power(self.growth(), self.periods())
    }
}

/// `(growth / SCALE)^periods * SCALE` by fixed-point square-and-multiply,
/// saturating at [`POWER_CAP`].
///
/// Below the cap the result equals the unbounded evaluation. Every factor
/// is at least `SCALE`, so once a partial product or the running square
/// passes `SCALE^2` the final power does too.
pub fn fixed_power(growth: u64, periods: u32) -> u64 {
    let fixed_mul = |a: u64, b: u64| (a.saturating_mul(b) / SCALE).min(POWER_CAP);

    let mut acc = SCALE;
    let mut base = growth.min(POWER_CAP);
    let mut exp = periods;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = fixed_mul(acc, base);
        }
        exp >>= 1;
        if exp > 0 {
            base = fixed_mul(base, base);
        }
    }
    acc
}

/// Plaintext evaluation of the payment formula, for owners who know their
/// principal and want to check a disclosed payment.
pub fn plaintext_payment(principal: u32, terms: FixedPointTerms) -> LedgerResult<u64> {
    let periods = terms.periods();
    if periods == 0 {
        return Err(LedgerError::InvalidTerms("term must be at least one month".into()));
    }
    if terms.rate_fixed == 0 {
        return Ok(u64::from(principal) / u64::from(periods));
    }
    let numerator = u64::from(principal) * u64::from(terms.rate_fixed);
    Ok(numerator / terms.denominator())
}

/// Computes encrypted monthly payments
pub struct AmortizationEngine<B: ?Sized> {
    backend: Arc<B>,
}

impl<B: HomomorphicBackend + ?Sized> AmortizationEngine<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Encrypted monthly payment for `record`. Read-only with respect to
    /// the record; the result is a fresh handle that is not publicly
    /// decryptable. Each call stores at most two ciphertexts.
    pub fn monthly_payment(&self, record: &DebtRecord) -> LedgerResult<Handle> {
        let terms = FixedPointTerms::derive(record.interest_rate_annual(), record.term_months())?;
        let periods = terms.periods();
        if periods == 0 {
            return Err(LedgerError::InvalidTerms("term must be at least one month".into()));
        }

        let principal = record.encrypted_amount();
        if terms.rate_fixed == 0 {
            return Ok(self.backend.div_scalar(principal, u64::from(periods))?);
        }

        // principal < 2^32 and rate_fixed < 2^32, so the product fits 64 bits
        let numerator = self.backend.mul_scalar(principal, u64::from(terms.rate_fixed))?;
        let denominator = terms.denominator();
        let payment = self.backend.div_scalar(numerator, denominator)?;

        debug!(id = record.id(), %payment, periods, denominator, "monthly payment computed");
        Ok(payment)
    }
}

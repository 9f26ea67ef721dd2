//! Loan pricing.

use rust_decimal::Decimal;
use tenor_core::error::{TenorError, TenorResult};
use tenor_core::models::customer_limit::CustomerLimit;

use crate::MONEY_SCALE;
use crate::fees::FeeRates;

/// Priced loan before it is booked.
///
/// `total = otr + total_interest + admin_fee`. The admin fee is a flat
/// amount while the interest rate is a percentage of `otr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanQuote {
    pub otr: Decimal,
    pub admin_fee: Decimal,
    pub total_interest: Decimal,
    pub total: Decimal,
    pub term: u32,
    pub installment_amount: Decimal,
}

impl LoanQuote {
    pub fn price(otr: Decimal, term: u32, fees: &FeeRates) -> TenorResult<Self> {
        if otr <= Decimal::ZERO {
            return Err(TenorError::validation("otr must be greater than zero"));
        }
        if term == 0 {
            return Err(TenorError::validation("term must be at least one month"));
        }

        let out_of_range = || TenorError::validation("otr is out of range");
        let total_interest = otr
            .checked_mul(fees.interest_rate)
            .ok_or_else(out_of_range)?
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or_else(out_of_range)?
            .round_dp(MONEY_SCALE);
        let total = otr
            .checked_add(total_interest)
            .and_then(|sum| sum.checked_add(fees.admin_fee))
            .ok_or_else(out_of_range)?;
        let installment_amount = (total / Decimal::from(term)).round_dp(MONEY_SCALE);

        Ok(Self {
            otr,
            admin_fee: fees.admin_fee,
            total_interest,
            total,
            term,
            installment_amount,
        })
    }

    /// Only the targeted bucket is checked, not the customer's other terms.
    pub fn ensure_affordable(&self, limit: &CustomerLimit) -> TenorResult<()> {
        if limit.remaining_limit < self.total {
            return Err(TenorError::InsufficientLimit {
                remaining: limit.remaining_limit,
                required: self.total,
            });
        }
        Ok(())
    }
}

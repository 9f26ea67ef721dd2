//! Proportional credit limit reallocation.
//!
//! Every term bucket is a view of one underlying credit line, so a loan
//! drawn on one bucket marks all of them down. Each bucket `v` loses
//! `v.remaining / target_remaining * total`, floored at zero; the
//! targeted bucket therefore loses exactly `total`.

use rust_decimal::Decimal;
use tenor_core::error::{TenorError, TenorResult};
use tenor_core::models::customer_limit::{CustomerLimit, LimitAdjustment};

use crate::MONEY_SCALE;

/// Compute the new remaining capacity of every bucket.
///
/// The adjustments carry each bucket's current `version` so the write can
/// be rejected if the bucket changed in the meantime.
pub fn reallocate(
    limits: &[CustomerLimit],
    target_remaining: Decimal,
    total: Decimal,
) -> TenorResult<Vec<LimitAdjustment>> {
    if target_remaining <= Decimal::ZERO {
        return Err(TenorError::InsufficientLimit {
            remaining: target_remaining,
            required: total,
        });
    }

    limits
        .iter()
        .map(|limit| {
            let debit = limit
                .remaining_limit
                .checked_div(target_remaining)
                .and_then(|ratio| ratio.checked_mul(total))
                .ok_or_else(|| {
                    TenorError::Internal(format!(
                        "markdown of customer_limit {} overflows",
                        limit.id
                    ))
                })?;
            let remaining = (limit.remaining_limit - debit)
                .max(Decimal::ZERO)
                .round_dp(MONEY_SCALE);
            Ok(LimitAdjustment {
                limit_id: limit.id,
                expected_version: limit.version,
                remaining_limit: remaining,
            })
        })
        .collect()
}

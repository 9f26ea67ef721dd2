//! Installment schedule generation.

use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use tenor_core::error::{TenorError, TenorResult};
use tenor_core::models::installment::NewInstallment;

/// One installment per month for `term` months, the first due one month
/// after `start`.
pub fn build_schedule(
    start: DateTime<Utc>,
    term: u32,
    amount: Decimal,
) -> TenorResult<Vec<NewInstallment>> {
    (1..=term)
        .map(|i| {
            let due_date = start.checked_add_months(Months::new(i)).ok_or_else(|| {
                TenorError::Internal(format!("due date out of range for installment {i}"))
            })?;
            Ok(NewInstallment {
                term: i,
                due_date,
                amount,
            })
        })
        .collect()
}

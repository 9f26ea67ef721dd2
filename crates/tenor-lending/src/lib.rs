//! Tenor Lending: loan pricing, installment schedules, proportional
//! credit-limit allocation and the services that book and report loans.

pub mod allocation;
pub mod clock;
pub mod config;
pub mod fees;
pub mod ledger;
pub mod limits;
pub mod originator;
pub mod pricing;
pub mod schedule;
pub mod sequence;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::LendingConfig;
pub use fees::{FeeRates, FeeResolver};
pub use ledger::TransactionLedger;
pub use limits::{ApproveLimits, LimitService};
pub use originator::{CreateTransaction, LoanOriginator};
pub use pricing::LoanQuote;
pub use sequence::DailySequence;

/// Decimal places kept for computed money amounts.
pub const MONEY_SCALE: u32 = 2;

//! Lending configuration.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LendingConfig {
    /// Global variable holding the flat admin fee.
    pub admin_fee_code: String,
    /// Global variable holding the interest rate in percent.
    pub interest_fee_code: String,
    /// Prefix of generated contract numbers.
    pub contract_prefix: String,
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            admin_fee_code: "ADMIN_FEE".into(),
            interest_fee_code: "INTEREST_FEE".into(),
            contract_prefix: "TX".into(),
        }
    }
}

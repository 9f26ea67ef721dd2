//! Fee resolution from global variables.

use std::str::FromStr;

use rust_decimal::Decimal;
use tenor_core::error::{TenorError, TenorResult};
use tenor_core::repository::VariableGlobalRepository;

use crate::config::LendingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeRates {
    /// Flat amount added to every loan.
    pub admin_fee: Decimal,
    /// Interest in percent of the principal.
    pub interest_rate: Decimal,
}

/// Reads the admin fee and interest rate. A missing, malformed or
/// negative value is a configuration error; nothing is defaulted.
pub struct FeeResolver<V> {
    variables: V,
    admin_fee_code: String,
    interest_fee_code: String,
}

impl<V: VariableGlobalRepository> FeeResolver<V> {
    pub fn new(variables: V, config: &LendingConfig) -> Self {
        Self {
            variables,
            admin_fee_code: config.admin_fee_code.clone(),
            interest_fee_code: config.interest_fee_code.clone(),
        }
    }

    pub async fn resolve(&self) -> TenorResult<FeeRates> {
        let (admin_fee, interest_rate) = futures::try_join!(
            self.decimal(&self.admin_fee_code),
            self.decimal(&self.interest_fee_code),
        )?;
        Ok(FeeRates {
            admin_fee,
            interest_rate,
        })
    }

    async fn decimal(&self, code: &str) -> TenorResult<Decimal> {
        let missing = |reason: String| TenorError::ConfigurationMissing {
            code: code.to_string(),
            reason,
        };
        let variable = self
            .variables
            .get_by_code(code)
            .await?
            .ok_or_else(|| missing("not set".into()))?;
        let value = Decimal::from_str(variable.value.trim())
            .map_err(|e| missing(format!("malformed value {:?}: {e}", variable.value)))?;
        if value.is_sign_negative() {
            return Err(missing(format!("negative value {value}")));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use tenor_core::models::variable_global::{CreateVariableGlobal, VariableGlobal};
    use uuid::Uuid;

    struct Variables(HashMap<&'static str, &'static str>);

    impl VariableGlobalRepository for Variables {
        async fn create(&self, _input: CreateVariableGlobal) -> TenorResult<VariableGlobal> {
            unimplemented!()
        }

        async fn get_by_code(&self, code: &str) -> TenorResult<Option<VariableGlobal>> {
            Ok(self.0.get(code).map(|value| VariableGlobal {
                id: Uuid::new_v4(),
                code: code.to_string(),
                value: value.to_string(),
                description: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        }
    }

    fn resolver(pairs: &[(&'static str, &'static str)]) -> FeeResolver<Variables> {
        FeeResolver::new(
            Variables(pairs.iter().copied().collect()),
            &LendingConfig::default(),
        )
    }

    #[tokio::test]
    async fn resolves_both_rates() {
        let rates = resolver(&[("ADMIN_FEE", "20000"), ("INTEREST_FEE", " 2.5 ")])
            .resolve()
            .await
            .unwrap();
        assert_eq!(rates.admin_fee, dec!(20000));
        assert_eq!(rates.interest_rate, dec!(2.5));
    }

    #[tokio::test]
    async fn missing_malformed_and_negative_values_fail() {
        for pairs in [
            vec![("ADMIN_FEE", "20000")],
            vec![("ADMIN_FEE", "abc"), ("INTEREST_FEE", "10")],
            vec![("ADMIN_FEE", "20000"), ("INTEREST_FEE", "-1")],
        ] {
            let result = resolver(&pairs).resolve().await;
            assert!(matches!(result, Err(TenorError::ConfigurationMissing { .. })));
        }
    }
}

//! Service configuration, loaded from a TOML file.

use std::path::Path;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::Deserialize;
use tenor_accounts::OnboardingConfig;
use tenor_auth::AuthConfig;
use tenor_blob::BlobConfig;
use tenor_db::DbConfig;
use tenor_lending::LendingConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub database: DbConfig,
    pub customer_auth: AuthConfig,
    pub staff_auth: AuthConfig,
    pub blob: BlobConfig,
    pub lending: LendingConfig,
    pub onboarding: OnboardingConfig,
    /// Initial fee variables, written only if absent.
    pub fees: Option<FeeSeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeeSeed {
    pub admin_fee: Decimal,
    pub interest_rate: Decimal,
}

impl ServiceConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Refuse to start with unusable secrets.
    pub fn verify(&self) -> anyhow::Result<()> {
        for (realm, auth) in [("customer_auth", &self.customer_auth), ("staff_auth", &self.staff_auth)] {
            if auth.access_secret.is_empty() || auth.refresh_secret.is_empty() {
                anyhow::bail!("{realm}: access_secret and refresh_secret must be set");
            }
            if auth.access_secret == auth.refresh_secret {
                anyhow::bail!("{realm}: access_secret and refresh_secret must differ");
            }
        }
        if self.customer_auth.access_secret == self.staff_auth.access_secret {
            anyhow::bail!("customer and staff realms must not share an access secret");
        }
        if let Some(fees) = &self.fees {
            if fees.admin_fee.is_sign_negative() || fees.interest_rate.is_sign_negative() {
                anyhow::bail!("fees must not be negative");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[database]
endpoint = "ws://db.internal:8000"
namespace = "tenor"
database = "lending"

[customer_auth]
access_secret = "c-access"
refresh_secret = "c-refresh"
pepper = "c-pepper"

[staff_auth]
access_secret = "s-access"
refresh_secret = "s-refresh"
access_token_lifetime_secs = 600

[blob]
root = "/var/lib/tenor/blobs"

[lending]
contract_prefix = "TX"

[fees]
admin_fee = "20000"
interest_rate = "10"
"#;

    #[test]
    fn parses_sample_with_defaults() {
        let config = ServiceConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.database.endpoint, "ws://db.internal:8000");
        assert!(config.database.credentials.is_some());
        assert_eq!(config.customer_auth.pepper.as_deref(), Some("c-pepper"));
        assert_eq!(config.customer_auth.access_token_lifetime_secs, 900);
        assert_eq!(config.staff_auth.access_token_lifetime_secs, 600);
        assert_eq!(config.lending.admin_fee_code, "ADMIN_FEE");
        assert_eq!(config.onboarding.cif_prefix, "CIF");
        let fees = config.fees.as_ref().unwrap();
        assert_eq!(fees.admin_fee, Decimal::from(20000));
        assert!(config.verify().is_ok());
    }

    #[test]
    fn rejects_missing_or_shared_secrets() {
        assert!(ServiceConfig::default().verify().is_err());

        let mut config = ServiceConfig::parse(SAMPLE).unwrap();
        config.staff_auth.refresh_secret = config.staff_auth.access_secret.clone();
        assert!(config.verify().is_err());

        let mut config = ServiceConfig::parse(SAMPLE).unwrap();
        config.staff_auth.access_secret = config.customer_auth.access_secret.clone();
        assert!(config.verify().is_err());
    }
}

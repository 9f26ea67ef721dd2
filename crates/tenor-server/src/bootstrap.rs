//! First-start setup.

use tenor_core::models::variable_global::CreateVariableGlobal;
use tenor_core::repository::VariableGlobalRepository;
use tenor_lending::LendingConfig;
use tracing::{info, warn};

use crate::config::FeeSeed;

/// Create the admin and interest fee variables from `seed` where they do
/// not exist yet. Existing values are never overwritten. Without a seed,
/// missing variables are only reported; loan creation fails until they
/// are set.
pub async fn ensure_fee_variables<V: VariableGlobalRepository>(
    variables: &V,
    lending: &LendingConfig,
    seed: Option<&FeeSeed>,
) -> anyhow::Result<()> {
    let wanted = [
        (
            &lending.admin_fee_code,
            seed.map(|s| s.admin_fee),
            "Flat admin fee added to every loan",
        ),
        (
            &lending.interest_fee_code,
            seed.map(|s| s.interest_rate),
            "Interest in percent of the principal",
        ),
    ];

    for (code, value, description) in wanted {
        if variables.get_by_code(code).await?.is_some() {
            info!(code = %code, "Fee variable present");
            continue;
        }
        match value {
            Some(value) => {
                variables
                    .create(CreateVariableGlobal {
                        code: code.clone(),
                        value: value.to_string(),
                        description: Some(description.into()),
                    })
                    .await?;
                info!(code = %code, value = %value, "Seeded fee variable");
            }
            None => warn!(code = %code, "Fee variable missing and no seed configured"),
        }
    }
    Ok(())
}

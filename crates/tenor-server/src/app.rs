//! Wiring of every domain service over one SurrealDB connection.

use std::sync::Arc;

use surrealdb::{Connection, Surreal};
use tenor_accounts::{
    CustomerAdmin, CustomerOnboarding, CustomerProfiles, PasswordRules, StaffAccounts,
};
use tenor_auth::{AuthService, CustomerDirectory, StaffDirectory};
use tenor_blob::FileStore;
use tenor_db::repository::{
    SurrealCustomerInformationFileRepository, SurrealCustomerLimitRepository,
    SurrealCustomerRepository, SurrealInstallmentRepository, SurrealTransactionRepository,
    SurrealUserRepository, SurrealVariableGlobalRepository,
};
use tenor_lending::{Clock, LimitService, LoanOriginator, SystemClock, TransactionLedger};
use tracing::info;

use crate::bootstrap;
use crate::config::ServiceConfig;

pub type SharedClock = Arc<dyn Clock>;

/// All services of one running instance.
///
/// The HTTP surface calls into these; each holds its own repository
/// handles over a clone of the same client.
pub struct App<C: Connection> {
    pub customer_auth: AuthService<CustomerDirectory<SurrealCustomerRepository<C>>>,
    pub staff_auth: AuthService<StaffDirectory<SurrealUserRepository<C>>>,
    pub onboarding: CustomerOnboarding<
        SurrealCustomerRepository<C>,
        SurrealCustomerInformationFileRepository<C>,
        FileStore,
        SharedClock,
    >,
    pub profiles: CustomerProfiles<SurrealCustomerRepository<C>, SurrealCustomerInformationFileRepository<C>>,
    pub customers: CustomerAdmin<SurrealCustomerRepository<C>, SurrealCustomerInformationFileRepository<C>>,
    pub staff: StaffAccounts<SurrealUserRepository<C>>,
    pub limits: LimitService<SurrealCustomerLimitRepository<C>, SurrealCustomerRepository<C>>,
    pub originator: LoanOriginator<
        SurrealCustomerLimitRepository<C>,
        SurrealTransactionRepository<C>,
        SurrealVariableGlobalRepository<C>,
        SharedClock,
    >,
    pub ledger: TransactionLedger<
        SurrealCustomerRepository<C>,
        SurrealTransactionRepository<C>,
        SurrealInstallmentRepository<C>,
    >,
}

impl<C: Connection> App<C> {
    /// Apply migrations, seed fee variables and assemble the services
    /// against the system clock.
    pub async fn start(db: Surreal<C>, config: &ServiceConfig) -> anyhow::Result<Self> {
        Self::start_with_clock(db, config, Arc::new(SystemClock)).await
    }

    pub async fn start_with_clock(
        db: Surreal<C>,
        config: &ServiceConfig,
        clock: SharedClock,
    ) -> anyhow::Result<Self> {
        tenor_db::run_migrations(&db).await?;
        bootstrap::ensure_fee_variables(
            &SurrealVariableGlobalRepository::new(db.clone()),
            &config.lending,
            config.fees.as_ref(),
        )
        .await?;

        let blobs = FileStore::from_config(&config.blob)?;
        let app = Self::assemble(db, config, blobs, clock);
        info!("Services assembled");
        Ok(app)
    }

    fn assemble(db: Surreal<C>, config: &ServiceConfig, blobs: FileStore, clock: SharedClock) -> Self {
        let customer_pepper = config.customer_auth.pepper.clone();
        let staff_pepper = config.staff_auth.pepper.clone();
        let customers = || SurrealCustomerRepository::peppered(db.clone(), customer_pepper.clone());
        let users = || SurrealUserRepository::peppered(db.clone(), staff_pepper.clone());
        let information = || SurrealCustomerInformationFileRepository::new(db.clone());
        let limits = || SurrealCustomerLimitRepository::new(db.clone());
        let transactions = || SurrealTransactionRepository::new(db.clone());
        let customer_rules = PasswordRules::from_auth(&config.customer_auth);
        let staff_rules = PasswordRules::from_auth(&config.staff_auth);

        Self {
            customer_auth: AuthService::new(
                CustomerDirectory(customers()),
                config.customer_auth.clone(),
            ),
            staff_auth: AuthService::new(StaffDirectory(users()), config.staff_auth.clone()),
            onboarding: CustomerOnboarding::new(
                customers(),
                information(),
                blobs,
                clock.clone(),
                &config.onboarding,
                customer_rules.clone(),
            ),
            profiles: CustomerProfiles::new(customers(), information(), customer_rules.clone()),
            customers: CustomerAdmin::new(customers(), information(), customer_rules),
            staff: StaffAccounts::new(users(), staff_rules),
            limits: LimitService::new(limits(), customers()),
            originator: LoanOriginator::new(
                limits(),
                transactions(),
                SurrealVariableGlobalRepository::new(db.clone()),
                clock,
                &config.lending,
            ),
            ledger: TransactionLedger::new(
                customers(),
                transactions(),
                SurrealInstallmentRepository::new(db.clone()),
            ),
        }
    }
}

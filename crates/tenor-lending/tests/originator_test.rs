//! End-to-end loan origination against in-memory SurrealDB.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use tenor_core::error::{TenorError, TenorResult};
use tenor_core::filter::Filter;
use tenor_core::models::customer::{CustomerRegistration, RegisteredCustomer};
use tenor_core::models::customer_information_file::NewCustomerInformationFile;
use tenor_core::models::customer_limit::{CustomerLimit, LIMIT_TERMS, LimitApproval};
use tenor_core::models::variable_global::CreateVariableGlobal;
use tenor_core::repository::{
    CustomerLimitRepository, CustomerRepository, PaginatedResult, Pagination,
    TransactionRepository, VariableGlobalRepository,
};
use tenor_db::repository::{
    SurrealCustomerLimitRepository, SurrealCustomerRepository, SurrealInstallmentRepository,
    SurrealTransactionRepository, SurrealVariableGlobalRepository,
};
use tenor_lending::{
    ApproveLimits, Clock, CreateTransaction, FixedClock, LendingConfig, LimitService, LoanOriginator,
    TransactionLedger,
};
use uuid::Uuid;

type Originator = LoanOriginator<
    SurrealCustomerLimitRepository<Db>,
    SurrealTransactionRepository<Db>,
    SurrealVariableGlobalRepository<Db>,
    Arc<FixedClock>,
>;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tenor_db::run_migrations(&db).await.unwrap();
    db
}

async fn seed_fees(db: &Surreal<Db>, admin_fee: &str, interest: &str) {
    let variables = SurrealVariableGlobalRepository::new(db.clone());
    for (code, value) in [("ADMIN_FEE", admin_fee), ("INTEREST_FEE", interest)] {
        variables
            .create(CreateVariableGlobal {
                code: code.into(),
                value: value.into(),
                description: None,
            })
            .await
            .unwrap();
    }
}

/// Register a customer and approve all four buckets at `amount`.
async fn approved_customer(db: &Surreal<Db>, amount: Decimal) -> RegisteredCustomer {
    let customers = SurrealCustomerRepository::new(db.clone());
    let registered = customers
        .register(CustomerRegistration {
            name: "Budi".into(),
            email: "budi@example.com".into(),
            password: "correct-horse-battery".into(),
            information: NewCustomerInformationFile {
                cif_number: "CIF_000001_1".into(),
                nik: "3174010101900002".into(),
                full_name: "Budi Santoso".into(),
                legal_name: "Budi Santoso".into(),
                place_of_birth: "Bandung".into(),
                date_of_birth: chrono::NaiveDate::from_ymd_opt(1990, 2, 3).unwrap(),
                gender: Some("male".into()),
                salary: dec!(12000000),
                card_photo: "customer/card-photo/a.jpg".into(),
                selfie_photo: "customer/selfie-photo/a.jpg".into(),
            },
            limit_terms: LIMIT_TERMS.to_vec(),
        })
        .await
        .unwrap();

    let service = LimitService::new(
        SurrealCustomerLimitRepository::new(db.clone()),
        SurrealCustomerRepository::new(db.clone()),
    );
    let limits = service
        .approve(ApproveLimits {
            customer_id: registered.customer.id,
            limits: registered
                .limits
                .iter()
                .map(|l| LimitApproval {
                    limit_id: l.id,
                    amount,
                })
                .collect(),
        })
        .await
        .unwrap();

    RegisteredCustomer { limits, ..registered }
}

fn originator(db: &Surreal<Db>, clock: Arc<FixedClock>) -> Originator {
    LoanOriginator::new(
        SurrealCustomerLimitRepository::new(db.clone()),
        SurrealTransactionRepository::new(db.clone()),
        SurrealVariableGlobalRepository::new(db.clone()),
        clock,
        &LendingConfig::default(),
    )
}

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap(),
    ))
}

fn term_limit_id(customer: &RegisteredCustomer, term: u32) -> uuid::Uuid {
    customer.limits.iter().find(|l| l.term == term).unwrap().id
}

#[tokio::test]
async fn booking_marks_down_every_bucket() {
    let db = setup().await;
    seed_fees(&db, "20000", "10").await;
    let customer = approved_customer(&db, dec!(1000000)).await;
    let clock = clock();
    let originator = originator(&db, clock.clone());

    let transaction = originator
        .create_transaction(CreateTransaction {
            customer_id: customer.customer.id,
            customer_limit_id: term_limit_id(&customer, 3),
            asset_name: "Motorcycle".into(),
            otr: dec!(500000),
        })
        .await
        .unwrap();

    assert_eq!(transaction.total_interest, dec!(50000));
    assert_eq!(transaction.admin_fee, dec!(20000));
    assert_eq!(transaction.total, dec!(570000));
    assert_eq!(transaction.installment_amount, dec!(190000));
    assert_eq!(transaction.installment_count, 3);
    assert_eq!(
        transaction.contract_number,
        format!("TX_000001_{}", clock.now().timestamp())
    );
    assert!(!transaction.is_done);

    let limits = SurrealCustomerLimitRepository::new(db.clone())
        .list_by_customer(customer.customer.id)
        .await
        .unwrap();
    assert_eq!(limits.len(), 4);
    for limit in &limits {
        assert_eq!(limit.remaining_limit, dec!(430000));
        assert_eq!(limit.amount_limit, dec!(1000000));
    }

    let ledger = TransactionLedger::new(
        SurrealCustomerRepository::new(db.clone()),
        SurrealTransactionRepository::new(db.clone()),
        SurrealInstallmentRepository::new(db.clone()),
    );
    let booked = ledger
        .get_for_customer(customer.customer.id, transaction.id)
        .await
        .unwrap();
    assert_eq!(booked.installments.len(), 3);
    for (idx, installment) in booked.installments.iter().enumerate() {
        assert_eq!(installment.term, idx as u32 + 1);
        assert_eq!(installment.amount, dec!(190000));
        assert_eq!(installment.amount_paid, Decimal::ZERO);
        assert!(installment.payment_at.is_none());
    }
    assert!(
        booked
            .installments
            .windows(2)
            .all(|w| w[0].due_date < w[1].due_date)
    );
}

#[tokio::test]
async fn insufficient_limit_writes_nothing() {
    let db = setup().await;
    seed_fees(&db, "20000", "10").await;
    let customer = approved_customer(&db, dec!(100)).await;
    let originator = originator(&db, clock());

    let result = originator
        .create_transaction(CreateTransaction {
            customer_id: customer.customer.id,
            customer_limit_id: term_limit_id(&customer, 3),
            asset_name: "Motorcycle".into(),
            otr: dec!(500000),
        })
        .await;
    assert!(matches!(
        result,
        Err(TenorError::InsufficientLimit { remaining, required })
            if remaining == dec!(100) && required == dec!(570000)
    ));

    let transactions = SurrealTransactionRepository::new(db.clone())
        .list(Pagination::all(), Filter::new())
        .await
        .unwrap();
    assert!(transactions.items.is_empty());

    let limits = SurrealCustomerLimitRepository::new(db.clone())
        .list_by_customer(customer.customer.id)
        .await
        .unwrap();
    assert_eq!(limits, customer.limits);
}

#[tokio::test]
async fn missing_or_malformed_fee_is_configuration_error() {
    let db = setup().await;
    let customer = approved_customer(&db, dec!(1000000)).await;
    let originator = originator(&db, clock());
    let input = CreateTransaction {
        customer_id: customer.customer.id,
        customer_limit_id: term_limit_id(&customer, 1),
        asset_name: "Laptop".into(),
        otr: dec!(1000),
    };

    let missing = originator.create_transaction(input.clone()).await;
    assert!(matches!(missing, Err(TenorError::ConfigurationMissing { .. })));

    seed_fees(&db, "20000", "ten percent").await;
    let malformed = originator.create_transaction(input).await;
    assert!(matches!(
        malformed,
        Err(TenorError::ConfigurationMissing { ref code, .. }) if code == "INTEREST_FEE"
    ));
}

#[tokio::test]
async fn limit_of_another_customer_is_not_found() {
    let db = setup().await;
    seed_fees(&db, "0", "0").await;
    let customer = approved_customer(&db, dec!(1000000)).await;
    let originator = originator(&db, clock());

    let result = originator
        .create_transaction(CreateTransaction {
            customer_id: uuid::Uuid::new_v4(),
            customer_limit_id: term_limit_id(&customer, 1),
            asset_name: "Phone".into(),
            otr: dec!(1000),
        })
        .await;
    assert!(matches!(result, Err(TenorError::NotFound { .. })));
}

#[tokio::test]
async fn blank_asset_and_non_positive_otr_are_rejected() {
    let db = setup().await;
    let originator = originator(&db, clock());
    let mut input = CreateTransaction {
        customer_id: uuid::Uuid::new_v4(),
        customer_limit_id: uuid::Uuid::new_v4(),
        asset_name: "  ".into(),
        otr: dec!(1000),
    };
    assert!(matches!(
        originator.create_transaction(input.clone()).await,
        Err(TenorError::Validation { .. })
    ));

    input.asset_name = "Phone".into();
    input.otr = dec!(-1);
    assert!(matches!(
        originator.create_transaction(input).await,
        Err(TenorError::Validation { .. })
    ));
}

#[tokio::test]
async fn contract_numbers_increase_within_a_day_and_reset_on_the_next() {
    let db = setup().await;
    seed_fees(&db, "0", "0").await;
    let customer = approved_customer(&db, dec!(1000000)).await;
    let clock = clock();
    let originator = originator(&db, clock.clone());
    let input = CreateTransaction {
        customer_id: customer.customer.id,
        customer_limit_id: term_limit_id(&customer, 1),
        asset_name: "Groceries".into(),
        otr: dec!(1000),
    };

    let first = originator.create_transaction(input.clone()).await.unwrap();
    clock.advance(Duration::minutes(5));
    let second = originator.create_transaction(input.clone()).await.unwrap();
    clock.advance(Duration::days(1));
    let next_day = originator.create_transaction(input).await.unwrap();

    assert!(first.contract_number.starts_with("TX_000001_"));
    assert!(second.contract_number.starts_with("TX_000002_"));
    assert!(next_day.contract_number.starts_with("TX_000001_"));
    assert_ne!(first.contract_number, next_day.contract_number);
}

#[tokio::test]
async fn fetching_limits_twice_is_stable() {
    let db = setup().await;
    let customer = approved_customer(&db, dec!(750000)).await;
    let service = LimitService::new(
        SurrealCustomerLimitRepository::new(db.clone()),
        SurrealCustomerRepository::new(db.clone()),
    );

    let first = service.list_for_customer(customer.customer.id).await.unwrap();
    let second = service.list_for_customer(customer.customer.id).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.iter().map(|l| l.term).collect::<Vec<_>>(),
        LIMIT_TERMS.to_vec()
    );
}

#[tokio::test]
async fn approval_validates_input_and_customer() {
    let db = setup().await;
    let customer = approved_customer(&db, dec!(1000)).await;
    let service = LimitService::new(
        SurrealCustomerLimitRepository::new(db.clone()),
        SurrealCustomerRepository::new(db.clone()),
    );
    let limit_id = term_limit_id(&customer, 2);

    let empty = service
        .approve(ApproveLimits {
            customer_id: customer.customer.id,
            limits: vec![],
        })
        .await;
    assert!(matches!(empty, Err(TenorError::Validation { .. })));

    let duplicate = service
        .approve(ApproveLimits {
            customer_id: customer.customer.id,
            limits: vec![
                LimitApproval { limit_id, amount: dec!(1) },
                LimitApproval { limit_id, amount: dec!(2) },
            ],
        })
        .await;
    assert!(matches!(duplicate, Err(TenorError::Validation { .. })));

    let unknown = service
        .approve(ApproveLimits {
            customer_id: uuid::Uuid::new_v4(),
            limits: vec![LimitApproval { limit_id, amount: dec!(1) }],
        })
        .await;
    assert!(matches!(unknown, Err(TenorError::NotFound { .. })));
}

#[tokio::test]
async fn ledger_details_join_customer_and_schedule() {
    let db = setup().await;
    seed_fees(&db, "1000", "5").await;
    let customer = approved_customer(&db, dec!(1000000)).await;
    let originator = originator(&db, clock());
    for (term, asset) in [(1, "Phone"), (6, "Scooter")] {
        originator
            .create_transaction(CreateTransaction {
                customer_id: customer.customer.id,
                customer_limit_id: term_limit_id(&customer, term),
                asset_name: asset.into(),
                otr: dec!(10000),
            })
            .await
            .unwrap();
    }

    let ledger = TransactionLedger::new(
        SurrealCustomerRepository::new(db.clone()),
        SurrealTransactionRepository::new(db.clone()),
        SurrealInstallmentRepository::new(db.clone()),
    );
    let page = ledger.details(Pagination::all(), Filter::new()).await.unwrap();
    assert_eq!(page.meta.total_count, 2);
    for detail in &page.items {
        assert_eq!(detail.customer.id, customer.customer.id);
        assert_eq!(
            detail.installments.len() as u32,
            detail.transaction.installment_count
        );
    }

    let own = ledger
        .list_for_customer(
            customer.customer.id,
            Pagination::default(),
            Filter::new().eq_id("customer_id", uuid::Uuid::new_v4()),
        )
        .await
        .unwrap();
    assert_eq!(own.items.len(), 2);

    let other = ledger
        .get_for_customer(uuid::Uuid::new_v4(), page.items[0].transaction.id)
        .await;
    assert!(matches!(other, Err(TenorError::NotFound { .. })));
}

/// Limit store that lets a second booking commit right after the
/// originator has taken its snapshot of the buckets.
struct InterleavedLimits {
    inner: SurrealCustomerLimitRepository<Db>,
    rival: Originator,
    rival_input: CreateTransaction,
    fired: AtomicBool,
}

impl CustomerLimitRepository for InterleavedLimits {
    async fn get_for_customer(
        &self,
        customer_id: Uuid,
        id: Uuid,
    ) -> TenorResult<Option<CustomerLimit>> {
        self.inner.get_for_customer(customer_id, id).await
    }

    async fn list_by_customer(&self, customer_id: Uuid) -> TenorResult<Vec<CustomerLimit>> {
        let snapshot = self.inner.list_by_customer(customer_id).await?;
        if !self.fired.swap(true, Ordering::SeqCst) {
            self.rival
                .create_transaction(self.rival_input.clone())
                .await
                .unwrap();
        }
        Ok(snapshot)
    }

    async fn list(
        &self,
        pagination: Pagination,
        filter: Filter,
    ) -> TenorResult<PaginatedResult<CustomerLimit>> {
        self.inner.list(pagination, filter).await
    }

    async fn approve(
        &self,
        customer_id: Uuid,
        approvals: Vec<LimitApproval>,
    ) -> TenorResult<Vec<CustomerLimit>> {
        self.inner.approve(customer_id, approvals).await
    }
}

#[tokio::test]
async fn booking_after_a_concurrent_draw_is_rejected() {
    let db = setup().await;
    seed_fees(&db, "20000", "10").await;
    let customer = approved_customer(&db, dec!(1000000)).await;
    let clock = clock();
    let input = CreateTransaction {
        customer_id: customer.customer.id,
        customer_limit_id: term_limit_id(&customer, 3),
        asset_name: "Motorcycle".into(),
        otr: dec!(500000),
    };

    let originator = LoanOriginator::new(
        InterleavedLimits {
            inner: SurrealCustomerLimitRepository::new(db.clone()),
            rival: originator(&db, clock.clone()),
            rival_input: input.clone(),
            fired: AtomicBool::new(false),
        },
        SurrealTransactionRepository::new(db.clone()),
        SurrealVariableGlobalRepository::new(db.clone()),
        clock,
        &LendingConfig::default(),
    );

    let result = originator.create_transaction(input).await;
    assert!(matches!(result, Err(TenorError::Conflict { .. })));

    let transactions = SurrealTransactionRepository::new(db.clone())
        .list(Pagination::all(), Filter::new())
        .await
        .unwrap();
    assert_eq!(transactions.items.len(), 1);

    let limits = SurrealCustomerLimitRepository::new(db.clone())
        .list_by_customer(customer.customer.id)
        .await
        .unwrap();
    for limit in &limits {
        assert_eq!(limit.remaining_limit, dec!(430000));
    }
}

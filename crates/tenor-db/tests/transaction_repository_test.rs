//! Integration tests for atomic loan booking using in-memory SurrealDB.

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tenor_core::error::TenorError;
use tenor_core::filter::Filter;
use tenor_core::models::customer::{CustomerRegistration, RegisteredCustomer};
use tenor_core::models::customer_information_file::NewCustomerInformationFile;
use tenor_core::models::customer_limit::{LIMIT_TERMS, LimitAdjustment, LimitApproval};
use tenor_core::models::installment::NewInstallment;
use tenor_core::models::transaction::{LoanBooking, NewLoanTransaction};
use tenor_core::repository::{
    CustomerLimitRepository, CustomerRepository, InstallmentRepository, Pagination,
    TransactionRepository,
};
use tenor_db::repository::{
    SurrealCustomerLimitRepository, SurrealCustomerRepository, SurrealInstallmentRepository,
    SurrealTransactionRepository,
};
use uuid::Uuid;

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tenor_db::run_migrations(&db).await.unwrap();
    db
}

/// Register a customer and approve every bucket at `amount`.
async fn approved_customer(
    db: &Surreal<surrealdb::engine::local::Db>,
    amount: Decimal,
) -> RegisteredCustomer {
    let customers = SurrealCustomerRepository::new(db.clone());
    let mut registered = customers
        .register(CustomerRegistration {
            name: "Siti".into(),
            email: "siti@example.com".into(),
            password: "correct-horse-battery".into(),
            information: NewCustomerInformationFile {
                cif_number: "CIF_000001_1".into(),
                nik: "3201010101900001".into(),
                full_name: "Siti".into(),
                legal_name: "Siti".into(),
                place_of_birth: "Depok".into(),
                date_of_birth: chrono::NaiveDate::from_ymd_opt(1994, 1, 2).unwrap(),
                gender: None,
                salary: dec!(10000000),
                card_photo: "c.jpg".into(),
                selfie_photo: "s.jpg".into(),
            },
            limit_terms: LIMIT_TERMS.to_vec(),
        })
        .await
        .unwrap();

    let approvals = registered
        .limits
        .iter()
        .map(|l| LimitApproval {
            limit_id: l.id,
            amount,
        })
        .collect();
    registered.limits = SurrealCustomerLimitRepository::new(db.clone())
        .approve(registered.customer.id, approvals)
        .await
        .unwrap();
    registered
}

fn booking(
    customer: &RegisteredCustomer,
    contract_number: &str,
    remaining: Decimal,
) -> LoanBooking {
    let created_at = Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0).unwrap();
    let target = &customer.limits[2];
    LoanBooking {
        transaction: NewLoanTransaction {
            id: Uuid::new_v4(),
            customer_id: customer.customer.id,
            customer_limit_id: target.id,
            asset_name: "Motorcycle".into(),
            contract_number: contract_number.into(),
            otr: dec!(500000),
            admin_fee: dec!(20000),
            total: dec!(570000),
            installment_amount: dec!(190000),
            installment_count: 3,
            total_interest: dec!(50000),
            created_at,
        },
        installments: (1..=3)
            .map(|term| NewInstallment {
                term,
                due_date: created_at + Duration::days(30 * i64::from(term)),
                amount: dec!(190000),
            })
            .collect(),
        limit_adjustments: customer
            .limits
            .iter()
            .map(|l| LimitAdjustment {
                limit_id: l.id,
                expected_version: l.version,
                remaining_limit: remaining,
            })
            .collect(),
    }
}

#[tokio::test]
async fn booking_persists_transaction_schedule_and_limits() {
    let db = setup().await;
    let customer = approved_customer(&db, dec!(1000000)).await;
    let transactions = SurrealTransactionRepository::new(db.clone());
    let installments = SurrealInstallmentRepository::new(db.clone());
    let limits = SurrealCustomerLimitRepository::new(db);

    let tx = transactions
        .book(booking(&customer, "TX_000001_1773135000", dec!(430000)))
        .await
        .unwrap();
    assert_eq!(tx.total, dec!(570000));
    assert_eq!(tx.installment_count, 3);
    assert!(!tx.is_done);

    let schedule = installments.list_by_transaction(tx.id).await.unwrap();
    assert_eq!(schedule.len(), 3);
    assert_eq!(
        schedule.iter().map(|i| i.term).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(schedule.iter().all(|i| i.amount_paid == dec!(0)));
    assert!(schedule.iter().all(|i| i.payment_at.is_none()));

    for limit in limits.list_by_customer(customer.customer.id).await.unwrap() {
        assert_eq!(limit.remaining_limit, dec!(430000));
        assert_eq!(limit.amount_limit, dec!(1000000));
        assert_eq!(limit.version, 2);
    }
}

#[tokio::test]
async fn stale_version_rolls_back_everything() {
    let db = setup().await;
    let customer = approved_customer(&db, dec!(1000000)).await;
    let transactions = SurrealTransactionRepository::new(db.clone());
    let limits = SurrealCustomerLimitRepository::new(db);

    transactions
        .book(booking(&customer, "TX_000001_1773135000", dec!(430000)))
        .await
        .unwrap();

    // Same expected versions again: every bucket has moved on.
    let err = transactions
        .book(booking(&customer, "TX_000002_1773135000", dec!(0)))
        .await
        .unwrap_err();
    assert!(
        matches!(err, TenorError::Conflict { ref constraint } if constraint.contains("modified concurrently")),
        "unexpected error: {err:?}"
    );

    let page = transactions
        .list(Pagination::default(), Filter::new())
        .await
        .unwrap();
    assert_eq!(page.meta.total_count, 1);
    for limit in limits.list_by_customer(customer.customer.id).await.unwrap() {
        assert_eq!(limit.remaining_limit, dec!(430000));
    }
}

#[tokio::test]
async fn duplicate_contract_number_is_a_conflict() {
    let db = setup().await;
    let customer = approved_customer(&db, dec!(1000000)).await;
    let transactions = SurrealTransactionRepository::new(db.clone());
    let limits = SurrealCustomerLimitRepository::new(db);

    transactions
        .book(booking(&customer, "TX_000001_1773135000", dec!(430000)))
        .await
        .unwrap();

    let mut fresh = customer.clone();
    fresh.limits = limits.list_by_customer(customer.customer.id).await.unwrap();
    let err = transactions
        .book(booking(&fresh, "TX_000001_1773135000", dec!(0)))
        .await
        .unwrap_err();
    match err {
        TenorError::Conflict { constraint } => {
            assert_eq!(constraint, "idx_transaction_contract_number")
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_is_idempotent_and_scoped() {
    let db = setup().await;
    let customer = approved_customer(&db, dec!(1000000)).await;
    let transactions = SurrealTransactionRepository::new(db);

    let tx = transactions
        .book(booking(&customer, "TX_000001_1773135000", dec!(430000)))
        .await
        .unwrap();

    let first = transactions.get_by_id(tx.id).await.unwrap().unwrap();
    let second = transactions.get_by_id(tx.id).await.unwrap().unwrap();
    assert_eq!(first, second);

    let own = transactions
        .get_for_customer(customer.customer.id, tx.id)
        .await
        .unwrap();
    assert!(own.is_some());
    let foreign = transactions
        .get_for_customer(Uuid::new_v4(), tx.id)
        .await
        .unwrap();
    assert!(foreign.is_none());
    assert!(
        transactions
            .get_by_id(Uuid::new_v4())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn latest_contract_number_is_scoped_to_window() {
    let db = setup().await;
    let customer = approved_customer(&db, dec!(1000000)).await;
    let transactions = SurrealTransactionRepository::new(db);

    transactions
        .book(booking(&customer, "TX_000001_1773135000", dec!(430000)))
        .await
        .unwrap();

    let day = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
    let latest = transactions
        .latest_contract_number_between(day, day + Duration::days(1))
        .await
        .unwrap();
    assert_eq!(latest.as_deref(), Some("TX_000001_1773135000"));

    let next_day = transactions
        .latest_contract_number_between(day + Duration::days(1), day + Duration::days(2))
        .await
        .unwrap();
    assert!(next_day.is_none());
}

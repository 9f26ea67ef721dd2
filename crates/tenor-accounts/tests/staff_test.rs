//! Staff user management and customer administration.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use tenor_accounts::{ChangePassword, CustomerAdmin, PasswordRules, StaffAccounts};
use tenor_core::error::TenorError;
use tenor_core::filter::Filter;
use tenor_core::models::customer::{CustomerRegistration, UpdateCustomer};
use tenor_core::models::customer_information_file::NewCustomerInformationFile;
use tenor_core::models::customer_limit::LIMIT_TERMS;
use tenor_core::models::user::{CreateUser, UpdateUser};
use tenor_core::repository::{CustomerRepository, Pagination};
use tenor_db::repository::{
    SurrealCustomerInformationFileRepository, SurrealCustomerRepository, SurrealUserRepository,
};
use uuid::Uuid;

const PEPPER: &str = "pepper";

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tenor_db::run_migrations(&db).await.unwrap();
    db
}

fn rules() -> PasswordRules {
    PasswordRules::new(8, Some(PEPPER.into()))
}

fn staff(db: &Surreal<Db>) -> StaffAccounts<SurrealUserRepository<Db>> {
    StaffAccounts::new(
        SurrealUserRepository::with_pepper(db.clone(), PEPPER.into()),
        rules(),
    )
}

fn new_user(email: &str) -> CreateUser {
    CreateUser {
        name: "Rina".into(),
        email: email.into(),
        password: "correct-horse-battery".into(),
        created_by: None,
    }
}

async fn register(db: &Surreal<Db>, email: &str, nik: &str) -> Uuid {
    SurrealCustomerRepository::with_pepper(db.clone(), PEPPER.into())
        .register(CustomerRegistration {
            name: "Andi".into(),
            email: email.into(),
            password: "correct-horse-battery".into(),
            information: NewCustomerInformationFile {
                cif_number: format!("CIF_{}_1", &nik[10..]),
                nik: nik.into(),
                full_name: "Andi".into(),
                legal_name: "Andi".into(),
                place_of_birth: "Medan".into(),
                date_of_birth: NaiveDate::from_ymd_opt(1985, 12, 1).unwrap(),
                gender: None,
                salary: dec!(6000000),
                card_photo: "c.jpg".into(),
                selfie_photo: "s.jpg".into(),
            },
            limit_terms: LIMIT_TERMS.to_vec(),
        })
        .await
        .unwrap()
        .customer
        .id
}

#[tokio::test]
async fn created_staff_is_active_and_normalized() {
    let db = setup().await;
    let staff = staff(&db);

    let user = staff.create(new_user("  Rina@Example.com ")).await.unwrap();
    assert!(user.is_active);
    assert_eq!(user.email, "rina@example.com");
    assert_eq!(staff.get(user.id).await.unwrap(), user);
}

#[tokio::test]
async fn create_validates_input() {
    let db = setup().await;
    let staff = staff(&db);

    let weak = staff
        .create(CreateUser {
            password: "123".into(),
            ..new_user("rina@example.com")
        })
        .await;
    assert!(matches!(weak, Err(TenorError::Validation { .. })));

    let bad_email = staff.create(new_user("rina")).await;
    assert!(matches!(bad_email, Err(TenorError::Validation { .. })));

    staff.create(new_user("rina@example.com")).await.unwrap();
    let duplicate = staff.create(new_user("rina@example.com")).await;
    assert!(matches!(duplicate, Err(TenorError::Conflict { .. })));
}

#[tokio::test]
async fn email_changes_are_normalized_like_sign_up() {
    let db = setup().await;
    let staff = staff(&db);
    let user = staff.create(new_user("rina@example.com")).await.unwrap();

    let updated = staff
        .update(
            user.id,
            UpdateUser {
                email: Some(" Rina.Wati@Example.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.email, "rina.wati@example.com");

    let duplicate = staff.create(new_user("RINA.WATI@example.com")).await;
    assert!(matches!(duplicate, Err(TenorError::Conflict { .. })));
}

#[tokio::test]
async fn profile_update_keeps_active_flag_and_password() {
    let db = setup().await;
    let staff = staff(&db);
    let user = staff.create(new_user("rina@example.com")).await.unwrap();

    let updated = staff
        .update_profile(
            user.id,
            UpdateUser {
                name: Some("Rina Wati".into()),
                is_active: Some(false),
                password: Some("sneaky-new-password".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Rina Wati");
    assert!(updated.is_active);
    assert_eq!(updated.password_hash, user.password_hash);
    assert_eq!(updated.updated_by, Some(user.id));
}

#[tokio::test]
async fn password_change_requires_the_old_password() {
    let db = setup().await;
    let staff = staff(&db);
    let user = staff.create(new_user("rina@example.com")).await.unwrap();

    let wrong = staff
        .change_password(
            user.id,
            ChangePassword {
                old_password: "guess".into(),
                new_password: "another-long-one".into(),
            },
        )
        .await;
    assert!(matches!(wrong, Err(TenorError::Unauthorized { .. })));

    let same = staff
        .change_password(
            user.id,
            ChangePassword {
                old_password: "correct-horse-battery".into(),
                new_password: "correct-horse-battery".into(),
            },
        )
        .await;
    assert!(matches!(same, Err(TenorError::Validation { .. })));

    staff
        .change_password(
            user.id,
            ChangePassword {
                old_password: "correct-horse-battery".into(),
                new_password: "another-long-one".into(),
            },
        )
        .await
        .unwrap();
    let hash = staff.get(user.id).await.unwrap().password_hash;
    assert!(tenor_auth::password::verify_password("another-long-one", &hash, Some(PEPPER)).unwrap());
}

#[tokio::test]
async fn batch_delete_deactivates_users() {
    let db = setup().await;
    let staff = staff(&db);
    let a = staff.create(new_user("a@example.com")).await.unwrap();
    let b = staff.create(new_user("b@example.com")).await.unwrap();
    staff.create(new_user("c@example.com")).await.unwrap();

    staff.delete_many(&[a.id, b.id]).await.unwrap();
    assert!(matches!(
        staff.delete_many(&[]).await,
        Err(TenorError::Validation { .. })
    ));

    let active = staff
        .list(Pagination::all(), Filter::new().eq("is_active", true))
        .await
        .unwrap();
    assert_eq!(active.meta.total_count, 1);
    assert_eq!(active.items[0].email, "c@example.com");
}

#[tokio::test]
async fn customer_admin_lists_with_information_and_updates() {
    let db = setup().await;
    let first = register(&db, "andi@example.com", "1271010101850001").await;
    let second = register(&db, "budi@example.com", "1271010101850002").await;
    let admin = CustomerAdmin::new(
        SurrealCustomerRepository::with_pepper(db.clone(), PEPPER.into()),
        SurrealCustomerInformationFileRepository::new(db.clone()),
        rules(),
    );

    let page = admin
        .list_with_information(Pagination::all(), Filter::new())
        .await
        .unwrap();
    assert_eq!(page.meta.total_count, 2);
    for profile in &page.items {
        let information = profile.information.as_ref().unwrap();
        assert_eq!(information.customer_id, profile.customer.id);
    }

    let activated = admin
        .update(
            first,
            UpdateCustomer {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(activated.is_active);

    let bad = admin
        .update(
            first,
            UpdateCustomer {
                email: Some("not-an-email".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(bad, Err(TenorError::Validation { .. })));

    admin.delete_many(&[first, second]).await.unwrap();
    let inactive = admin
        .list(Pagination::all(), Filter::new().eq("is_active", false))
        .await
        .unwrap();
    assert_eq!(inactive.meta.total_count, 2);

    let missing = admin.get(Uuid::new_v4()).await;
    assert!(matches!(missing, Err(TenorError::NotFound { .. })));
}

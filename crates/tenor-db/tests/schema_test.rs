//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    tenor_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in [
        "customer",
        "customer_information_file",
        "customer_limit",
        "loan_transaction",
        "transaction_installment",
        "variable_global",
        "staff_user",
    ] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    tenor_db::run_migrations(&db).await.unwrap();
    tenor_db::run_migrations(&db).await.unwrap();
}

#[tokio::test]
async fn nik_must_be_sixteen_characters() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tenor_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE customer_information_file SET customer_id = 'c', \
             cif_number = 'CIF_000001_1', nik = '123', full_name = 'a', \
             legal_name = 'a', place_of_birth = 'a', date_of_birth = '2000-01-01', \
             salary = '1', card_photo = 'a', selfie_photo = 'a'",
        )
        .await
        .unwrap()
        .check();
    assert!(result.is_err(), "short NIK should be rejected");
}

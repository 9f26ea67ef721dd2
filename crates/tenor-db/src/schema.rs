//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Money is stored as decimal strings so
//! no precision is lost on the way through the engine.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Customers
-- =======================================================================
DEFINE TABLE customer SCHEMAFULL;
DEFINE FIELD name ON TABLE customer TYPE string;
DEFINE FIELD email ON TABLE customer TYPE string;
DEFINE FIELD password_hash ON TABLE customer TYPE string;
DEFINE FIELD is_active ON TABLE customer TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE customer TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE customer TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_customer_email ON TABLE customer \
    COLUMNS email UNIQUE;

-- =======================================================================
-- Customer information files (KYC)
-- =======================================================================
DEFINE TABLE customer_information_file SCHEMAFULL;
DEFINE FIELD customer_id ON TABLE customer_information_file TYPE string;
DEFINE FIELD cif_number ON TABLE customer_information_file TYPE string;
DEFINE FIELD nik ON TABLE customer_information_file TYPE string \
    ASSERT string::len($value) = 16;
DEFINE FIELD full_name ON TABLE customer_information_file TYPE string;
DEFINE FIELD legal_name ON TABLE customer_information_file TYPE string;
DEFINE FIELD place_of_birth ON TABLE customer_information_file \
    TYPE string;
DEFINE FIELD date_of_birth ON TABLE customer_information_file \
    TYPE string;
DEFINE FIELD gender ON TABLE customer_information_file \
    TYPE option<string>;
DEFINE FIELD salary ON TABLE customer_information_file TYPE string;
DEFINE FIELD card_photo ON TABLE customer_information_file TYPE string;
DEFINE FIELD selfie_photo ON TABLE customer_information_file \
    TYPE string;
DEFINE FIELD created_at ON TABLE customer_information_file \
    TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE customer_information_file \
    TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_cif_customer ON TABLE customer_information_file \
    COLUMNS customer_id UNIQUE;
DEFINE INDEX idx_cif_nik ON TABLE customer_information_file \
    COLUMNS nik UNIQUE;
DEFINE INDEX idx_cif_number ON TABLE customer_information_file \
    COLUMNS cif_number UNIQUE;
DEFINE INDEX idx_cif_created ON TABLE customer_information_file \
    COLUMNS created_at;

-- =======================================================================
-- Customer limits (one bucket per term)
-- =======================================================================
DEFINE TABLE customer_limit SCHEMAFULL;
DEFINE FIELD customer_id ON TABLE customer_limit TYPE string;
DEFINE FIELD term ON TABLE customer_limit TYPE int \
    ASSERT $value IN [1, 2, 3, 6];
DEFINE FIELD is_active ON TABLE customer_limit TYPE bool DEFAULT false;
DEFINE FIELD amount_limit ON TABLE customer_limit TYPE string \
    DEFAULT '0';
DEFINE FIELD remaining_limit ON TABLE customer_limit TYPE string \
    DEFAULT '0';
DEFINE FIELD version ON TABLE customer_limit TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE customer_limit TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE customer_limit TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_customer_limit_term ON TABLE customer_limit \
    COLUMNS customer_id, term UNIQUE;

-- =======================================================================
-- Loan transactions
-- =======================================================================
DEFINE TABLE loan_transaction SCHEMAFULL;
DEFINE FIELD customer_id ON TABLE loan_transaction TYPE string;
DEFINE FIELD customer_limit_id ON TABLE loan_transaction TYPE string;
DEFINE FIELD asset_name ON TABLE loan_transaction TYPE string;
DEFINE FIELD contract_number ON TABLE loan_transaction TYPE string;
DEFINE FIELD is_done ON TABLE loan_transaction TYPE bool DEFAULT false;
DEFINE FIELD otr ON TABLE loan_transaction TYPE string;
DEFINE FIELD admin_fee ON TABLE loan_transaction TYPE string;
DEFINE FIELD total ON TABLE loan_transaction TYPE string;
DEFINE FIELD installment_amount ON TABLE loan_transaction TYPE string;
DEFINE FIELD installment_count ON TABLE loan_transaction TYPE int;
DEFINE FIELD total_interest ON TABLE loan_transaction TYPE string;
DEFINE FIELD created_at ON TABLE loan_transaction TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE loan_transaction TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_transaction_contract_number ON TABLE loan_transaction \
    COLUMNS contract_number UNIQUE;
DEFINE INDEX idx_transaction_customer ON TABLE loan_transaction \
    COLUMNS customer_id;
DEFINE INDEX idx_transaction_created ON TABLE loan_transaction \
    COLUMNS created_at;

-- =======================================================================
-- Transaction installments
-- =======================================================================
DEFINE TABLE transaction_installment SCHEMAFULL;
DEFINE FIELD transaction_id ON TABLE transaction_installment TYPE string;
DEFINE FIELD term ON TABLE transaction_installment TYPE int;
DEFINE FIELD due_date ON TABLE transaction_installment TYPE datetime;
DEFINE FIELD payment_at ON TABLE transaction_installment \
    TYPE option<datetime>;
DEFINE FIELD payment_method ON TABLE transaction_installment \
    TYPE option<string>;
DEFINE FIELD amount ON TABLE transaction_installment TYPE string;
DEFINE FIELD amount_paid ON TABLE transaction_installment TYPE string \
    DEFAULT '0';
DEFINE FIELD created_at ON TABLE transaction_installment TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE transaction_installment TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_installment_transaction_term \
    ON TABLE transaction_installment COLUMNS transaction_id, term UNIQUE;

-- =======================================================================
-- Global variables (fees and other tunables)
-- =======================================================================
DEFINE TABLE variable_global SCHEMAFULL;
DEFINE FIELD code ON TABLE variable_global TYPE string;
DEFINE FIELD value ON TABLE variable_global TYPE string;
DEFINE FIELD description ON TABLE variable_global TYPE option<string>;
DEFINE FIELD created_at ON TABLE variable_global TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE variable_global TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_variable_global_code ON TABLE variable_global \
    COLUMNS code UNIQUE;

-- =======================================================================
-- Staff users
-- =======================================================================
DEFINE TABLE staff_user SCHEMAFULL;
DEFINE FIELD name ON TABLE staff_user TYPE string;
DEFINE FIELD email ON TABLE staff_user TYPE string;
DEFINE FIELD password_hash ON TABLE staff_user TYPE string;
DEFINE FIELD is_active ON TABLE staff_user TYPE bool DEFAULT true;
DEFINE FIELD created_by ON TABLE staff_user TYPE option<string>;
DEFINE FIELD updated_by ON TABLE staff_user TYPE option<string>;
DEFINE FIELD created_at ON TABLE staff_user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE staff_user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_staff_user_email ON TABLE staff_user \
    COLUMNS email UNIQUE;
";

/// Apply all pending migrations.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(version = migration.version, "Migration applied");
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

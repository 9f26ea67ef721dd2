//! SurrealDB repository implementations.

mod customer;
mod customer_information_file;
mod customer_limit;
mod installment;
mod transaction;
mod user;
mod variable_global;

pub use customer::SurrealCustomerRepository;
pub use customer_information_file::SurrealCustomerInformationFileRepository;
pub use customer_limit::SurrealCustomerLimitRepository;
pub use installment::SurrealInstallmentRepository;
pub use transaction::SurrealTransactionRepository;
pub use user::SurrealUserRepository;
pub use variable_global::SurrealVariableGlobalRepository;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DbError;

pub(crate) fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}

pub(crate) fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, DbError> {
    Decimal::from_str(raw).map_err(|e| DbError::Decode(format!("invalid {field} amount: {e}")))
}

pub(crate) fn parse_optional_uuid(field: &str, raw: Option<String>) -> Result<Option<Uuid>, DbError> {
    raw.map(|s| parse_uuid(field, &s)).transpose()
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
pub(crate) fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Query(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| DbError::Query(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

//! Domain models for Tenor.
//!
//! These are the core types shared across all crates.

pub mod customer;
pub mod customer_information_file;
pub mod customer_limit;
pub mod installment;
pub mod transaction;
pub mod user;
pub mod variable_global;

/// Canonical form of an email address as stored and looked up.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

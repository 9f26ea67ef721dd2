//! Tenor Database - SurrealDB connection management, schema migrations
//! and repository implementations.
//!
//! This crate provides:
//! - Connection over `ws://` or `mem://` ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - Repository implementations of the `tenor-core` traits

mod connection;
mod error;
mod query;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbCredentials, DbManager};
pub use error::DbError;
pub use repository::{
    SurrealCustomerInformationFileRepository, SurrealCustomerLimitRepository,
    SurrealCustomerRepository, SurrealInstallmentRepository, SurrealTransactionRepository,
    SurrealUserRepository, SurrealVariableGlobalRepository,
};
pub use schema::{run_migrations, schema_v1};

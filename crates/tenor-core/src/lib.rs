//! Tenor Core: domain models, error types, predicates and repository
//! traits shared by every Tenor crate.

pub mod error;
pub mod filter;
pub mod models;
pub mod repository;
pub mod response;

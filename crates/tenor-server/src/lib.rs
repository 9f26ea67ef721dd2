//! Tenor service assembly: configuration, bootstrap and wiring of the
//! domain services over one SurrealDB connection.

pub mod app;
pub mod bootstrap;
pub mod config;

pub use app::App;
pub use config::ServiceConfig;

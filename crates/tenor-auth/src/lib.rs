//! Tenor Auth: password verification, JWT token pairs and the
//! sign-in / verify / refresh flows shared by customers and staff.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod subject;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, SignInInput, SignInOutput};
pub use subject::{CustomerDirectory, StaffDirectory, Subject, SubjectStore};
pub use token::{AccessClaims, RefreshClaims, TokenPair};

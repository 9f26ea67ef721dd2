//! Tenor Accounts: customer onboarding and self-service, staff users and
//! customer administration.

pub mod config;
pub mod credentials;
pub mod customers;
pub mod onboarding;
pub mod photo;
pub mod profile;
pub mod staff;

pub use config::OnboardingConfig;
pub use credentials::{ChangePassword, PasswordRules};
pub use customers::CustomerAdmin;
pub use onboarding::{CustomerOnboarding, SignUp};
pub use photo::{ImageKind, PhotoError};
pub use profile::CustomerProfiles;
pub use staff::StaffAccounts;

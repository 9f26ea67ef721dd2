//! Password rules shared by customer and staff self-service.

use serde::Deserialize;
use tenor_auth::AuthConfig;
use tenor_auth::error::AuthError;
use tenor_auth::password::{check_password_policy, verify_password};
use tenor_core::error::{TenorError, TenorResult};

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePassword {
    pub old_password: String,
    pub new_password: String,
}

/// Policy and pepper of one realm.
#[derive(Debug, Clone)]
pub struct PasswordRules {
    min_length: usize,
    pepper: Option<String>,
}

impl PasswordRules {
    pub fn new(min_length: usize, pepper: Option<String>) -> Self {
        Self { min_length, pepper }
    }

    pub fn from_auth(config: &AuthConfig) -> Self {
        Self::new(config.min_password_length, config.pepper.clone())
    }

    pub fn check_new(&self, password: &str) -> TenorResult<()> {
        Ok(check_password_policy(password, self.min_length)?)
    }

    /// Checks the old password against `hash` and the new one against the
    /// policy. Returns the new password.
    pub fn change<'a>(&self, hash: &str, input: &'a ChangePassword) -> TenorResult<&'a str> {
        if !verify_password(&input.old_password, hash, self.pepper.as_deref())? {
            return Err(AuthError::InvalidCredentials.into());
        }
        if input.old_password == input.new_password {
            return Err(TenorError::validation(
                "new password must differ from the old one",
            ));
        }
        self.check_new(&input.new_password)?;
        Ok(&input.new_password)
    }
}

/// Shape check only: `local@domain.tld`.
pub(crate) fn check_email(email: &str) -> TenorResult<()> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(TenorError::validation(format!("invalid email {email:?}")));
    }
    Ok(())
}

pub(crate) fn require(field: &str, value: &str) -> TenorResult<()> {
    if value.trim().is_empty() {
        return Err(TenorError::validation(format!("{field} is required")));
    }
    Ok(())
}

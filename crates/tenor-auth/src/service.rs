//! Authentication service: sign-in, token verification and refresh.

use tenor_core::error::TenorResult;
use tenor_core::models::normalize_email;
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::subject::{Subject, SubjectStore};
use crate::token::{self, TokenPair};

/// Input for the sign-in flow.
#[derive(Debug, Clone)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Successful sign-in result.
#[derive(Debug, Clone)]
pub struct SignInOutput<S> {
    pub subject: S,
    pub tokens: TokenPair,
}

/// Authentication service for one realm.
///
/// Generic over the subject directory so the same flows serve both
/// customers and staff.
pub struct AuthService<D: SubjectStore> {
    directory: D,
    config: AuthConfig,
}

impl<D: SubjectStore> AuthService<D> {
    pub fn new(directory: D, config: AuthConfig) -> Self {
        Self { directory, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    fn kind() -> &'static str {
        <D::Subject as Subject>::KIND
    }

    /// Authenticate with email + password and issue a token pair.
    pub async fn sign_in(&self, input: SignInInput) -> TenorResult<SignInOutput<D::Subject>> {
        // 1. Look up the subject by email.
        let subject = self
            .directory
            .find_by_email(&normalize_email(&input.email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // 2. Verify password.
        let valid = password::verify_password(
            &input.password,
            subject.password_hash(),
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            warn!(
                kind = Self::kind(),
                subject_id = %subject.id(),
                "Sign-in with wrong password"
            );
            return Err(AuthError::InvalidCredentials.into());
        }

        // 3. Only active accounts may sign in.
        if !subject.is_active() {
            return Err(AuthError::AccountInactive.into());
        }

        // 4. Issue tokens.
        let tokens = token::issue_token_pair(&subject, &self.config)?;
        info!(kind = Self::kind(), subject_id = %subject.id(), "Signed in");

        Ok(SignInOutput { subject, tokens })
    }

    /// Verify an access token and return the current state of its
    /// subject. Missing or inactive subjects are rejected even when the
    /// token itself is still valid.
    pub async fn verify(&self, access_token: &str) -> TenorResult<D::Subject> {
        let claims = token::decode_access::<D::Subject>(access_token, &self.config)?;
        let id = claims.subject.id();

        let subject = self
            .directory
            .find_by_id(id)
            .await?
            .ok_or(AuthError::SubjectNotFound)?;
        if !subject.is_active() {
            return Err(AuthError::AccountInactive.into());
        }
        Ok(subject)
    }

    /// Verify the bearer token of an `Authorization` header.
    pub async fn authenticate(&self, authorization: Option<&str>) -> TenorResult<D::Subject> {
        let access_token = token::bearer_token(authorization)?;
        self.verify(access_token).await
    }

    /// Exchange a refresh token for a fresh pair, re-reading the subject
    /// by the email the refresh token carries.
    pub async fn refresh(&self, refresh_token: &str) -> TenorResult<TokenPair> {
        let claims = token::decode_refresh::<D::Subject>(refresh_token, &self.config)?;

        let subject = self
            .directory
            .find_by_email(&claims.sub)
            .await?
            .ok_or(AuthError::SubjectNotFound)?;
        if !subject.is_active() {
            return Err(AuthError::AccountInactive.into());
        }

        let tokens = token::issue_token_pair(&subject, &self.config)?;
        info!(kind = Self::kind(), subject_id = %subject.id(), "Tokens refreshed");
        Ok(tokens)
    }
}

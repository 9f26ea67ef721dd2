//! HS256 access/refresh token pairs.
//!
//! Access and refresh tokens are signed with separate secrets and carry
//! separate lifetimes. The access token embeds a snapshot of the
//! subject; the refresh token carries only the subject's email.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::subject::Subject;

/// Claims of an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "S: Subject")]
pub struct AccessClaims<S> {
    /// Subject id (UUID string).
    pub sub: String,
    /// Realm, see [`Subject::KIND`].
    pub kind: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    /// Access token id.
    pub jti: String,
    pub authorized: bool,
    /// Snapshot of the subject at issue time.
    pub subject: S,
}

/// Claims of a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject email.
    pub sub: String,
    pub kind: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    /// `{access jti}++{email}`, tying the pair together.
    pub jti: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenPair {
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Issue a signed access/refresh pair for `subject`.
pub fn issue_token_pair<S: Subject>(subject: &S, config: &AuthConfig) -> Result<TokenPair, AuthError> {
    let now = Utc::now();
    let access_expires_at = now + Duration::seconds(config.access_token_lifetime_secs as i64);
    let refresh_expires_at = now + Duration::seconds(config.refresh_token_lifetime_secs as i64);
    let access_id = Uuid::new_v4().to_string();

    let access = AccessClaims {
        sub: subject.id().to_string(),
        kind: S::KIND.to_string(),
        iss: config.jwt_issuer.clone(),
        iat: now.timestamp(),
        exp: access_expires_at.timestamp(),
        jti: access_id.clone(),
        authorized: true,
        subject: subject.clone(),
    };
    let refresh = RefreshClaims {
        sub: subject.email().to_string(),
        kind: S::KIND.to_string(),
        iss: config.jwt_issuer.clone(),
        iat: now.timestamp(),
        exp: refresh_expires_at.timestamp(),
        jti: format!("{access_id}++{}", subject.email()),
    };

    Ok(TokenPair {
        access_token: sign(&access, &config.access_secret)?,
        access_expires_at,
        refresh_token: sign(&refresh, &config.refresh_secret)?,
        refresh_expires_at,
    })
}

/// Verify signature, expiry, issuer and realm of an access token.
pub fn decode_access<S: Subject>(token: &str, config: &AuthConfig) -> Result<AccessClaims<S>, AuthError> {
    let claims: AccessClaims<S> = verify(token, &config.access_secret, config)?;
    if claims.kind != S::KIND || !claims.authorized {
        return Err(AuthError::TokenInvalid("wrong token realm".into()));
    }
    Ok(claims)
}

/// Verify signature, expiry, issuer and realm of a refresh token.
pub fn decode_refresh<S: Subject>(token: &str, config: &AuthConfig) -> Result<RefreshClaims, AuthError> {
    let claims: RefreshClaims = verify(token, &config.refresh_secret, config)?;
    if claims.kind != S::KIND {
        return Err(AuthError::TokenInvalid("wrong token realm".into()));
    }
    Ok(claims)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?;
    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;
    Ok(token)
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Crypto("signing secret is not configured".into()));
    }
    let key = EncodingKey::from_secret(secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

fn verify<T: serde::de::DeserializeOwned>(
    token: &str,
    secret: &str,
    config: &AuthConfig,
) -> Result<T, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    jsonwebtoken::decode::<T>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

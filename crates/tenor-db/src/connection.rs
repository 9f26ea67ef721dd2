//! Opening the SurrealDB client.
//!
//! The endpoint scheme picks the engine: `ws://` / `wss://` for a
//! server, `mem://` for an in-process store used in development.

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub endpoint: String,
    pub namespace: String,
    pub database: String,
    /// Root sign-in. Not used for `mem://`.
    pub credentials: Option<DbCredentials>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbCredentials {
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://127.0.0.1:8000".into(),
            namespace: "tenor".into(),
            database: "lending".into(),
            credentials: Some(DbCredentials {
                username: "root".into(),
                password: "root".into(),
            }),
        }
    }
}

impl DbConfig {
    pub fn is_embedded(&self) -> bool {
        self.endpoint.starts_with("mem://")
    }
}

/// Owns the client; repositories take clones of it.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Any>,
}

impl DbManager {
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            endpoint = %config.endpoint,
            namespace = %config.namespace,
            database = %config.database,
            "Opening SurrealDB"
        );
        let db = any::connect(config.endpoint.as_str()).await?;

        match &config.credentials {
            Some(credentials) if !config.is_embedded() => {
                db.signin(Root {
                    username: credentials.username.clone(),
                    password: credentials.password.clone(),
                })
                .await?;
            }
            _ => {}
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;
        Ok(Self { db })
    }

    pub fn client(&self) -> Surreal<Any> {
        self.db.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embedded_endpoint_skips_sign_in() {
        let config = DbConfig {
            endpoint: "mem://".into(),
            ..DbConfig::default()
        };
        assert!(config.is_embedded());

        let manager = DbManager::connect(&config).await.unwrap();
        crate::run_migrations(&manager.client()).await.unwrap();
    }

    #[test]
    fn server_endpoint_is_not_embedded() {
        assert!(!DbConfig::default().is_embedded());
    }
}

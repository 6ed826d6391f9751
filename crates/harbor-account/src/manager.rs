// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account operations over the database facade.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use harbor_core::{Conditions, InsertRequest, QueryOptions, TableAdapter};
use harbor_db::entities::USER_INFO;
use harbor_db::Database;

use crate::error::AccountError;
use crate::hash;
use crate::model::{CreateAccountParams, UserRecord};

/// Registration, authentication, and lookup for user accounts.
pub struct AccountManager {
    db: Arc<Database>,
    server_secret: String,
}

impl AccountManager {
    pub fn new(db: Arc<Database>, server_secret: impl Into<String>) -> Self {
        Self {
            db,
            server_secret: server_secret.into(),
        }
    }

    async fn users(&self) -> Result<Arc<dyn TableAdapter>, AccountError> {
        Ok(self.db.get(USER_INFO).await?)
    }

    /// Register a new account. The username must be free; the stored
    /// password is the Argon2id hash of the given one.
    pub async fn create_account(
        &self,
        params: CreateAccountParams,
    ) -> Result<UserRecord, AccountError> {
        params.validate()?;
        let users = self.users().await?;

        let taken = users
            .get_all(
                QueryOptions::new()
                    .conditions(Conditions::new().eq("username", json!(params.username)))
                    .select(["username"])
                    .limit(1),
            )
            .await?;
        if !taken.is_empty() {
            debug!(username = %params.username, "registration rejected, username taken");
            return Err(AccountError::UsernameTaken);
        }

        let password_hash = hash::hash_password(&params.password)?;
        let username = params.username.clone();
        let mut inserted = users
            .insert(InsertRequest::row(params.into_entity(password_hash)))
            .await?;
        let entity = inserted.pop().ok_or_else(|| {
            AccountError::Storage(harbor_core::DbError::QueryExecution(
                "insert returned no rows".into(),
            ))
        })?;
        let record = UserRecord::from_entity(entity)?;
        info!(username = %username, id = %record.id, "account created");
        Ok(record)
    }

    /// Check credentials; unknown username and wrong password are the same
    /// error.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserRecord, AccountError> {
        let users = self.users().await?;
        let mut rows = users
            .get_all(
                QueryOptions::new()
                    .conditions(Conditions::new().eq("username", json!(username)))
                    .limit(1),
            )
            .await?;
        let Some(entity) = rows.pop() else {
            return Err(AccountError::InvalidCredentials);
        };
        let record = UserRecord::from_entity(entity)?;
        if !hash::verify_password(password, &record.password)? {
            return Err(AccountError::InvalidCredentials);
        }
        Ok(record)
    }

    /// Look an account up by id; absence is not an error.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, AccountError> {
        let users = self.users().await?;
        let mut rows = users
            .get_all(
                QueryOptions::new()
                    .conditions(Conditions::new().eq("id", json!(id)))
                    .limit(1),
            )
            .await?;
        rows.pop().map(UserRecord::from_entity).transpose()
    }

    /// The per-user derived key handed to clients at login.
    pub fn client_key(&self, user: &UserRecord) -> String {
        hash::client_key(&user.id, &self.server_secret, &user.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harbor_config::{StorageBackend, StorageConfig};
    use tempfile::tempdir;

    fn database(dir: &std::path::Path) -> Arc<Database> {
        Arc::new(Database::new(StorageConfig {
            backend: StorageBackend::Sqlite,
            data_dir: dir.to_string_lossy().into_owned(),
            ..StorageConfig::default()
        }))
    }

    fn manager(dir: &std::path::Path) -> AccountManager {
        AccountManager::new(database(dir), "test-server-secret")
    }

    fn alice() -> CreateAccountParams {
        CreateAccountParams {
            name: "Alice".into(),
            email: Some("alice@example.com".into()),
            username: "alice".into(),
            password: "hunter22".into(),
        }
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let dir = tempdir().unwrap();
        let manager = manager(dir.path());

        let created = manager.create_account(alice()).await.unwrap();
        assert!(!created.id.is_empty());
        assert!(created.password.starts_with("$argon2"));

        let authed = manager.authenticate("alice", "hunter22").await.unwrap();
        assert_eq!(authed, created);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let dir = tempdir().unwrap();
        let manager = manager(dir.path());
        manager.create_account(alice()).await.unwrap();

        let mut second = alice();
        second.email = None;
        let err = manager.create_account(second).await.unwrap_err();
        assert!(matches!(err, AccountError::UsernameTaken));
    }

    #[tokio::test]
    async fn bad_password_and_unknown_user_are_indistinguishable() {
        let dir = tempdir().unwrap();
        let manager = manager(dir.path());
        manager.create_account(alice()).await.unwrap();

        let wrong = manager.authenticate("alice", "not-it").await.unwrap_err();
        let unknown = manager.authenticate("nobody", "hunter22").await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(wrong, AccountError::InvalidCredentials));
    }

    #[tokio::test]
    async fn find_by_id_distinguishes_absent_from_error() {
        let dir = tempdir().unwrap();
        let manager = manager(dir.path());
        let created = manager.create_account(alice()).await.unwrap();

        let found = manager.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert!(manager.find_by_id("no-such-id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_params_never_reach_storage() {
        let dir = tempdir().unwrap();
        let manager = manager(dir.path());
        let mut bad = alice();
        bad.password = "short".into();
        let err = manager.create_account(bad).await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidParams(_)));
        assert!(!dir.path().join("user_info.db").exists());
    }

    #[tokio::test]
    async fn client_key_is_per_user() {
        let dir = tempdir().unwrap();
        let manager = manager(dir.path());
        let a = manager.create_account(alice()).await.unwrap();
        let mut params = alice();
        params.username = "bob".into();
        let b = manager.create_account(params).await.unwrap();

        assert_ne!(manager.client_key(&a), manager.client_key(&b));
        assert_eq!(manager.client_key(&a), manager.client_key(&a));
    }
}

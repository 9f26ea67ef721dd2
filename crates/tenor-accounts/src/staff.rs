//! Staff user management.

use tenor_core::error::{TenorError, TenorResult};
use tenor_core::filter::Filter;
use tenor_core::models::normalize_email;
use tenor_core::models::user::{CreateUser, UpdateUser, User};
use tenor_core::repository::{PaginatedResult, Pagination, UserRepository};
use tracing::info;
use uuid::Uuid;

use crate::credentials::{ChangePassword, PasswordRules, check_email, require};

pub struct StaffAccounts<U> {
    users: U,
    passwords: PasswordRules,
}

impl<U: UserRepository> StaffAccounts<U> {
    pub fn new(users: U, passwords: PasswordRules) -> Self {
        Self { users, passwords }
    }

    /// Create an active staff user. `created_by` is `None` for self
    /// sign-up.
    pub async fn create(&self, input: CreateUser) -> TenorResult<User> {
        require("name", &input.name)?;
        check_email(&input.email)?;
        self.passwords.check_new(&input.password)?;

        let user = self
            .users
            .create(CreateUser {
                name: input.name.trim().to_string(),
                email: normalize_email(&input.email),
                ..input
            })
            .await?;
        info!(user_id = %user.id, created_by = ?user.created_by, "Staff user created");
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> TenorResult<User> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or_else(|| TenorError::not_found("staff_user", id))
    }

    pub async fn list(
        &self,
        pagination: Pagination,
        filter: Filter,
    ) -> TenorResult<PaginatedResult<User>> {
        self.users.list(pagination, filter).await
    }

    pub async fn update(&self, id: Uuid, input: UpdateUser) -> TenorResult<User> {
        if let Some(name) = &input.name {
            require("name", name)?;
        }
        let mut input = input;
        if let Some(email) = input.email.as_mut() {
            check_email(email)?;
            *email = normalize_email(email);
        }
        if let Some(password) = &input.password {
            self.passwords.check_new(password)?;
        }
        let user = self.users.update(id, input).await?;
        info!(user_id = %id, updated_by = ?user.updated_by, "Staff user updated");
        Ok(user)
    }

    /// Self-service profile edit; the active flag and password are left
    /// untouched.
    pub async fn update_profile(&self, id: Uuid, input: UpdateUser) -> TenorResult<User> {
        self.update(
            id,
            UpdateUser {
                is_active: None,
                password: None,
                updated_by: Some(id),
                ..input
            },
        )
        .await
    }

    pub async fn change_password(&self, id: Uuid, input: ChangePassword) -> TenorResult<()> {
        let user = self.get(id).await?;
        let password = self.passwords.change(&user.password_hash, &input)?;
        self.users
            .update(
                id,
                UpdateUser {
                    password: Some(password.to_string()),
                    updated_by: Some(id),
                    ..Default::default()
                },
            )
            .await?;
        info!(user_id = %id, "Staff password changed");
        Ok(())
    }

    /// Soft delete: the user is deactivated.
    pub async fn delete(&self, id: Uuid) -> TenorResult<()> {
        self.users.delete(id).await?;
        info!(user_id = %id, "Staff user deactivated");
        Ok(())
    }

    pub async fn delete_many(&self, ids: &[Uuid]) -> TenorResult<()> {
        if ids.is_empty() {
            return Err(TenorError::validation("at least one id is required"));
        }
        for id in ids {
            self.delete(*id).await?;
        }
        Ok(())
    }
}

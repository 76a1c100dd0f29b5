//! Admin account storage.

use chrono::Utc;
use sqlx::{Row, Sqlite, Transaction};
use thiserror::Error;

use super::Repository;
use crate::auth::{hash_password, verify_password};
use crate::models::{
    AdminUser, CreateUserRequest, CredentialRecord, Role, UpdateUserRequest, UserStatus,
};
use crate::validation::{
    char_len, is_valid_email, MAX_NAME_LEN, MAX_USERNAME_LEN, MIN_PASSWORD_LEN, MIN_USERNAME_LEN,
};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("User {0} not found")]
    NotFound(i64),
    #[error("Username '{0}' already exists")]
    DuplicateUsername(String),
    #[error("Cannot remove the last active admin user")]
    LastAdminProtected,
    #[error("Username must be 3-100 characters")]
    InvalidUsername,
    #[error("Password must be at least 6 characters")]
    WeakPassword,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Invalid role '{0}'")]
    InvalidRole(String),
    #[error("Invalid status '{0}'")]
    InvalidStatus(String),
    #[error("{0}")]
    Hash(String),
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl CredentialRecord {
    pub fn verify_password(&self, plaintext: &str) -> bool {
        verify_password(plaintext, &self.password_hash)
    }
}

const USER_COLUMNS: &str = "id, username, name, email, role, status, created_at";

impl Repository {
    /// Number of accounts, active or not.
    pub async fn count_users(&self) -> Result<i64, CredentialError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// List all accounts, newest first.
    pub async fn list_users(&self) -> Result<Vec<AdminUser>, CredentialError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM admin_users ORDER BY created_at DESC, id DESC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    pub async fn find_user(&self, id: i64) -> Result<Option<AdminUser>, CredentialError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM admin_users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    pub async fn find_credential_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, CredentialError> {
        let row = sqlx::query(&format!(
            "SELECT {}, password_hash FROM admin_users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| CredentialRecord {
            user: user_from_row(&row),
            password_hash: row.get("password_hash"),
        }))
    }

    /// Create an active account. The password is stored only as an Argon2id hash.
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<AdminUser, CredentialError> {
        let username = request.username.trim();
        let name = request.name.trim();
        let email = request.email.trim();

        let username_len = char_len(username);
        if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&username_len) {
            return Err(CredentialError::InvalidUsername);
        }
        if char_len(&request.password) < MIN_PASSWORD_LEN {
            return Err(CredentialError::WeakPassword);
        }
        if !email.is_empty() && !is_valid_email(email) {
            return Err(CredentialError::InvalidEmail);
        }
        let role = match request.role.as_deref() {
            None => Role::Editor,
            Some(raw) => Role::parse(raw).ok_or_else(|| CredentialError::InvalidRole(raw.to_string()))?,
        };
        let name = truncate_chars(name, MAX_NAME_LEN);

        if self.find_credential_by_username(username).await?.is_some() {
            return Err(CredentialError::DuplicateUsername(username.to_string()));
        }

        let password_hash = hash_password(&request.password).map_err(CredentialError::Hash)?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO admin_users (username, password_hash, name, email, role, status, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(username)
        .bind(&password_hash)
        .bind(&name)
        .bind(email)
        .bind(role.as_str())
        .bind(UserStatus::Active.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                CredentialError::DuplicateUsername(username.to_string())
            }
            other => CredentialError::Persistence(other),
        })?;

        Ok(AdminUser {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            name,
            email: email.to_string(),
            role,
            status: UserStatus::Active,
            created_at: now,
        })
    }

    /// Update profile fields, role, status or password.
    pub async fn update_user(
        &self,
        id: i64,
        request: &UpdateUserRequest,
    ) -> Result<AdminUser, CredentialError> {
        let role = request
            .role
            .as_deref()
            .map(|raw| Role::parse(raw).ok_or_else(|| CredentialError::InvalidRole(raw.to_string())))
            .transpose()?;
        let status = request
            .status
            .as_deref()
            .map(|raw| {
                UserStatus::parse(raw).ok_or_else(|| CredentialError::InvalidStatus(raw.to_string()))
            })
            .transpose()?;
        let email = request.email.as_deref().map(str::trim);
        if let Some(email) = email {
            if !email.is_empty() && !is_valid_email(email) {
                return Err(CredentialError::InvalidEmail);
            }
        }
        let password_hash = match request.password.as_deref() {
            Some(pw) if char_len(pw) < MIN_PASSWORD_LEN => return Err(CredentialError::WeakPassword),
            Some(pw) => Some(hash_password(pw).map_err(CredentialError::Hash)?),
            None => None,
        };

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM admin_users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let existing = row
            .as_ref()
            .map(user_from_row)
            .ok_or(CredentialError::NotFound(id))?;

        let updated = AdminUser {
            name: request
                .name
                .as_deref()
                .map(|n| truncate_chars(n.trim(), MAX_NAME_LEN))
                .unwrap_or_else(|| existing.name.clone()),
            email: email.map(str::to_string).unwrap_or_else(|| existing.email.clone()),
            role: role.unwrap_or(existing.role),
            status: status.unwrap_or(existing.status),
            ..existing.clone()
        };

        if is_active_admin(&existing) && !is_active_admin(&updated) {
            ensure_other_active_admin(&mut tx).await?;
        }

        sqlx::query("UPDATE admin_users SET name = ?, email = ?, role = ?, status = ? WHERE id = ?")
            .bind(&updated.name)
            .bind(&updated.email)
            .bind(updated.role.as_str())
            .bind(updated.status.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(hash) = password_hash {
            sqlx::query("UPDATE admin_users SET password_hash = ? WHERE id = ?")
                .bind(&hash)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete an account unless it is the only active admin.
    pub async fn delete_user(&self, id: i64) -> Result<(), CredentialError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM admin_users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let target = row
            .as_ref()
            .map(user_from_row)
            .ok_or(CredentialError::NotFound(id))?;

        if is_active_admin(&target) {
            ensure_other_active_admin(&mut tx).await?;
        }

        sqlx::query("DELETE FROM admin_users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn is_active_admin(user: &AdminUser) -> bool {
    user.role == Role::Admin && user.status == UserStatus::Active
}

/// Fails unless more than one active admin exists, so one may be removed.
async fn ensure_other_active_admin(
    tx: &mut Transaction<'_, Sqlite>,
) -> Result<(), CredentialError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM admin_users WHERE role = 'Admin' AND status = 'Active'",
    )
    .fetch_one(&mut **tx)
    .await?;

    if count <= 1 {
        return Err(CredentialError::LastAdminProtected);
    }
    Ok(())
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> AdminUser {
    let role: String = row.get("role");
    let status: String = row.get("status");
    AdminUser {
        id: row.get("id"),
        username: row.get("username"),
        name: row.get("name"),
        email: row.get("email"),
        role: Role::parse(&role).unwrap_or(Role::Editor),
        status: UserStatus::parse(&status).unwrap_or(UserStatus::Inactive),
        created_at: row.get("created_at"),
    }
}

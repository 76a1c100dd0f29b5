//! Session authentication for the admin API.
//!
//! Logins exchange credentials for a signed token. Every admin request presents the
//! token as a bearer header; the account is re-read on each request so deactivated or
//! deleted users lose access even while their token has not expired.

mod password;
mod token;

pub use password::{hash_password, verify_dummy, verify_password};
pub use token::{TokenCodec, TokenError, TokenIdentity, TOKEN_TTL_SECS};

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::db::{CredentialError, Repository};
use crate::errors::AppError;
use crate::models::{AdminUser, Role};
use crate::AppState;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("Missing or malformed Authorization header")]
    MissingOrMalformedHeader,
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken(#[source] TokenError),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account is inactive")]
    AccountInactive,
    #[error("User not found")]
    UserNotFound,
    #[error("Insufficient role")]
    InsufficientRole,
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Checks credentials at login and bearer tokens on every admin request.
pub struct SessionGuard<'a> {
    repo: &'a Repository,
    tokens: &'a TokenCodec,
}

impl<'a> SessionGuard<'a> {
    pub fn new(repo: &'a Repository, tokens: &'a TokenCodec) -> Self {
        Self { repo, tokens }
    }

    /// Exchange a username and password for a session token.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(String, AdminUser), AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let Some(record) = self.repo.find_credential_by_username(username).await? else {
            verify_dummy(password);
            return Err(AuthError::InvalidCredentials);
        };

        if !record.verify_password(password) {
            return Err(AuthError::InvalidCredentials);
        }
        if !record.user.is_active() {
            return Err(AuthError::AccountInactive);
        }

        let token = self.tokens.issue(record.user.id, &record.user.username);
        Ok((token, record.user))
    }

    /// Resolve the `Authorization` header to a currently active account.
    pub async fn authorize(&self, header: Option<&str>) -> Result<AdminUser, AuthError> {
        let token = header
            .and_then(parse_bearer)
            .ok_or(AuthError::MissingOrMalformedHeader)?;

        let identity = self
            .tokens
            .verify(token)
            .map_err(AuthError::InvalidOrExpiredToken)?;

        let user = self
            .repo
            .find_user(identity.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active() {
            return Err(AuthError::AccountInactive);
        }
        Ok(user)
    }
}

/// Extract the token from `Bearer <token>`. The scheme is case-insensitive.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let header = header.trim();
    let (scheme, rest) = header.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

/// Perform constant-time string comparison.
pub(crate) fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    // Constant-time comparison
    a_bytes.ct_eq(b_bytes).into()
}

/// An authenticated admin request. Taking this extractor makes a handler require a
/// valid bearer token for an active account.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub user: AdminUser,
}

impl AdminSession {
    pub fn require_role(&self, role: Role) -> Result<(), AuthError> {
        if self.user.role == role {
            Ok(())
        } else {
            Err(AuthError::InsufficientRole)
        }
    }
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let guard = SessionGuard::new(&state.repo, &state.tokens);
        match guard.authorize(header).await {
            Ok(user) => Ok(AdminSession { user }),
            Err(AuthError::Credential(e)) => Err(e.into()),
            Err(e) => {
                tracing::info!("Rejected admin request: {}", describe_rejection(&e));
                Err(AppError::Unauthorized(e.to_string()))
            }
        }
    }
}

fn describe_rejection(err: &AuthError) -> String {
    match err {
        AuthError::InvalidOrExpiredToken(inner) => format!("{} ({})", err, inner),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(parse_bearer("bearer   abc"), Some("abc"));
        assert_eq!(parse_bearer("BEARER abc "), Some("abc"));
        assert_eq!(parse_bearer("Bearer"), None);
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("Basic abc"), None);
        assert_eq!(parse_bearer("abc.def.ghi"), None);
        assert_eq!(parse_bearer("Bearer a b"), None);
    }

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
    }

    #[test]
    fn test_constant_time_compare_different_lengths() {
        assert!(!constant_time_compare("short", "much-longer-key"));
    }

    #[test]
    fn test_constant_time_compare_empty() {
        assert!(constant_time_compare("", ""));
        assert!(!constant_time_compare("", "not-empty"));
    }
}

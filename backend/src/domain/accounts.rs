//! Account boundary: registration and credential checks.
//!
//! Authentication proper (session issuance, cookie handling) lives in the
//! HTTP adapter; this service only owns the store-facing half of the
//! contract: unique lower-cased emails, the password digest scheme, and
//! the opaque user id handed to the rest of the core.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use super::error::Error;
use super::ids::UserId;
use super::ports::{UserRepository, UserRepositoryError};
use super::riders::Gender;
use super::ApiResult;

/// A registered account as seen by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub id: UserId,
    pub name: String,
}

/// Validated registration handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_digest: String,
    pub gender: Gender,
}

/// SHA-256 hex digest of a password.
///
/// A stand-in scheme at this boundary; session issuance and credential
/// policy belong to the outer deployment.
pub fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Account registration and credential-check service.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    /// When set, registration emails must end with `@<domain>`.
    email_domain: Option<String>,
}

impl AccountService {
    /// Create a new service; `email_domain` optionally restricts sign-ups
    /// to one campus domain.
    pub fn new(users: Arc<dyn UserRepository>, email_domain: Option<String>) -> Self {
        Self {
            users,
            email_domain,
        }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// `invalid_request` for missing or malformed fields, `conflict` when
    /// the email is already registered.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        gender: &str,
    ) -> ApiResult<UserId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::invalid_request("name is required")
                .with_details(json!({ "field": "name", "code": "missing_field" })));
        }
        let email = self.validate_email(email)?;
        if password.is_empty() {
            return Err(Error::invalid_request("password is required")
                .with_details(json!({ "field": "password", "code": "missing_field" })));
        }
        let gender = Gender::parse(gender).ok_or_else(|| {
            Error::invalid_request("gender must be M or F")
                .with_details(json!({ "field": "gender", "value": gender }))
        })?;

        let account = NewAccount {
            name: name.to_owned(),
            email,
            password_digest: password_digest(password),
            gender,
        };
        self.users.create(&account).map_err(map_user_repo_error)
    }

    /// Check credentials and return the account profile.
    ///
    /// # Errors
    ///
    /// `unauthorized` when the email/password pair matches no account.
    pub fn login(&self, email: &str, password: &str) -> ApiResult<AccountProfile> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(Error::invalid_request("email and password are required"));
        }
        self.users
            .find_by_credentials(&email, &password_digest(password))
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::unauthorized("invalid credentials"))
    }

    fn validate_email(&self, raw: &str) -> ApiResult<String> {
        let email = raw.trim().to_lowercase();
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !well_formed {
            return Err(Error::invalid_request("a valid email address is required")
                .with_details(json!({ "field": "email", "value": raw })));
        }
        if let Some(domain) = &self.email_domain {
            if !email.ends_with(&format!("@{domain}")) {
                return Err(Error::invalid_request(format!(
                    "registration requires an @{domain} email address"
                ))
                .with_details(json!({ "field": "email", "requiredDomain": domain })));
            }
        }
        Ok(email)
    }
}

fn map_user_repo_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::DuplicateEmail => Error::conflict("email already registered"),
        UserRepositoryError::Connection { message } | UserRepositoryError::Query { message } => {
            Error::internal(format!("user store failure: {message}"))
        }
    }
}

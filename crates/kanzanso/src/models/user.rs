//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Document;
use crate::validate;

/// A registered account.
///
/// Only the password hash is stored. Use [`UserView`] for anything
/// that leaves the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Lower-cased email address.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// When it was created.
    pub created_at: DateTime<Utc>,
    /// When it was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }

    // A user owns its own record, so deleting everything a user owns
    // removes the account as well.
    fn owner_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

/// Public representation of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// When it was created.
    pub created_at: DateTime<Utc>,
    /// When it was last changed.
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Plain-text password. Never stored.
    pub password: String,
}

impl NewUser {
    /// Check field constraints.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate::required("name", &self.name, 100)?;
        validate::email("email", &self.email)?;
        validate::length_between("password", &self.password, 6, 100)
    }
}

/// Partial account update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New email address. Must not be taken.
    pub email: Option<String>,
    /// New password, hashed before storing.
    pub password: Option<String>,
}

impl UserUpdate {
    /// Check constraints on the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate::required("name", name, 100)?;
        }
        if let Some(email) = &self.email {
            validate::email("email", email)?;
        }
        if let Some(password) = &self.password {
            validate::length_between("password", password, 6, 100)?;
        }
        Ok(())
    }
}

/// Login payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Plain-text password. Never stored.
    pub password: String,
}

impl LoginRequest {
    /// Check field constraints.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate::email("email", &self.email)?;
        validate::length_between("password", &self.password, 6, 100)
    }
}

/// Successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// User id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Bearer token for later requests.
    pub token: String,
}

//! User directory capability consumed by the account resolver.
//!
//! The directory owns user records. Signup only needs two operations from it:
//! an equality query on `(user_name, origin)` and account creation. Uniqueness
//! of `(user_name, origin)` is the directory's contract; a create that loses a
//! race against a concurrent signup must fail with
//! [`DirectoryError::AlreadyExists`] so callers can fall back to the existing
//! record.

use async_trait::async_trait;
use secrecy::SecretString;
use std::error::Error as StdError;
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryDirectory;
pub use postgres::PgDirectory;

/// Origin name for accounts managed by this system's own directory.
pub const INTERNAL_ORIGIN: &str = "uaa";

/// Where an account's credentials live.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AuthOrigin {
    /// Managed by this directory.
    Internal,
    /// Federated from an external identity provider, keyed by provider name.
    Federated(String),
}

impl AuthOrigin {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Internal => INTERNAL_ORIGIN,
            Self::Federated(name) => name,
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name == INTERNAL_ORIGIN {
            Self::Internal
        } else {
            Self::Federated(name.to_string())
        }
    }
}

/// A user record as seen by signup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserAccount {
    /// Directory-assigned identifier; empty until the account is created.
    pub id: String,
    pub user_name: String,
    pub primary_email: String,
    pub origin: AuthOrigin,
    pub verified: bool,
    pub active: bool,
}

impl UserAccount {
    /// A fresh self-service account: internal, unverified and inactive, with the
    /// email used as both login name and primary contact.
    #[must_use]
    pub fn unverified(email: &str) -> Self {
        Self {
            id: String::new(),
            user_name: email.to_string(),
            primary_email: email.to_string(),
            origin: AuthOrigin::Internal,
            verified: false,
            active: false,
        }
    }
}

/// Structured equality filter on login name and origin (case-sensitive).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserFilter {
    pub user_name: String,
    pub origin: AuthOrigin,
}

impl UserFilter {
    #[must_use]
    pub fn internal(user_name: &str) -> Self {
        Self {
            user_name: user_name.to_string(),
            origin: AuthOrigin::Internal,
        }
    }

    #[must_use]
    pub fn matches(&self, account: &UserAccount) -> bool {
        account.user_name == self.user_name && account.origin == self.origin
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("user already exists: {0}")]
    AlreadyExists(String),
    #[error("user directory unavailable: {0}")]
    Unavailable(#[source] Box<dyn StdError + Send + Sync + 'static>),
}

impl DirectoryError {
    pub fn unavailable(err: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self::Unavailable(err.into())
    }
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Return every account matching `filter`, oldest first.
    async fn query(&self, filter: &UserFilter) -> Result<Vec<UserAccount>, DirectoryError>;

    /// Persist `account` with `password` and return it with its id assigned.
    ///
    /// # Errors
    /// [`DirectoryError::AlreadyExists`] when `(user_name, origin)` is taken.
    async fn create(
        &self,
        account: UserAccount,
        password: &SecretString,
    ) -> Result<UserAccount, DirectoryError>;

    /// Cheap liveness probe used by `/health`.
    async fn health(&self) -> Result<(), DirectoryError> {
        Ok(())
    }
}

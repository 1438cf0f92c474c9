//! Decides whether a signup creates, reuses, or conflicts with an account.

use super::error::SignupError;
use crate::directory::{DirectoryError, UserAccount, UserDirectory, UserFilter};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Outcome of resolving an email against the directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// No account existed; a new unverified one was created.
    Created(UserAccount),
    /// An unverified account already existed and is reused unchanged.
    Reused(UserAccount),
    /// A verified account already owns the email.
    Conflict,
}

impl Resolution {
    #[must_use]
    pub fn account(&self) -> Option<&UserAccount> {
        match self {
            Self::Created(account) | Self::Reused(account) => Some(account),
            Self::Conflict => None,
        }
    }
}

#[derive(Clone)]
pub struct AccountResolver {
    directory: Arc<dyn UserDirectory>,
}

impl AccountResolver {
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve `email` to an account that may receive a verification code.
    ///
    /// The directory is queried on `(email, internal origin)`; the first match
    /// is authoritative. `create` is called at most once and only when nothing
    /// matched. A create that loses a uniqueness race is resolved by one
    /// re-query against the winning record.
    ///
    /// # Errors
    /// [`SignupError::DirectoryUnavailable`] when the directory fails.
    #[instrument(skip(self, password))]
    pub async fn resolve(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Resolution, SignupError> {
        let filter = UserFilter::internal(email);
        let matches = self.directory.query(&filter).await?;

        if let Some(resolution) = decide(matches) {
            return Ok(resolution);
        }

        match self
            .directory
            .create(UserAccount::unverified(email), password)
            .await
        {
            Ok(account) => {
                debug!(user_id = %account.id, "created unverified account");
                Ok(Resolution::Created(account))
            }
            Err(DirectoryError::AlreadyExists(name)) => {
                warn!("concurrent signup created the account first, re-querying");
                let matches = self.directory.query(&filter).await?;
                decide(matches).ok_or_else(|| DirectoryError::AlreadyExists(name).into())
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl std::fmt::Debug for AccountResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountResolver").finish_non_exhaustive()
    }
}

/// Apply the non-empty rows of the decision table; `None` means "create".
fn decide(matches: Vec<UserAccount>) -> Option<Resolution> {
    if matches.len() > 1 {
        // Uniqueness should make this impossible; keep the first record.
        warn!(matches = matches.len(), "multiple accounts share one identifier");
    }
    let existing = matches.into_iter().next()?;
    if existing.verified {
        debug!(user_id = %existing.id, "account already verified");
        Some(Resolution::Conflict)
    } else {
        debug!(user_id = %existing.id, "reusing unverified account");
        Some(Resolution::Reused(existing))
    }
}

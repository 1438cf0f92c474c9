//! Account creation and verification-code issuance.
//!
//! [`SignupService::handle_signup`] composes two steps:
//!
//! 1. [`AccountResolver`] looks the email up in the [`UserDirectory`] and
//!    either creates an unverified account, reuses an unverified one, or
//!    reports a conflict with an already verified account.
//! 2. [`VerificationIssuer`] asks the [`ExpiringCodeStore`] for a code bound
//!    to `{"user_id":..,"client_id":..}` that expires after the configured
//!    lifetime (30 minutes by default).
//!
//! Nothing is rolled back when step 2 fails after step 1 created an account:
//! the account stays unverified and inactive, and a retried signup with the
//! same email reuses it.

mod config;
mod error;
mod issuer;
mod payload;
mod resolver;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{SignupConfig, DEFAULT_CODE_TTL_SECONDS, MAX_CODE_TTL_SECONDS};
pub use error::SignupError;
pub use issuer::{IssuedVerification, VerificationIssuer};
pub use payload::VerificationPayload;
pub use resolver::{AccountResolver, Resolution};

use crate::codestore::ExpiringCodeStore;
use crate::directory::UserDirectory;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// A self-service signup attempt.
#[derive(Debug)]
pub struct SignupRequest {
    pub email: String,
    pub password: SecretString,
    pub client_id: String,
}

impl SignupRequest {
    #[must_use]
    pub fn new(email: impl Into<String>, password: SecretString, client_id: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password,
            client_id: client_id.into(),
        }
    }

    fn validate(&self) -> Result<(), SignupError> {
        if self.email.trim().is_empty() {
            return Err(SignupError::InvalidRequest("missing email"));
        }
        if self.client_id.trim().is_empty() {
            return Err(SignupError::InvalidRequest("missing client_id"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignupOutcome {
    Created(IssuedVerification),
    Conflict,
}

/// Liveness of both collaborators, as reported by their probes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthReport {
    pub directory: bool,
    pub code_store: bool,
}

impl HealthReport {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.directory && self.code_store
    }
}

pub struct SignupService {
    directory: Arc<dyn UserDirectory>,
    code_store: Arc<dyn ExpiringCodeStore>,
    resolver: AccountResolver,
    issuer: VerificationIssuer,
}

impl SignupService {
    #[must_use]
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        code_store: Arc<dyn ExpiringCodeStore>,
        config: &SignupConfig,
    ) -> Self {
        Self {
            resolver: AccountResolver::new(directory.clone()),
            issuer: VerificationIssuer::new(code_store.clone(), config.code_ttl()),
            directory,
            code_store,
        }
    }

    /// Create or reuse an unverified account for `request.email` and issue a
    /// verification code for it.
    ///
    /// # Errors
    /// - [`SignupError::InvalidRequest`] before any collaborator is called.
    /// - [`SignupError::DirectoryUnavailable`] / [`SignupError::CodeStoreUnavailable`]
    ///   when a collaborator fails; an account created before the failure is kept.
    #[instrument(skip(self, request), fields(client_id = %request.client_id))]
    pub async fn handle_signup(&self, request: &SignupRequest) -> Result<SignupOutcome, SignupError> {
        request.validate()?;

        let account = match self
            .resolver
            .resolve(&request.email, &request.password)
            .await?
        {
            Resolution::Created(account) | Resolution::Reused(account) => account,
            Resolution::Conflict => {
                info!("signup rejected, account already verified");
                return Ok(SignupOutcome::Conflict);
            }
        };

        let issued = self
            .issuer
            .issue(&account.id, &request.client_id)
            .await
            .inspect_err(|err| {
                error!(user_id = %account.id, "verification code issuance failed: {err}");
            })?;

        info!(user_id = %issued.user_id, "verification code issued");
        Ok(SignupOutcome::Created(issued))
    }

    pub async fn health(&self) -> HealthReport {
        let directory = self.directory.health().await;
        if let Err(err) = &directory {
            error!("User directory health check failed: {err}");
        }
        let code_store = self.code_store.health().await;
        if let Err(err) = &code_store {
            error!("Code store health check failed: {err}");
        }
        HealthReport {
            directory: directory.is_ok(),
            code_store: code_store.is_ok(),
        }
    }
}

impl std::fmt::Debug for SignupService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupService")
            .field("resolver", &self.resolver)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

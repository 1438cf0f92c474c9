//! Mints the expiring code that a later verification step redeems.

use super::{error::SignupError, payload::VerificationPayload};
use crate::codestore::ExpiringCodeStore;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, instrument};

/// A code issued for a resolved account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedVerification {
    pub user_id: String,
    pub code: String,
}

#[derive(Clone)]
pub struct VerificationIssuer {
    code_store: Arc<dyn ExpiringCodeStore>,
    code_ttl: Duration,
}

impl VerificationIssuer {
    #[must_use]
    pub fn new(code_store: Arc<dyn ExpiringCodeStore>, code_ttl: Duration) -> Self {
        Self {
            code_store,
            code_ttl,
        }
    }

    /// Bind `{user_id, client_id}` to a fresh code that expires after the
    /// configured lifetime. Exactly one store call; failures are not retried.
    ///
    /// # Errors
    /// - [`SignupError::LifetimeOutOfRange`] when `now + ttl` overflows the clock.
    /// - [`SignupError::CodeStoreUnavailable`] when the store fails.
    #[instrument(skip(self))]
    pub async fn issue(
        &self,
        user_id: &str,
        client_id: &str,
    ) -> Result<IssuedVerification, SignupError> {
        let data = VerificationPayload::new(user_id, client_id).to_canonical_string()?;
        let expires_at = SystemTime::now()
            .checked_add(self.code_ttl)
            .ok_or(SignupError::LifetimeOutOfRange(self.code_ttl))?;

        let issued = self.code_store.generate(&data, expires_at).await?;
        debug!(ttl_seconds = self.code_ttl.as_secs(), "issued verification code");

        Ok(IssuedVerification {
            user_id: user_id.to_string(),
            code: issued.code,
        })
    }
}

impl std::fmt::Debug for VerificationIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationIssuer")
            .field("code_ttl", &self.code_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::test_support::RecordingCodeStore;
    use crate::codestore::CodeStoreError;
    use anyhow::Result;

    #[tokio::test]
    async fn issue_binds_canonical_payload_and_lifetime() -> Result<()> {
        let store = Arc::new(RecordingCodeStore::fixed("secret_code"));
        let issuer = VerificationIssuer::new(store.clone(), Duration::from_secs(1800));

        let before = SystemTime::now();
        let issued = issuer.issue("u1", "c1").await?;
        let after = SystemTime::now();

        assert_eq!(
            issued,
            IssuedVerification {
                user_id: "u1".to_string(),
                code: "secret_code".to_string(),
            }
        );

        let generated = store.generated();
        assert_eq!(generated.len(), 1);
        let (data, expires_at) = &generated[0];
        assert_eq!(data, r#"{"user_id":"u1","client_id":"c1"}"#);
        assert!(*expires_at >= before + Duration::from_secs(1800));
        assert!(*expires_at <= after + Duration::from_secs(1800));
        Ok(())
    }

    #[tokio::test]
    async fn issue_uses_configured_lifetime() -> Result<()> {
        let store = Arc::new(RecordingCodeStore::fixed("secret_code"));
        let issuer = VerificationIssuer::new(store.clone(), Duration::from_secs(60));

        let before = SystemTime::now();
        issuer.issue("u1", "c1").await?;

        let generated = store.generated();
        let expires_at = generated[0].1;
        assert!(expires_at >= before + Duration::from_secs(60));
        assert!(expires_at < before + Duration::from_secs(1800));
        Ok(())
    }

    #[tokio::test]
    async fn overflowing_lifetime_fails_without_store_call() {
        let store = Arc::new(RecordingCodeStore::fixed("secret_code"));
        let issuer = VerificationIssuer::new(store.clone(), Duration::from_secs(u64::MAX));

        let result = issuer.issue("u1", "c1").await;

        assert!(matches!(result, Err(SignupError::LifetimeOutOfRange(_))));
        assert_eq!(store.generate_count(), 0);
    }

    #[tokio::test]
    async fn store_failure_propagates_without_retry() {
        let store = Arc::new(RecordingCodeStore::failing());
        let issuer = VerificationIssuer::new(store.clone(), Duration::from_secs(1800));

        let result = issuer.issue("u1", "c1").await;

        assert!(matches!(
            result,
            Err(SignupError::CodeStoreUnavailable(CodeStoreError::Unavailable(_)))
        ));
        assert_eq!(store.generate_count(), 1);
    }
}

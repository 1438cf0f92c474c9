//! Expiring code store capability consumed by the verification issuer.
//!
//! A store mints an opaque code bound to a data string until `expires_at`.
//! Redeeming a code (exactly once) is the concern of a downstream verification
//! step and is not part of this trait.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use std::error::Error as StdError;
use std::time::SystemTime;
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCodeStore;
pub use postgres::PgCodeStore;

const CODE_BYTES: usize = 32;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedCode {
    pub code: String,
    pub expires_at: SystemTime,
    /// The content the code is bound to, verbatim.
    pub data: String,
}

#[derive(Debug, Error)]
pub enum CodeStoreError {
    #[error("code expiration must be in the future")]
    Expired,
    #[error("expiring code store unavailable: {0}")]
    Unavailable(#[source] Box<dyn StdError + Send + Sync + 'static>),
}

impl CodeStoreError {
    pub fn unavailable(err: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self::Unavailable(err.into())
    }
}

#[async_trait]
pub trait ExpiringCodeStore: Send + Sync {
    /// Mint a fresh code bound to `data` that is valid until `expires_at`.
    ///
    /// # Errors
    /// [`CodeStoreError::Expired`] when `expires_at` is not in the future.
    async fn generate(&self, data: &str, expires_at: SystemTime)
        -> Result<IssuedCode, CodeStoreError>;

    /// Cheap liveness probe used by `/health`.
    async fn health(&self) -> Result<(), CodeStoreError> {
        Ok(())
    }
}

/// Random, URL-safe code with 256 bits of entropy.
pub(crate) fn generate_code() -> Result<String> {
    let mut bytes = [0u8; CODE_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate verification code")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

pub(crate) fn ensure_future(expires_at: SystemTime) -> Result<(), CodeStoreError> {
    if expires_at <= SystemTime::now() {
        return Err(CodeStoreError::Expired);
    }
    Ok(())
}

//! Process-local code store used when no database is configured.

use super::{ensure_future, generate_code, CodeStoreError, ExpiringCodeStore, IssuedCode};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::SystemTime;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
pub struct InMemoryCodeStore {
    codes: Mutex<HashMap<String, IssuedCode>>,
}

impl InMemoryCodeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a live code without consuming it.
    pub async fn peek(&self, code: &str) -> Option<IssuedCode> {
        let codes = self.codes.lock().await;
        codes
            .get(code)
            .filter(|issued| issued.expires_at > SystemTime::now())
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.codes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.codes.lock().await.is_empty()
    }
}

#[async_trait]
impl ExpiringCodeStore for InMemoryCodeStore {
    async fn generate(
        &self,
        data: &str,
        expires_at: SystemTime,
    ) -> Result<IssuedCode, CodeStoreError> {
        ensure_future(expires_at)?;

        let mut codes = self.codes.lock().await;
        let now = SystemTime::now();
        codes.retain(|_, issued| issued.expires_at > now);

        let code = loop {
            let candidate = generate_code().map_err(CodeStoreError::unavailable)?;
            if !codes.contains_key(&candidate) {
                break candidate;
            }
        };

        let issued = IssuedCode {
            code: code.clone(),
            expires_at,
            data: data.to_string(),
        };
        codes.insert(code, issued.clone());
        debug!(live_codes = codes.len(), "issued in-memory code");

        Ok(issued)
    }
}

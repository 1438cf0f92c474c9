use std::time::Duration;

pub const DEFAULT_CODE_TTL_SECONDS: u64 = 30 * 60;

/// Upper bound accepted from configuration (one week).
pub const MAX_CODE_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct SignupConfig {
    code_ttl_seconds: u64,
}

impl SignupConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            code_ttl_seconds: DEFAULT_CODE_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_code_ttl_seconds(mut self, seconds: u64) -> Self {
        self.code_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn code_ttl_seconds(&self) -> u64 {
        self.code_ttl_seconds
    }

    #[must_use]
    pub fn code_ttl(&self) -> Duration {
        Duration::from_secs(self.code_ttl_seconds)
    }
}

impl Default for SignupConfig {
    fn default() -> Self {
        Self::new()
    }
}

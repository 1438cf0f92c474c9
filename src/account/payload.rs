//! Content bound to an issued verification code.

use serde::{Deserialize, Serialize};

/// What a verification code vouches for. Field order is the wire order:
/// `user_id` always precedes `client_id` in the encoded form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationPayload {
    pub user_id: String,
    pub client_id: String,
}

impl VerificationPayload {
    #[must_use]
    pub fn new(user_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            client_id: client_id.into(),
        }
    }

    /// Compact JSON, e.g. `{"user_id":"u1","client_id":"c1"}`.
    ///
    /// # Errors
    /// Only if serialization itself fails, which plain strings never do.
    pub fn to_canonical_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

//! Process-local directory used when no database is configured.

use super::{DirectoryError, UserAccount, UserDirectory, UserFilter};
use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug)]
struct StoredUser {
    account: UserAccount,
    // Kept so the record mirrors what a real directory would hold.
    _password: SecretString,
}

#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: RwLock<Vec<StoredUser>>,
}

impl InMemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account directly, bypassing the uniqueness check.
    /// Assigns an id when `account.id` is empty.
    pub async fn insert(&self, mut account: UserAccount) -> UserAccount {
        if account.id.is_empty() {
            account.id = Uuid::new_v4().to_string();
        }
        self.users.write().await.push(StoredUser {
            account: account.clone(),
            _password: SecretString::default(),
        });
        account
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn query(&self, filter: &UserFilter) -> Result<Vec<UserAccount>, DirectoryError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|user| filter.matches(&user.account))
            .map(|user| user.account.clone())
            .collect())
    }

    async fn create(
        &self,
        mut account: UserAccount,
        password: &SecretString,
    ) -> Result<UserAccount, DirectoryError> {
        let filter = UserFilter {
            user_name: account.user_name.clone(),
            origin: account.origin.clone(),
        };

        // Check and insert under one write lock so concurrent creates serialize.
        let mut users = self.users.write().await;
        if users.iter().any(|user| filter.matches(&user.account)) {
            return Err(DirectoryError::AlreadyExists(account.user_name));
        }

        account.id = Uuid::new_v4().to_string();
        debug!(user_id = %account.id, "created in-memory user");
        users.push(StoredUser {
            account: account.clone(),
            _password: password.clone(),
        });

        Ok(account)
    }
}

//! Recording collaborators for signup tests.

use crate::codestore::{CodeStoreError, ExpiringCodeStore, IssuedCode};
use crate::directory::{DirectoryError, UserAccount, UserDirectory, UserFilter};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::SystemTime;

#[derive(Debug)]
pub(crate) enum CreateBehavior {
    AssignId(String),
    AlreadyExists,
    Unavailable,
}

/// Directory fake that answers queries from a script and records every call.
#[derive(Debug)]
pub(crate) struct RecordingDirectory {
    answers: Mutex<VecDeque<Vec<UserAccount>>>,
    create_behavior: CreateBehavior,
    pub(crate) queries: Mutex<Vec<UserFilter>>,
    pub(crate) created: Mutex<Vec<(UserAccount, String)>>,
}

impl RecordingDirectory {
    /// Answers every query with `existing`.
    pub(crate) fn returning(existing: Vec<UserAccount>) -> Self {
        Self::scripted(vec![existing])
    }

    /// Answers queries in order; once the script runs out, the last answer repeats.
    pub(crate) fn scripted(answers: Vec<Vec<UserAccount>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            create_behavior: CreateBehavior::AssignId("newly-created-user-id".to_string()),
            queries: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_create(mut self, behavior: CreateBehavior) -> Self {
        self.create_behavior = behavior;
        self
    }

    pub(crate) fn query_count(&self) -> usize {
        self.queries.lock().map_or(0, |queries| queries.len())
    }

    pub(crate) fn create_count(&self) -> usize {
        self.created.lock().map_or(0, |created| created.len())
    }

    pub(crate) fn created(&self) -> Vec<(UserAccount, String)> {
        self.created
            .lock()
            .map(|created| created.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl UserDirectory for RecordingDirectory {
    async fn query(&self, filter: &UserFilter) -> Result<Vec<UserAccount>, DirectoryError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(filter.clone());
        }
        let mut answers = self
            .answers
            .lock()
            .map_err(|_| DirectoryError::unavailable("answers lock poisoned"))?;
        let answer = if answers.len() > 1 {
            answers.pop_front().unwrap_or_default()
        } else {
            answers.front().cloned().unwrap_or_default()
        };
        Ok(answer)
    }

    async fn create(
        &self,
        mut account: UserAccount,
        password: &SecretString,
    ) -> Result<UserAccount, DirectoryError> {
        if let Ok(mut created) = self.created.lock() {
            created.push((account.clone(), password.expose_secret().to_string()));
        }
        match &self.create_behavior {
            CreateBehavior::AssignId(id) => {
                account.id.clone_from(id);
                Ok(account)
            }
            CreateBehavior::AlreadyExists => Err(DirectoryError::AlreadyExists(account.user_name)),
            CreateBehavior::Unavailable => Err(DirectoryError::unavailable("directory offline")),
        }
    }
}

/// Code store fake that records `(data, expires_at)` for every call.
#[derive(Debug)]
pub(crate) struct RecordingCodeStore {
    fixed_code: Option<String>,
    fail: bool,
    pub(crate) generated: Mutex<Vec<(String, SystemTime)>>,
}

impl RecordingCodeStore {
    /// Always hands out `code`.
    pub(crate) fn fixed(code: &str) -> Self {
        Self {
            fixed_code: Some(code.to_string()),
            fail: false,
            generated: Mutex::new(Vec::new()),
        }
    }

    /// Hands out `code-1`, `code-2`, ...
    pub(crate) fn sequential() -> Self {
        Self {
            fixed_code: None,
            fail: false,
            generated: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fixed_code: None,
            fail: true,
            generated: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn generate_count(&self) -> usize {
        self.generated.lock().map_or(0, |generated| generated.len())
    }

    pub(crate) fn generated(&self) -> Vec<(String, SystemTime)> {
        self.generated
            .lock()
            .map(|generated| generated.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ExpiringCodeStore for RecordingCodeStore {
    async fn generate(
        &self,
        data: &str,
        expires_at: SystemTime,
    ) -> Result<IssuedCode, CodeStoreError> {
        let count = {
            let mut generated = self
                .generated
                .lock()
                .map_err(|_| CodeStoreError::unavailable("generated lock poisoned"))?;
            generated.push((data.to_string(), expires_at));
            generated.len()
        };
        if self.fail {
            return Err(CodeStoreError::unavailable("code store offline"));
        }
        let code = self
            .fixed_code
            .clone()
            .unwrap_or_else(|| format!("code-{count}"));
        Ok(IssuedCode {
            code,
            expires_at,
            data: data.to_string(),
        })
    }
}

pub(crate) fn existing_account(id: &str, verified: bool) -> UserAccount {
    let mut account = UserAccount::unverified("user@example.com");
    account.id = id.to_string();
    account.verified = verified;
    account
}

//! Postgres-backed user directory (`users` table in `sql/schema.sql`).

use super::{AuthOrigin, DirectoryError, UserAccount, UserDirectory, UserFilter};
use crate::db::is_unique_violation;
use anyhow::{anyhow, Result};
use argon2::{password_hash::SaltString, Argon2, PasswordHasher};
use async_trait::async_trait;
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};
use sqlx::{postgres::PgRow, Connection, PgPool, Row};
use tracing::{info_span, Instrument};

#[derive(Clone, Debug)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(row: &PgRow) -> Result<UserAccount, sqlx::Error> {
    let origin: String = row.try_get("origin")?;
    Ok(UserAccount {
        id: row.try_get("id")?,
        user_name: row.try_get("user_name")?,
        primary_email: row.try_get("primary_email")?,
        origin: AuthOrigin::from_name(&origin),
        verified: row.try_get("verified")?,
        active: row.try_get("active")?,
    })
}

/// Hash a password into an Argon2id PHC string for storage.
fn hash_password(password: &SecretString) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("failed to hash password: {err}"))
}

#[async_trait]
impl UserDirectory for PgDirectory {
    async fn query(&self, filter: &UserFilter) -> Result<Vec<UserAccount>, DirectoryError> {
        let query = r"
            SELECT id::text AS id, user_name, primary_email, origin, verified, active
            FROM users
            WHERE user_name = $1 AND origin = $2
            ORDER BY created_at
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .bind(&filter.user_name)
            .bind(filter.origin.as_str())
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .map_err(DirectoryError::unavailable)?;

        rows.iter()
            .map(account_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(DirectoryError::unavailable)
    }

    async fn create(
        &self,
        mut account: UserAccount,
        password: &SecretString,
    ) -> Result<UserAccount, DirectoryError> {
        let password_hash = hash_password(password).map_err(DirectoryError::unavailable)?;

        let query = r"
            INSERT INTO users
                (user_name, primary_email, origin, verified, active, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id::text AS id
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(&account.user_name)
            .bind(&account.primary_email)
            .bind(account.origin.as_str())
            .bind(account.verified)
            .bind(account.active)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(row) => {
                account.id = row.try_get("id").map_err(DirectoryError::unavailable)?;
                Ok(account)
            }
            Err(err) if is_unique_violation(&err) => {
                Err(DirectoryError::AlreadyExists(account.user_name))
            }
            Err(err) => Err(DirectoryError::unavailable(err)),
        }
    }

    async fn health(&self) -> Result<(), DirectoryError> {
        let span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        async {
            let mut conn = self.pool.acquire().await?;
            conn.ping().await?;
            Ok::<(), sqlx::Error>(())
        }
        .instrument(span)
        .await
        .map_err(DirectoryError::unavailable)
    }
}

//! Postgres-backed code store (`expiring_codes` table in `sql/schema.sql`).

use super::{ensure_future, generate_code, CodeStoreError, ExpiringCodeStore, IssuedCode};
use crate::db::is_unique_violation;
use async_trait::async_trait;
use sqlx::{Connection, PgPool};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info_span, warn, Instrument};

const MAX_INSERT_ATTEMPTS: usize = 3;

const PRUNE_EXPIRED: &str = "DELETE FROM expiring_codes WHERE expires_at <= NOW()";

#[derive(Clone, Debug)]
pub struct PgCodeStore {
    pool: PgPool,
}

impl PgCodeStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unix_seconds(at: SystemTime) -> Result<f64, CodeStoreError> {
    at.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .map_err(CodeStoreError::unavailable)
}

#[async_trait]
impl ExpiringCodeStore for PgCodeStore {
    async fn generate(
        &self,
        data: &str,
        expires_at: SystemTime,
    ) -> Result<IssuedCode, CodeStoreError> {
        ensure_future(expires_at)?;
        let expires_at_seconds = unix_seconds(expires_at)?;

        let prune_span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = PRUNE_EXPIRED
        );
        let pruned = sqlx::query(PRUNE_EXPIRED)
            .execute(&self.pool)
            .instrument(prune_span)
            .await
            .map_err(CodeStoreError::unavailable)?;
        if pruned.rows_affected() > 0 {
            debug!(pruned = pruned.rows_affected(), "pruned expired codes");
        }

        let query = r"
            INSERT INTO expiring_codes (code, expires_at, data)
            VALUES ($1, to_timestamp($2), $3)
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );

        // A collision on a 256-bit random code is practically impossible; the
        // retry only covers the primary key violation if one ever happens.
        for _ in 0..MAX_INSERT_ATTEMPTS {
            let code = generate_code().map_err(CodeStoreError::unavailable)?;
            let result = sqlx::query(query)
                .bind(&code)
                .bind(expires_at_seconds)
                .bind(data)
                .execute(&self.pool)
                .instrument(span.clone())
                .await;

            match result {
                Ok(_) => {
                    return Ok(IssuedCode {
                        code,
                        expires_at,
                        data: data.to_string(),
                    })
                }
                Err(err) if is_unique_violation(&err) => {
                    warn!("expiring code collision, retrying");
                }
                Err(err) => return Err(CodeStoreError::unavailable(err)),
            }
        }

        Err(CodeStoreError::unavailable(
            "failed to mint a unique code after repeated collisions",
        ))
    }

    async fn health(&self) -> Result<(), CodeStoreError> {
        let span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        async {
            let mut conn = self.pool.acquire().await?;
            conn.ping().await?;
            Ok::<(), sqlx::Error>(())
        }
        .instrument(span)
        .await
        .map_err(CodeStoreError::unavailable)
    }
}

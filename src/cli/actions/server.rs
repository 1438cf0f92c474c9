use crate::account::{SignupConfig, SignupService};
use crate::codestore::{ExpiringCodeStore, InMemoryCodeStore, PgCodeStore};
use crate::directory::{InMemoryDirectory, PgDirectory, UserDirectory};
use crate::{api, db};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub code_ttl_seconds: u64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let (directory, code_store): (Arc<dyn UserDirectory>, Arc<dyn ExpiringCodeStore>) =
        match &args.dsn {
            Some(dsn) => {
                let pool = db::connect(dsn).await?;
                debug!("using Postgres user directory and code store");
                (
                    Arc::new(PgDirectory::new(pool.clone())),
                    Arc::new(PgCodeStore::new(pool)),
                )
            }
            None => {
                warn!("no DSN configured, users and codes are kept in memory");
                (
                    Arc::new(InMemoryDirectory::new()),
                    Arc::new(InMemoryCodeStore::new()),
                )
            }
        };

    let config = SignupConfig::new().with_code_ttl_seconds(args.code_ttl_seconds);
    let service = Arc::new(SignupService::new(directory, code_store, &config));

    api::new(args.port, service).await
}

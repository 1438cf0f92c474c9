//! Maps validated CLI matches to the action the binary runs.

use crate::account::DEFAULT_CODE_TTL_SECONDS;
use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::signup::ARG_CODE_TTL_SECONDS;
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if arguments are inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server(Args {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: matches.get_one::<String>("dsn").cloned(),
        code_ttl_seconds: matches
            .get_one::<u64>(ARG_CODE_TTL_SECONDS)
            .copied()
            .unwrap_or(DEFAULT_CODE_TTL_SECONDS),
    }))
}

use crate::account::MAX_CODE_TTL_SECONDS;
use clap::{builder::ValueParser, Arg, Command};

pub const ARG_CODE_TTL_SECONDS: &str = "code-ttl-seconds";

/// Verification codes must outlive the request that issues them.
#[must_use]
pub fn validator_ttl_seconds() -> ValueParser {
    ValueParser::from(move |ttl: &str| -> std::result::Result<u64, String> {
        match ttl.parse::<u64>() {
            Ok(0) => Err("code TTL must be greater than zero".to_string()),
            Ok(seconds) if seconds > MAX_CODE_TTL_SECONDS => Err(format!(
                "code TTL must not exceed {MAX_CODE_TTL_SECONDS} seconds"
            )),
            Ok(seconds) => Ok(seconds),
            Err(err) => Err(format!("invalid code TTL: {err}")),
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_CODE_TTL_SECONDS)
            .long(ARG_CODE_TTL_SECONDS)
            .help("Lifetime of issued verification codes in seconds")
            .env("SIGNUP_CODE_TTL_SECONDS")
            .default_value("1800")
            .value_parser(validator_ttl_seconds()),
    )
}

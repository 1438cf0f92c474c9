//! # Signup
//!
//! Self-service account creation for an identity server's user directory.
//!
//! A signup names an email, a password and the OAuth client the user came
//! from. The service makes sure an internal, unverified account exists for the
//! email and hands back a short-lived verification code bound to
//! `{"user_id", "client_id"}`. Delivering the code and redeeming it are left
//! to other components.
//!
//! ## Account resolution
//!
//! | Directory state for `(email, "uaa")` | Result                             |
//! |--------------------------------------|------------------------------------|
//! | no record                            | create unverified account, issue   |
//! | unverified record                    | reuse it unchanged, issue new code |
//! | verified record                      | conflict, nothing issued           |
//!
//! Repeating a signup for an unverified email never duplicates the account; it
//! only mints another code. Earlier codes stay valid until they expire.
//!
//! ## Storage
//!
//! Both collaborators sit behind traits ([`directory::UserDirectory`] and
//! [`codestore::ExpiringCodeStore`]). Postgres adapters are used when a DSN is
//! configured; otherwise the process-local in-memory adapters are.

pub mod account;
pub mod api;
pub mod cli;
pub mod codestore;
pub mod db;
pub mod directory;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

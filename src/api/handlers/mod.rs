//! HTTP handlers for the signup API.

pub mod create_account;
pub mod health;

use regex::Regex;

/// Shape check for the signup email: one `@`, a dotted domain, no whitespace.
/// The value is otherwise passed through untouched.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

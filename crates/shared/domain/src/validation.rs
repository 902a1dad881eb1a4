//! Field validators.
//!
//! Pure predicates, checked by the service before anything is written.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{EMAIL_PATTERN, MAX_AGE, MIN_AGE};

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"));

/// True if the string is empty or only whitespace.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Check an email address against [`EMAIL_PATTERN`].
///
/// Blank input is never valid. The pattern is matched against the raw
/// string, so surrounding whitespace makes an address invalid.
pub fn is_valid_email(email: &str) -> bool {
    if is_blank(email) {
        return false;
    }
    EMAIL_REGEX.is_match(email)
}

/// Check that an age is present and within `MIN_AGE..=MAX_AGE`.
pub fn is_valid_age(age: Option<i32>) -> bool {
    matches!(age, Some(age) if (MIN_AGE..=MAX_AGE).contains(&age))
}

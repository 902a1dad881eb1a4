//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Validation
// =============================================================================

/// Youngest accepted age
pub const MIN_AGE: i32 = 0;

/// Oldest accepted age
pub const MAX_AGE: i32 = 150;

/// Accepted email shape: `local@domain.tld`
pub const EMAIL_PATTERN: &str = r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";

// =============================================================================
// Queries
// =============================================================================

/// Upper bound on the number of users returned by a listing.
///
/// No cursor is exposed; anything past this cap is not reachable through
/// `list_users`.
pub const MAX_LIST_RESULTS: u64 = 100;

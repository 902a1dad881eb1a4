//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the user record, its invariants, and the field validators used before any
//! write reaches storage.

pub mod constants;
pub mod error;
pub mod user;
pub mod validation;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use user::{UpdateUser, User};
pub use validation::{is_blank, is_valid_age, is_valid_email};

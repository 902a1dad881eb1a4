//! User domain entity and related types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::validation::is_valid_age;

/// User domain entity.
///
/// A user built with [`User::new`] is transient: it has no `id` and no
/// `created_at` until storage assigns them. Both stay fixed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    id: Option<i64>,
    name: String,
    email: String,
    age: Option<i32>,
    created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a transient (not yet persisted) user.
    ///
    /// Fails fast if `age` is out of range.
    pub fn new(name: String, email: String, age: Option<i32>) -> DomainResult<Self> {
        let mut user = Self {
            id: None,
            name,
            email,
            age: None,
            created_at: None,
        };
        user.set_age(age)?;
        Ok(user)
    }

    /// Rebuild a user that has already been stored.
    ///
    /// Used by the persistence layer when mapping rows back into the domain.
    pub fn persisted(
        id: i64,
        name: String,
        email: String,
        age: Option<i32>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(id),
            name,
            email,
            age,
            created_at: Some(created_at),
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn age(&self) -> Option<i32> {
        self.age
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Check if the user has been stored at least once
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Update user's name
    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Update user's email
    pub fn set_email(&mut self, email: String) {
        self.email = email;
    }

    /// Update user's age, rejecting values outside the accepted range.
    ///
    /// `None` clears the age. On error the previous value is kept.
    pub fn set_age(&mut self, age: Option<i32>) -> DomainResult<()> {
        if let Some(value) = age {
            if !is_valid_age(age) {
                return Err(DomainError::InvalidAge(value));
            }
        }
        self.age = age;
        Ok(())
    }

    /// Apply the fields present in `changes`, leaving the others untouched.
    pub fn apply(&mut self, changes: UpdateUser) -> DomainResult<()> {
        if let Some(age) = changes.age {
            self.set_age(Some(age))?;
        }
        if let Some(name) = changes.name {
            self.set_name(name);
        }
        if let Some(email) = changes.email {
            self.set_email(email);
        }
        Ok(())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "User #{}: {} <{}>", id, self.name, self.email)?,
            None => write!(f, "User (unsaved): {} <{}>", self.name, self.email)?,
        }
        match self.age {
            Some(age) => write!(f, ", age {}", age)?,
            None => write!(f, ", age unknown")?,
        }
        if let Some(created_at) = self.created_at {
            write!(f, ", created {}", created_at.format("%Y-%m-%d %H:%M:%S"))?;
        }
        Ok(())
    }
}

/// Partial update of a user.
///
/// `None` means "leave unchanged"; there is no way to clear a field through
/// an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateUser {
    /// New display name
    pub name: Option<String>,
    /// New email address
    pub email: Option<String>,
    /// New age
    pub age: Option<i32>,
}

impl UpdateUser {
    /// True when no field is provided
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none()
    }
}

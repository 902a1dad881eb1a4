//! User service - Handles user-related business logic.
//!
//! Every input is validated here before the repository is touched. Storage
//! failures are re-raised with the operation and the id or email attached.

use async_trait::async_trait;
use std::sync::Arc;

use common::{AppError, AppResult, OptionExt};
use domain::{is_blank, is_valid_age, is_valid_email, UpdateUser, User};

use crate::repository::UserRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Validate and store a new user
    async fn create_user(&self, name: String, email: String, age: Option<i32>)
        -> AppResult<User>;

    /// Get user by ID; `Ok(None)` when absent
    async fn get_user(&self, id: i64) -> AppResult<Option<User>>;

    /// List users (capped)
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Apply the provided fields of `changes` to an existing user
    async fn update_user(&self, id: i64, changes: UpdateUser) -> AppResult<User>;

    /// Delete an existing user
    async fn delete_user(&self, id: i64) -> AppResult<()>;

    /// Check whether a user exists; invalid ids are simply absent
    async fn user_exists(&self, id: i64) -> AppResult<bool>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
}

impl UserManager {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

fn validate_id(id: i64) -> AppResult<()> {
    if id <= 0 {
        tracing::warn!("Invalid user ID provided: {}", id);
        return Err(AppError::validation(format!("Invalid user ID: {}", id)));
    }
    Ok(())
}

fn validate_new_user(name: &str, email: &str, age: Option<i32>) -> AppResult<()> {
    if is_blank(name) {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if is_blank(email) {
        return Err(AppError::validation("Email cannot be empty"));
    }
    if !is_valid_email(email) {
        return Err(AppError::validation(format!("Invalid email format: {}", email)));
    }
    if !is_valid_age(age) {
        return Err(match age {
            Some(age) => AppError::validation(format!("Invalid age: {}", age)),
            None => AppError::validation("Age is required"),
        });
    }
    Ok(())
}

fn validate_changes(changes: &UpdateUser) -> AppResult<()> {
    if changes.name.as_deref().is_some_and(is_blank) {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if let Some(email) = changes.email.as_deref() {
        if !is_valid_email(email) {
            return Err(AppError::validation(format!("Invalid email format: {}", email)));
        }
    }
    if let Some(age) = changes.age {
        if !is_valid_age(Some(age)) {
            return Err(AppError::validation(format!("Invalid age: {}", age)));
        }
    }
    Ok(())
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(
        &self,
        name: String,
        email: String,
        age: Option<i32>,
    ) -> AppResult<User> {
        tracing::debug!("Creating new user: name={}, email={}, age={:?}", name, email, age);

        validate_new_user(&name, &email, age)?;
        let user = User::new(name, email.clone(), age)?;

        let saved = self.repo.save(user).await.map_err(|e| {
            tracing::error!("Failed to create user with email {}: {}", email, e);
            e.context(format!("Failed to create user with email {}", email))
        })?;

        tracing::info!("User created successfully with ID: {:?}", saved.id());
        Ok(saved)
    }

    async fn get_user(&self, id: i64) -> AppResult<Option<User>> {
        tracing::debug!("Retrieving user by ID: {}", id);
        validate_id(id)?;

        let user = self.repo.find_by_id(id).await.map_err(|e| {
            tracing::error!("Failed to retrieve user with ID {}: {}", id, e);
            e.context(format!("Failed to retrieve user {}", id))
        })?;

        match &user {
            Some(_) => tracing::debug!("User found with ID: {}", id),
            None => tracing::debug!("User not found with ID: {}", id),
        }
        Ok(user)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        tracing::debug!("Retrieving all users");

        let users = self.repo.find_all().await.map_err(|e| {
            tracing::error!("Failed to retrieve all users: {}", e);
            e.context("Failed to retrieve users")
        })?;

        tracing::debug!("Retrieved {} users", users.len());
        Ok(users)
    }

    async fn update_user(&self, id: i64, changes: UpdateUser) -> AppResult<User> {
        tracing::debug!("Updating user with ID {}: {:?}", id, changes);

        validate_id(id)?;
        validate_changes(&changes)?;

        let mut user = self.get_user(id).await?.ok_or_not_found(id)?;
        user.apply(changes)?;

        let updated = self.repo.update(user).await.map_err(|e| {
            tracing::error!("Failed to update user with ID {}: {}", id, e);
            e.context(format!("Failed to update user {}", id))
        })?;

        tracing::info!("User updated successfully with ID: {}", id);
        Ok(updated)
    }

    async fn delete_user(&self, id: i64) -> AppResult<()> {
        tracing::debug!("Deleting user with ID: {}", id);
        validate_id(id)?;

        if !self.user_exists(id).await? {
            tracing::warn!("Attempt to delete non-existent user with ID: {}", id);
            return Err(AppError::NotFound(id));
        }

        self.repo.delete(id).await.map_err(|e| {
            tracing::error!("Failed to delete user with ID {}: {}", id, e);
            e.context(format!("Failed to delete user {}", id))
        })?;

        tracing::info!("User deleted successfully with ID: {}", id);
        Ok(())
    }

    async fn user_exists(&self, id: i64) -> AppResult<bool> {
        if id <= 0 {
            return Ok(false);
        }

        let user = self.repo.find_by_id(id).await.map_err(|e| {
            tracing::error!("Failed to check user existence with ID {}: {}", id, e);
            e.context(format!("Failed to check existence of user {}", id))
        })?;

        Ok(user.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;
    use chrono::Utc;
    use common::StorageError;
    use mockall::predicate::eq;
    use std::io;

    fn stored(id: i64, name: &str, email: &str, age: Option<i32>) -> User {
        User::persisted(id, name.to_string(), email.to_string(), age, Utc::now())
    }

    fn storage_failure() -> AppError {
        AppError::storage(
            "Database operation failed",
            StorageError::backend(io::Error::new(io::ErrorKind::Other, "connection refused")),
        )
    }

    fn service(repo: MockUserRepository) -> UserManager {
        UserManager::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let mut repo = MockUserRepository::new();
        repo.expect_save()
            .withf(|user| {
                !user.is_persisted()
                    && user.name() == "Ann"
                    && user.email() == "ann@x.com"
                    && user.age() == Some(30)
            })
            .times(1)
            .returning(|user| Ok(stored(1, user.name(), user.email(), user.age())));

        let result = service(repo)
            .create_user("Ann".to_string(), "ann@x.com".to_string(), Some(30))
            .await
            .unwrap();

        assert_eq!(result.id(), Some(1));
        assert_eq!(result.name(), "Ann");
        assert!(result.created_at().unwrap() <= Utc::now());
    }

    #[tokio::test]
    async fn test_create_user_rejects_invalid_input_without_storage() {
        let cases = [
            ("", "ann@x.com", Some(30)),
            ("   ", "ann@x.com", Some(30)),
            ("Ann", "", Some(30)),
            ("Ann", "invalid-email", Some(30)),
            ("Ann", "ann@", Some(30)),
            ("Ann", "@x.com", Some(30)),
            ("Ann", "ann@x.com", Some(-1)),
            ("Ann", "ann@x.com", Some(151)),
            ("Ann", "ann@x.com", None),
        ];

        for (name, email, age) in cases {
            let mut repo = MockUserRepository::new();
            repo.expect_save().never();

            let result = service(repo)
                .create_user(name.to_string(), email.to_string(), age)
                .await;

            assert!(
                matches!(result, Err(AppError::Validation(_))),
                "expected validation error for {:?}",
                (name, email, age)
            );
        }
    }

    #[tokio::test]
    async fn test_create_user_age_boundaries() {
        for age in [0, 150] {
            let mut repo = MockUserRepository::new();
            repo.expect_save()
                .returning(|user| Ok(stored(1, user.name(), user.email(), user.age())));

            let result = service(repo)
                .create_user("Ann".to_string(), "ann@x.com".to_string(), Some(age))
                .await;

            assert_eq!(result.unwrap().age(), Some(age));
        }
    }

    #[tokio::test]
    async fn test_create_user_wraps_storage_error() {
        let mut repo = MockUserRepository::new();
        repo.expect_save().returning(|_| Err(storage_failure()));

        let err = service(repo)
            .create_user("Ann".to_string(), "ann@x.com".to_string(), Some(30))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "STORAGE_ERROR");
        let message = err.to_string();
        assert!(message.starts_with("Failed to create user with email ann@x.com"));
        assert!(message.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_get_user_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(stored(id, "John Doe", "john@example.com", Some(30)))));

        let result = service(repo).get_user(1).await.unwrap();

        let user = result.expect("user should be present");
        assert_eq!(user.id(), Some(1));
        assert_eq!(user.name(), "John Doe");
    }

    #[tokio::test]
    async fn test_get_user_absent() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let result = service(repo).get_user(999).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_get_user_invalid_id() {
        for id in [0, -1] {
            let mut repo = MockUserRepository::new();
            repo.expect_find_by_id().never();

            let result = service(repo).get_user(id).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_get_user_wraps_storage_error() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Err(storage_failure()));

        let err = service(repo).get_user(1).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to retrieve user 1"));
    }

    #[tokio::test]
    async fn test_list_users() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_all().returning(|| {
            Ok(vec![
                stored(1, "User 1", "user1@example.com", Some(25)),
                stored(2, "User 2", "user2@example.com", Some(30)),
            ])
        });

        let users = service(repo).list_users().await.unwrap();

        let names: Vec<&str> = users.iter().map(User::name).collect();
        assert_eq!(names, vec!["User 1", "User 2"]);
    }

    #[tokio::test]
    async fn test_list_users_wraps_storage_error() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_all().returning(|| Err(storage_failure()));

        let err = service(repo).list_users().await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to retrieve users"));
    }

    #[tokio::test]
    async fn test_update_user_all_fields() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(stored(id, "Old Name", "old@example.com", Some(30)))));
        repo.expect_update()
            .withf(|user| {
                user.id() == Some(1)
                    && user.name() == "New Name"
                    && user.email() == "new@example.com"
                    && user.age() == Some(35)
            })
            .returning(Ok);

        let changes = UpdateUser {
            name: Some("New Name".to_string()),
            email: Some("new@example.com".to_string()),
            age: Some(35),
        };
        let user = service(repo).update_user(1, changes).await.unwrap();

        assert_eq!(user.name(), "New Name");
        assert_eq!(user.email(), "new@example.com");
        assert_eq!(user.age(), Some(35));
    }

    #[tokio::test]
    async fn test_update_user_partial_keeps_other_fields() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(stored(id, "Ann", "ann@x.com", Some(30)))));
        repo.expect_update().returning(Ok);

        let changes = UpdateUser {
            age: Some(31),
            ..Default::default()
        };
        let user = service(repo).update_user(1, changes).await.unwrap();

        assert_eq!(user.name(), "Ann");
        assert_eq!(user.email(), "ann@x.com");
        assert_eq!(user.age(), Some(31));
    }

    #[tokio::test]
    async fn test_update_user_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_update().never();

        let changes = UpdateUser {
            name: Some("New Name".to_string()),
            ..Default::default()
        };
        let result = service(repo).update_user(999, changes).await;

        assert!(matches!(result, Err(AppError::NotFound(999))));
    }

    #[tokio::test]
    async fn test_update_user_rejects_invalid_input_without_storage() {
        let cases = [
            (0, UpdateUser::default()),
            (
                -5,
                UpdateUser {
                    name: Some("Name".to_string()),
                    ..Default::default()
                },
            ),
            (
                1,
                UpdateUser {
                    name: Some("  ".to_string()),
                    ..Default::default()
                },
            ),
            (
                1,
                UpdateUser {
                    email: Some("invalid-email".to_string()),
                    ..Default::default()
                },
            ),
            (
                1,
                UpdateUser {
                    age: Some(-1),
                    ..Default::default()
                },
            ),
            (
                1,
                UpdateUser {
                    age: Some(151),
                    ..Default::default()
                },
            ),
        ];

        for (id, changes) in cases {
            let mut repo = MockUserRepository::new();
            repo.expect_find_by_id().never();
            repo.expect_update().never();

            let result = service(repo).update_user(id, changes).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_delete_user_success() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(stored(id, "Ann", "ann@x.com", Some(30)))));
        repo.expect_delete().with(eq(1)).times(1).returning(|_| Ok(()));

        assert!(service(repo).delete_user(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_user_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_delete().never();

        let result = service(repo).delete_user(999).await;
        assert!(matches!(result, Err(AppError::NotFound(999))));
    }

    #[tokio::test]
    async fn test_delete_user_invalid_id() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().never();
        repo.expect_delete().never();

        let result = service(repo).delete_user(0).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_user_exists() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(stored(id, "Ann", "ann@x.com", None))));
        repo.expect_find_by_id().with(eq(2)).returning(|_| Ok(None));

        let service = service(repo);
        assert!(service.user_exists(1).await.unwrap());
        assert!(!service.user_exists(2).await.unwrap());
    }

    #[tokio::test]
    async fn test_user_exists_invalid_id_is_false() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().never();

        let service = service(repo);
        assert!(!service.user_exists(0).await.unwrap());
        assert!(!service.user_exists(-1).await.unwrap());
    }

    #[tokio::test]
    async fn test_user_exists_wraps_storage_error() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Err(storage_failure()));

        let err = service(repo).user_exists(1).await.unwrap_err();
        assert_eq!(err.code(), "STORAGE_ERROR");
    }
}

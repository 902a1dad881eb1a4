//! User repository implementation.
//!
//! Writes go through [`UnitOfWork::run`], one transaction per call; reads
//! use the pooled connection directly.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Unchanged, DbErr, EntityTrait, QueryOrder,
    QuerySelect, Set,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::infra::UnitOfWork;
use common::{AppError, AppResult};
use domain::{User, MAX_LIST_RESULTS};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a transient user; returns it with `id` and `created_at` assigned
    async fn save(&self, user: User) -> AppResult<User>;

    /// Find user by ID; `Ok(None)` when absent
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// List users in id order, at most `MAX_LIST_RESULTS`
    async fn find_all(&self) -> AppResult<Vec<User>>;

    /// Overwrite name, email and age of a stored user
    async fn update(&self, user: User) -> AppResult<User>;

    /// Delete user by ID; `NotFound` when absent
    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    uow: UnitOfWork,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn save(&self, user: User) -> AppResult<User> {
        if user.is_persisted() {
            return Err(AppError::validation("User is already persisted"));
        }

        let active_model = ActiveModel {
            id: NotSet,
            name: Set(user.name().to_string()),
            email: Set(user.email().to_string()),
            age: Set(user.age()),
            created_at: Set(chrono::Utc::now()),
        };

        let saved = self
            .uow
            .run(|txn| Box::pin(async move { Ok(active_model.insert(txn).await?) }))
            .await
            .map_err(|e| e.context("users insert"))?;

        tracing::info!("User saved successfully: {}", saved.email);
        Ok(User::from(saved))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(self.uow.connection())
            .await
            .map_err(|e| {
                tracing::error!("Error finding user by id {}: {}", id, e);
                AppError::from(e).context("users select by id")
            })?;

        Ok(result.map(User::from))
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .limit(MAX_LIST_RESULTS)
            .all(self.uow.connection())
            .await
            .map_err(|e| {
                tracing::error!("Error finding all users: {}", e);
                AppError::from(e).context("users select all")
            })?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let id = user
            .id()
            .ok_or_else(|| AppError::validation("Cannot update a user that was never saved"))?;

        let active_model = ActiveModel {
            id: Unchanged(id),
            name: Set(user.name().to_string()),
            email: Set(user.email().to_string()),
            age: Set(user.age()),
            created_at: NotSet,
        };

        let updated = self
            .uow
            .run(|txn| {
                Box::pin(async move {
                    match active_model.update(txn).await {
                        Ok(model) => Ok(model),
                        Err(DbErr::RecordNotUpdated) => Err(AppError::NotFound(id)),
                        Err(e) => Err(e.into()),
                    }
                })
            })
            .await
            .map_err(|e| e.context("users update"))?;

        tracing::info!("User updated successfully: {}", updated.email);
        Ok(User::from(updated))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.uow
            .run(|txn| {
                Box::pin(async move {
                    let existing = UserEntity::find_by_id(id).one(txn).await?;
                    if existing.is_none() {
                        return Err(AppError::NotFound(id));
                    }
                    UserEntity::delete_by_id(id).exec(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(|e| e.context("users delete"))?;

        tracing::info!("User deleted successfully: {}", id);
        Ok(())
    }
}

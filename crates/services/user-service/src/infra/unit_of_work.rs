//! Unit of Work pattern implementation.
//!
//! Every mutating repository call runs through [`UnitOfWork::run`]:
//! - begin a transaction on a pooled connection
//! - execute the unit of work against that transaction
//! - commit on success, roll back on any error
//! - hand the connection back to the pool on every exit path

use std::future::Future;
use std::pin::Pin;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use common::{AppError, AppResult};

/// Future returned by a unit of work, borrowing the transaction.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Transaction runner over a connection pool.
#[derive(Clone)]
pub struct UnitOfWork {
    db: DatabaseConnection,
}

impl UnitOfWork {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Connection for read-only queries that need no transaction.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Execute a closure within a transaction.
    ///
    /// The transaction is committed when the closure returns `Ok` and rolled
    /// back when it returns `Err`; the closure's error is passed through
    /// unchanged. Failing to begin or commit surfaces as a storage error.
    pub async fn run<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a DatabaseTransaction) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::from(e).context("Failed to begin transaction"))?;

        match f(&txn).await {
            Ok(result) => {
                txn.commit()
                    .await
                    .map_err(|e| AppError::from(e).context("Failed to commit transaction"))?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

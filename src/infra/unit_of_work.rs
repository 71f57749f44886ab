//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and runs multi-step writes (password
//! changes, account closure) inside one database transaction.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::{
    token_repository, user_repository, TokenRepository, TokenStore, UserRepository, UserStore,
};
use crate::domain::User;
use crate::errors::AppResult;

/// Boxed future returned by transaction closures
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Not object safe because of the generic transaction method; services are
/// generic over it instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get remember-token repository
    fn tokens(&self) -> Arc<dyn TokenRepository>;

    /// Execute a closure within a transaction.
    ///
    /// Committed when the closure succeeds, rolled back when it fails.
    /// Do not touch `users()`/`tokens()` from inside the closure: on a
    /// single-connection pool that would wait on the open transaction.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Get user operations bound to this transaction
    pub fn users(&self) -> TxUserRepository<'a> {
        TxUserRepository { txn: self.txn }
    }

    /// Get token operations bound to this transaction
    pub fn tokens(&self) -> TxTokenRepository<'a> {
        TxTokenRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    token_repo: Arc<TokenStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        let token_repo = Arc::new(TokenStore::new(db.clone()));
        Self {
            db,
            user_repo,
            token_repo,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn tokens(&self) -> Arc<dyn TokenRepository> {
        self.token_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self.db.begin().await?;

        let result = f(TransactionContext::new(&txn)).await;

        match result {
            Ok(value) => {
                txn.commit().await?;
                Ok(value)
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

/// Transaction-bound user operations
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    /// Find active user by ID
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        user_repository::find_by_id(self.txn, id).await
    }

    pub async fn set_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        user_repository::set_password(self.txn, id, password_hash).await
    }

    /// Soft delete user
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        user_repository::soft_delete(self.txn, id).await
    }
}

/// Transaction-bound token operations
pub struct TxTokenRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxTokenRepository<'a> {
    pub async fn delete_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        token_repository::delete_for_user(self.txn, user_id).await
    }
}

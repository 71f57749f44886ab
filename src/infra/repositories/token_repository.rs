//! Remember-me token repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use uuid::Uuid;

use super::entities::remember_token::{self, ActiveModel, Entity as RememberTokenEntity};
use crate::domain::StoredToken;
use crate::errors::AppResult;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Store a token fingerprint for a user
    async fn insert(
        &self,
        user_id: Uuid,
        fingerprint: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<StoredToken>;

    async fn find_by_fingerprint(&self, fingerprint: &str) -> AppResult<Option<StoredToken>>;

    /// Returns whether a row was removed
    async fn delete_by_fingerprint(&self, fingerprint: &str) -> AppResult<bool>;

    /// Replace a token with a new one in a single transaction.
    ///
    /// Returns `false` without inserting anything when `fingerprint` was
    /// already consumed by a concurrent request.
    async fn rotate(
        &self,
        fingerprint: &str,
        user_id: Uuid,
        replacement: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Revoke every token of a user; returns the number removed
    async fn delete_for_user(&self, user_id: Uuid) -> AppResult<u64>;

    /// Remove tokens that expired at or before `now`
    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// SeaORM implementation of [`TokenRepository`]
pub struct TokenStore {
    db: DatabaseConnection,
}

impl TokenStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenRepository for TokenStore {
    async fn insert(
        &self,
        user_id: Uuid,
        fingerprint: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<StoredToken> {
        insert(&self.db, user_id, fingerprint, expires_at).await
    }

    async fn find_by_fingerprint(&self, fingerprint: &str) -> AppResult<Option<StoredToken>> {
        let result = RememberTokenEntity::find()
            .filter(remember_token::Column::Fingerprint.eq(fingerprint))
            .one(&self.db)
            .await?;
        Ok(result.map(StoredToken::from))
    }

    async fn delete_by_fingerprint(&self, fingerprint: &str) -> AppResult<bool> {
        delete_by_fingerprint(&self.db, fingerprint).await
    }

    async fn rotate(
        &self,
        fingerprint: &str,
        user_id: Uuid,
        replacement: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let txn = self.db.begin().await?;

        match rotate(&txn, fingerprint, user_id, replacement, expires_at).await {
            Ok(rotated) => {
                txn.commit().await?;
                Ok(rotated)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Token rotation rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn delete_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        delete_for_user(&self.db, user_id).await
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = RememberTokenEntity::delete_many()
            .filter(remember_token::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

// =============================================================================
// Shared query bodies (pool or transaction)
// =============================================================================

async fn insert<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    fingerprint: String,
    expires_at: DateTime<Utc>,
) -> AppResult<StoredToken> {
    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        fingerprint: Set(fingerprint),
        created_at: Set(Utc::now()),
        expires_at: Set(expires_at),
    }
    .insert(db)
    .await?;

    Ok(StoredToken::from(model))
}

async fn delete_by_fingerprint<C: ConnectionTrait>(
    db: &C,
    fingerprint: &str,
) -> AppResult<bool> {
    let result = RememberTokenEntity::delete_many()
        .filter(remember_token::Column::Fingerprint.eq(fingerprint))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

async fn rotate<C: ConnectionTrait>(
    db: &C,
    fingerprint: &str,
    user_id: Uuid,
    replacement: String,
    expires_at: DateTime<Utc>,
) -> AppResult<bool> {
    if !delete_by_fingerprint(db, fingerprint).await? {
        return Ok(false);
    }
    insert(db, user_id, replacement, expires_at).await?;
    Ok(true)
}

pub(crate) async fn delete_for_user<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<u64> {
    let result = RememberTokenEntity::delete_many()
        .filter(remember_token::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

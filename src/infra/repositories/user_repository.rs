//! User repository with soft delete support.
//!
//! Query bodies are free functions generic over [`ConnectionTrait`], so the
//! pooled store and the transaction context run the exact same SQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::remember_token::{self, Entity as RememberTokenEntity};
use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::ROLE_USER;
use crate::domain::{User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(test)]
use mockall::automock;

/// Data needed to insert a user row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// User repository trait for dependency injection.
///
/// Lookups exclude soft-deleted rows unless the name says otherwise;
/// availability checks include them so names are never recycled.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find active user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by ID including soft-deleted
    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find active user by username, ignoring case
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Find active user by (lower-cased) email
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find active user by login name: email when it contains `@`, username otherwise
    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>>;

    /// Case-insensitive on every backend
    async fn username_taken(&self, username: &str) -> AppResult<bool>;

    async fn email_taken(&self, email: &str) -> AppResult<bool>;

    /// Insert a new user with the default role
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    async fn set_password(&self, id: Uuid, password_hash: String) -> AppResult<()>;

    /// Record a successful login
    async fn touch_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User>;

    /// Soft delete user by ID (sets deleted_at timestamp)
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Restore a soft-deleted user
    async fn restore(&self, id: Uuid) -> AppResult<User>;

    /// Permanently delete user and their tokens
    async fn hard_delete(&self, id: Uuid) -> AppResult<()>;

    /// Page through users ordered by creation time; returns the page and the total count
    async fn list_paginated(
        &self,
        params: PaginationParams,
        include_deleted: bool,
    ) -> AppResult<(Vec<User>, u64)>;
}

/// SeaORM implementation of [`UserRepository`]
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        find_by_id(&self.db, id).await
    }

    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(username_matches(username))
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;
        Ok(result.map(User::from))
    }

    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let login = login.trim();
        if login.contains('@') {
            self.find_by_email(login).await
        } else {
            self.find_by_username(login).await
        }
    }

    async fn username_taken(&self, username: &str) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(username_matches(username))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn email_taken(&self, email: &str) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(new_user.username),
            email: Set(new_user.email.to_lowercase()),
            password_hash: Set(new_user.password_hash),
            role: Set(ROLE_USER.to_string()),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(User::from(model))
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        set_password(&self.db, id, password_hash).await
    }

    async fn touch_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let mut active = active_user(&self.db, id).await?;
        active.last_login_at = Set(Some(at));
        active.update(&self.db).await?;
        Ok(())
    }

    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        let mut active = active_user(&self.db, id).await?;
        active.role = Set(role.to_string());
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        soft_delete(&self.db, id).await
    }

    async fn restore(&self, id: Uuid) -> AppResult<User> {
        let user = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_not_null())
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::validation("User is not deleted or does not exist"))?;

        let mut active: ActiveModel = user.into();
        active.deleted_at = Set(None);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn hard_delete(&self, id: Uuid) -> AppResult<()> {
        // Not every backend enforces the cascade, so tokens go first.
        RememberTokenEntity::delete_many()
            .filter(remember_token::Column::UserId.eq(id))
            .exec(&self.db)
            .await?;

        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn list_paginated(
        &self,
        params: PaginationParams,
        include_deleted: bool,
    ) -> AppResult<(Vec<User>, u64)> {
        let mut query = UserEntity::find().order_by_asc(user::Column::CreatedAt);
        if !include_deleted {
            query = query.filter(user::Column::DeletedAt.is_null());
        }

        let paginator = query.paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page_index()?).await?;

        Ok((models.into_iter().map(User::from).collect(), total))
    }
}

// =============================================================================
// Shared query bodies (pool or transaction)
// =============================================================================

/// `LOWER(username) = lower(name)`, so MySQL's case-insensitive collation and
/// the case-sensitive Postgres/SQLite comparisons agree.
fn username_matches(username: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(user::Column::Username))).eq(username.to_lowercase())
}

pub(crate) async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<User>> {
    let result = UserEntity::find_by_id(id)
        .filter(user::Column::DeletedAt.is_null())
        .one(db)
        .await?;
    Ok(result.map(User::from))
}

pub(crate) async fn set_password<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    password_hash: String,
) -> AppResult<()> {
    let mut active = active_user(db, id).await?;
    active.password_hash = Set(password_hash);
    active.updated_at = Set(Utc::now());
    active.update(db).await?;
    Ok(())
}

pub(crate) async fn soft_delete<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<()> {
    let mut active = active_user(db, id).await?;
    let now = Utc::now();
    active.deleted_at = Set(Some(now));
    active.updated_at = Set(now);
    active.update(db).await?;
    Ok(())
}

async fn active_user<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<ActiveModel> {
    let model = UserEntity::find_by_id(id)
        .filter(user::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(model.into())
}

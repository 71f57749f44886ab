//! User administration - lookup, listing, role changes and (soft) deletion.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{is_valid_role, VALID_ROLES};
use crate::domain::{User, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

/// User service trait for dependency injection.
///
/// By default, operations exclude soft-deleted users.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get active user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Page through users, optionally including soft-deleted ones
    async fn list_users(
        &self,
        params: PaginationParams,
        include_deleted: bool,
    ) -> AppResult<Paginated<User>>;

    /// Change the role of an active user
    async fn update_role(&self, id: Uuid, role: String) -> AppResult<User>;

    /// Soft delete user and revoke their remember tokens
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;

    /// Restore a soft-deleted user
    async fn restore_user(&self, id: Uuid) -> AppResult<User>;

    /// Permanently delete user from database
    async fn hard_delete_user(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_users(
        &self,
        params: PaginationParams,
        include_deleted: bool,
    ) -> AppResult<Paginated<User>> {
        let page = params.page_index()? + 1;
        let (users, total) = self
            .uow
            .users()
            .list_paginated(params.clone(), include_deleted)
            .await?;
        Ok(Paginated::new(users, page, params.limit(), total))
    }

    async fn update_role(&self, id: Uuid, role: String) -> AppResult<User> {
        if !is_valid_role(&role) {
            return Err(AppError::validation(format!(
                "role must be one of: {}",
                VALID_ROLES.join(", ")
            )));
        }

        let user = self.uow.users().update_role(id, UserRole::from(role.as_str())).await?;
        tracing::info!(user_id = %id, role = %user.role, "User role updated");
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        let revoked = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let revoked = ctx.tokens().delete_for_user(id).await?;
                    ctx.users().delete(id).await?;
                    Ok(revoked)
                })
            })
            .await?;

        tracing::info!(user_id = %id, revoked, "User soft deleted");
        Ok(())
    }

    async fn restore_user(&self, id: Uuid) -> AppResult<User> {
        let user = self.uow.users().restore(id).await?;
        tracing::info!(user_id = %id, "User restored");
        Ok(user)
    }

    async fn hard_delete_user(&self, id: Uuid) -> AppResult<()> {
        self.uow.users().hard_delete(id).await?;
        tracing::warn!(user_id = %id, "User permanently deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ROLE_ADMIN;
    use crate::infra::{
        MockTokenRepository, MockUserRepository, TokenRepository, TransactionContext, TxFuture,
        UserRepository,
    };
    use chrono::Utc;

    struct TestUnitOfWork {
        users: Arc<MockUserRepository>,
    }

    #[async_trait]
    impl UnitOfWork for TestUnitOfWork {
        fn users(&self) -> Arc<dyn UserRepository> {
            self.users.clone()
        }

        fn tokens(&self) -> Arc<dyn TokenRepository> {
            Arc::new(MockTokenRepository::new())
        }

        async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
        where
            F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
            T: Send,
        {
            Err(AppError::internal("Transactions not supported in test mock"))
        }
    }

    fn manager(users: MockUserRepository) -> UserManager<TestUnitOfWork> {
        UserManager::new(Arc::new(TestUnitOfWork {
            users: Arc::new(users),
        }))
    }

    fn sample_user(role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            password_hash: "hash".to_string(),
            role,
            last_login_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let result = manager(users).get_user(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_users_builds_page_meta() {
        let mut users = MockUserRepository::new();
        users
            .expect_list_paginated()
            .withf(|params, include_deleted| params.page == 2 && !*include_deleted)
            .returning(|_, _| Ok((vec![sample_user(UserRole::User)], 21)));

        let page = manager(users)
            .list_users(
                PaginationParams {
                    page: 2,
                    per_page: 10,
                },
                false,
            )
            .await
            .unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.meta.total, 21);
        assert_eq!(page.meta.total_pages, 3);
    }

    #[tokio::test]
    async fn test_list_users_rejects_unreachable_page() {
        // No expectations: the repository must not be queried.
        let result = manager(MockUserRepository::new())
            .list_users(
                PaginationParams {
                    page: u64::MAX,
                    per_page: 100,
                },
                false,
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_update_role_rejects_unknown_role() {
        let result = manager(MockUserRepository::new())
            .update_role(Uuid::new_v4(), "superuser".to_string())
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_role_to_admin() {
        let mut users = MockUserRepository::new();
        users
            .expect_update_role()
            .withf(|_, role| *role == UserRole::Admin)
            .returning(|_, role| Ok(sample_user(role)));

        let user = manager(users)
            .update_role(Uuid::new_v4(), ROLE_ADMIN.to_string())
            .await
            .unwrap();
        assert!(user.is_admin());
    }
}

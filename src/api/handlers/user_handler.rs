//! User administration handlers (admin only).

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::UserResponse;
use crate::errors::{AppError, AppResult};
use crate::types::{NoContent, Paginated, PaginationMeta, PaginationParams};

/// Role change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, message = "role is required"))]
    #[schema(example = "admin")]
    pub role: String,
}

/// Listing filter
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListFilter {
    /// Include soft-deleted accounts
    #[serde(default)]
    pub include_deleted: bool,
}

/// One page of users
#[derive(Debug, Serialize, ToSchema)]
pub struct UserPage {
    pub data: Vec<UserResponse>,
    pub meta: PaginationMeta,
}

impl From<Paginated<UserResponse>> for UserPage {
    fn from(page: Paginated<UserResponse>) -> Self {
        Self {
            data: page.data,
            meta: page.meta,
        }
    }
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user).put(update_role).delete(delete_user))
        .route("/:id/restore", post(restore_user))
        .route("/:id/purge", delete(purge_user))
}

/// List users (admin only)
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("session_cookie" = [])),
    params(PaginationParams, ListFilter),
    responses(
        (status = 200, description = "One page of users", body = UserPage),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_users(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<ListFilter>,
) -> AppResult<Json<UserPage>> {
    require_admin(&current_user)?;

    let page = state
        .user_service
        .list_users(params, filter.include_deleted)
        .await?;

    Ok(Json(UserPage::from(page.map(UserResponse::from))))
}

/// Get user by ID (admin only)
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("session_cookie" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    require_admin(&current_user)?;
    let user = state.user_service.get_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Change a user's role (admin only)
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    security(("session_cookie" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 400, description = "Unknown role"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_role(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    require_admin(&current_user)?;
    let user = state.user_service.update_role(id, payload.role).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Soft delete a user and revoke their remember-me tokens (admin only, not self)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    security(("session_cookie" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete your own account"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&current_user)?;

    if current_user.id == id {
        return Err(AppError::validation("Cannot delete your own account"));
    }

    state.user_service.delete_user(id).await?;
    Ok(NoContent)
}

/// Restore a soft-deleted user (admin only)
#[utoipa::path(
    post,
    path = "/users/{id}/restore",
    tag = "Users",
    security(("session_cookie" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID to restore")
    ),
    responses(
        (status = 200, description = "User restored", body = UserResponse),
        (status = 400, description = "User is not deleted or does not exist"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn restore_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    require_admin(&current_user)?;
    let user = state.user_service.restore_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Permanently delete a user (admin only, not self)
#[utoipa::path(
    delete,
    path = "/users/{id}/purge",
    tag = "Users",
    security(("session_cookie" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User permanently deleted"),
        (status = 400, description = "Cannot delete your own account"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn purge_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&current_user)?;

    if current_user.id == id {
        return Err(AppError::validation("Cannot delete your own account"));
    }

    state.user_service.hard_delete_user(id).await?;
    Ok(NoContent)
}

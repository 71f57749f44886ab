//! Authentication handlers.

use axum::{
    extract::{Extension, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Registration, UserResponse};
use crate::errors::{AppError, AppResult};
use crate::services::LoginAttempt;
use crate::types::{Created, NoContent};

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Username or email address
    #[validate(length(max = 1024, message = "login is too long"))]
    #[schema(example = "jdoe")]
    pub login: String,
    #[validate(length(max = 1024, message = "password is too long"))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
    /// Keep the login across browser restarts
    #[serde(default)]
    pub remember: bool,
}

/// Logout request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LogoutRequest {
    /// Also revoke every remember-me token of the account
    #[serde(default)]
    pub everywhere: bool,
}

/// Password change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(max = 1024, message = "current password is too long"))]
    pub current_password: String,
    #[validate(length(max = 1024, message = "new password is too long"))]
    pub new_password: String,
    #[validate(length(max = 1024, message = "password confirmation is too long"))]
    pub new_password_confirmation: String,
}

/// Account closure request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CloseAccountRequest {
    #[validate(length(min = 1, max = 1024, message = "password is required"))]
    pub password: String,
}

/// Established session
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub user: UserResponse,
    /// Whether a remember-me cookie was issued
    pub persistent: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PasswordChangedResponse {
    /// Remember-me tokens revoked by the change
    pub revoked_tokens: u64,
}

/// Routes that do not need a session
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Routes behind the session middleware
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me).delete(close_account))
        .route("/password", put(change_password))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = Registration,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Rejected; `codes` lists the violations"),
        (status = 409, description = "Account created concurrently")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<Registration>,
) -> AppResult<Created<UserResponse>> {
    let user = state.auth_service.register(payload).await?;
    Ok(Created(UserResponse::from(user)))
}

/// Log in and receive session cookies
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; session cookies set", body = SessionResponse),
        (status = 400, description = "Empty login or password"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<SessionResponse>)> {
    let session = state
        .auth_service
        .login(LoginAttempt {
            login: payload.login,
            password: payload.password,
            remember: payload.remember,
        })
        .await?;

    let persistent = session.state.persistent;
    let mut jar = jar.add(
        state
            .cookies
            .session_cookie(session.session_cookie, persistent),
    );
    if let Some(token) = session.remember_token {
        jar = jar.add(state.cookies.remember_cookie(token.as_str().to_string()));
    }

    Ok((
        jar,
        Json(SessionResponse {
            user: UserResponse::from(session.user),
            persistent,
        }),
    ))
}

/// Log out and clear session cookies
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Authentication",
    request_body = LogoutRequest,
    responses(
        (status = 204, description = "Logged out; cookies cleared")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Option<Json<LogoutRequest>>,
) -> AppResult<(CookieJar, NoContent)> {
    let everywhere = payload.map(|Json(p)| p.everywhere).unwrap_or_default();

    state
        .auth_service
        .logout(state.cookies.presented(&jar), everywhere)
        .await?;

    Ok((state.cookies.clear(jar), NoContent))
}

/// Current account
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Account",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "No valid session")
    )
)]
pub async fn me(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    // A trusted cookie can outlive its account until the next re-check.
    let user = state
        .user_service
        .get_user(current_user.id)
        .await
        .map_err(|e| match e {
            AppError::NotFound => AppError::Unauthorized,
            other => other,
        })?;

    Ok(Json(UserResponse::from(user)))
}

/// Change password; revokes every remember-me token
#[utoipa::path(
    put,
    path = "/auth/password",
    tag = "Account",
    security(("session_cookie" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = PasswordChangedResponse),
        (status = 400, description = "Rejected; `codes` lists the violations"),
        (status = 401, description = "No valid session or wrong current password")
    )
)]
pub async fn change_password(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<Json<PasswordChangedResponse>> {
    let revoked_tokens = state
        .auth_service
        .change_password(
            current_user.id,
            payload.current_password,
            payload.new_password,
            payload.new_password_confirmation,
        )
        .await?;

    Ok(Json(PasswordChangedResponse { revoked_tokens }))
}

/// Close the current account
#[utoipa::path(
    delete,
    path = "/auth/me",
    tag = "Account",
    security(("session_cookie" = [])),
    request_body = CloseAccountRequest,
    responses(
        (status = 204, description = "Account closed; cookies cleared"),
        (status = 401, description = "No valid session or wrong password")
    )
)]
pub async fn close_account(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<CloseAccountRequest>,
) -> AppResult<(CookieJar, NoContent)> {
    state
        .auth_service
        .close_account(current_user.id, payload.password)
        .await?;

    Ok((state.cookies.clear(jar), NoContent))
}

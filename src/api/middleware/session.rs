//! Cookie session middleware.

use axum::{
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::api::AppState;
use crate::domain::{SessionState, UserRole};
use crate::errors::AppError;
use crate::services::ResumeSource;

/// Authenticated user resolved from the session cookies
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub persistent: bool,
    pub source: ResumeSource,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    fn new(state: SessionState, source: ResumeSource) -> Self {
        Self {
            id: state.user_id,
            username: state.username,
            role: state.role,
            persistent: state.persistent,
            source,
        }
    }
}

/// Session middleware.
///
/// Resumes the session from the request cookies, injects the [`CurrentUser`]
/// into the request extensions and writes any cookie changes to the response,
/// including on the 401 returned for anonymous requests.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = state.cookies.presented(&jar);
    let resumption = state.auth_service.resume(presented).await?;
    let jar = state.cookies.apply(jar, &resumption);

    let Some(session) = resumption.state else {
        return Ok((jar, AppError::Unauthorized).into_response());
    };

    tracing::debug!(user_id = %session.user_id, source = ?resumption.source, "Session resumed");
    request
        .extensions_mut()
        .insert(CurrentUser::new(session, resumption.source));

    let response = next.run(request).await;

    // Handlers that write cookies themselves (closing the account) take precedence.
    if response.headers().contains_key(SET_COOKIE) {
        return Ok(response);
    }

    Ok((jar, response).into_response())
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

//! OpenAPI document, served as JSON.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, user_handler};
use crate::domain::{Registration, UserResponse, UserRole};
use crate::types::PaginationMeta;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "doorman",
        version = "0.1.0",
        description = "Account registration, cookie sessions with remember-me login, and user administration",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        auth_handler::logout,
        auth_handler::me,
        auth_handler::change_password,
        auth_handler::close_account,
        user_handler::list_users,
        user_handler::get_user,
        user_handler::update_role,
        user_handler::delete_user,
        user_handler::restore_user,
        user_handler::purge_user,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            Registration,
            PaginationMeta,
            auth_handler::LoginRequest,
            auth_handler::LogoutRequest,
            auth_handler::ChangePasswordRequest,
            auth_handler::CloseAccountRequest,
            auth_handler::SessionResponse,
            auth_handler::PasswordChangedResponse,
            user_handler::UpdateRoleRequest,
            user_handler::UserPage,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and logout"),
        (name = "Account", description = "Operations on the logged-in account"),
        (name = "Users", description = "User administration")
    )
)]
pub struct ApiDoc;

/// Documents the session cookie; its real name is derived per deployment.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "session",
                    "Sealed session cookie set by /auth/login",
                ))),
            );
        }
    }
}

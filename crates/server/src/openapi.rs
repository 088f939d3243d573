use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    /// Ignored unless admin self-registration is enabled.
    pub is_admin: Option<bool>,
}

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct UserDoc {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
    /// RFC 3339 timestamp
    pub created_at: String,
    /// RFC 3339 timestamp
    pub updated_at: String,
}

#[derive(ToSchema)]
pub struct AuthResponseDoc { pub message: String, pub user: UserDoc, pub access_token: String }

#[derive(ToSchema)]
pub struct TokenValidationDoc { pub valid: bool, pub user: Option<UserDoc>, pub error: Option<String> }

#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String }

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::test_api,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::me,
        crate::routes::auth::validate_token,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            UserDoc,
            AuthResponseDoc,
            TokenValidationDoc,
            ErrorDoc,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth")
    )
)]
pub struct ApiDoc;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Serialize;
use tracing::{info, warn, Span};

use service::auth::{
    domain::{AuthSession, AuthUser, LoginInput, RegisterInput},
    errors::AuthError,
    repo::seaorm::SeaOrmAuthRepository,
    service::AuthService,
    token::Claims,
};

use crate::errors::{ApiError, USER_NOT_FOUND};

pub type SharedAuthService = Arc<AuthService<SeaOrmAuthRepository>>;

#[derive(Clone)]
pub struct ServerState {
    pub auth: SharedAuthService,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: AuthUser,
    pub access_token: String,
}

impl AuthResponse {
    fn new(message: &'static str, session: AuthSession) -> Self {
        Self { message, user: session.user, access_token: session.token }
    }
}

#[derive(Serialize)]
pub struct TokenValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

#[utoipa::path(post, path = "/register", tag = "auth", request_body = crate::openapi::RegisterRequest,
    responses((status = 201, description = "Registered", body = crate::openapi::AuthResponseDoc), (status = 400, description = "Missing field or duplicate email/username", body = crate::openapi::ErrorDoc)))]
pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(input) = payload?;
    let session = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::new("User registered successfully", session))))
}

#[utoipa::path(post, path = "/login", tag = "auth", request_body = crate::openapi::LoginRequest,
    responses((status = 200, description = "Logged in", body = crate::openapi::AuthResponseDoc), (status = 400, description = "Missing email or password", body = crate::openapi::ErrorDoc),
        (status = 401, description = "Invalid email or password", body = crate::openapi::ErrorDoc), (status = 500, description = "Internal error", body = crate::openapi::ErrorDoc)))]
pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(input) = payload?;
    let session = state.auth.login(input).await?;
    Ok(Json(AuthResponse::new("Login successful", session)))
}

#[utoipa::path(get, path = "/me", tag = "auth", security(("bearer" = [])),
    responses((status = 200, description = "Current user", body = crate::openapi::UserDoc), (status = 401, description = "Missing or invalid token", body = crate::openapi::ErrorDoc),
        (status = 404, description = "User no longer exists", body = crate::openapi::ErrorDoc)))]
pub async fn me(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AuthUser>, ApiError> {
    let user = state.auth.current_user(&claims).await?;
    Ok(Json(user))
}

#[utoipa::path(get, path = "/validate-token", tag = "auth", security(("bearer" = [])),
    responses((status = 200, description = "Token valid", body = crate::openapi::TokenValidationDoc), (status = 401, description = "Token unusable", body = crate::openapi::TokenValidationDoc),
        (status = 404, description = "User no longer exists", body = crate::openapi::TokenValidationDoc)))]
pub async fn validate_token(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
) -> (StatusCode, Json<TokenValidation>) {
    match state.auth.validate_token(&claims).await {
        Ok(user) => (StatusCode::OK, Json(TokenValidation { valid: true, user: Some(user), error: None })),
        Err(AuthError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(TokenValidation { valid: false, user: None, error: Some(USER_NOT_FOUND) }),
        ),
        Err(e) => {
            warn!(code = e.code(), error = %e, "token validation failed");
            (
                StatusCode::UNAUTHORIZED,
                Json(TokenValidation { valid: false, user: None, error: Some("Token validation failed") }),
            )
        }
    }
}

/// Route middleware: requires `Authorization: Bearer <token>` with a valid
/// signature and expiry, then exposes the claims as a request extension.
pub async fn require_bearer_token(
    State(state): State<ServerState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        warn!(%path, "missing or malformed Authorization header");
        return ApiError::unauthorized("Missing Authorization header").into_response();
    };

    match state.auth.verify_token(bearer.token()) {
        Ok(claims) => {
            Span::current().record("user_id", claims.sub.as_str());
            info!(%path, "bearer token accepted");
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => {
            warn!(%path, err = %e, "token validation failed");
            ApiError::from(e).into_response()
        }
    }
}

pub mod auth;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::{Health, TestMessage};

use crate::openapi::ApiDoc;
use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[utoipa::path(get, path = "/test", tag = "health", responses((status = 200, description = "Unauthenticated probe")))]
pub async fn test_api() -> Json<TestMessage> {
    Json(TestMessage::working())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Per-request span; `user_id` is filled in once a bearer token is accepted.
fn request_span(req: &Request<Body>) -> tracing::Span {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "http_request",
        method = %req.method(),
        uri = %req.uri(),
        request_id = %request_id,
        user_id = tracing::field::Empty,
    )
}

/// Build the full application router: public auth routes, bearer-protected
/// routes, and the tracing/request-id/CORS layers around them.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/test", get(test_api))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/api-docs/openapi.json", get(openapi_json));

    let protected = Router::new()
        .route("/me", get(auth::me))
        .route("/validate-token", get(auth::validate_token))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token));

    public
        .merge(protected)
        .with_state(state)
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{json, Value};
use tower::ServiceExt;

use configs::AppConfig;
use server::routes::auth::ServerState;
use server::startup::{build_app, build_state};
use service::auth::domain::UserId;
use service::auth::repository::AuthRepository;

const SECRET: &str = "test-secret";

fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.database.url = "sqlite::memory:".into();
    cfg.database.max_connections = 1;
    cfg.database.min_connections = 1;
    cfg.auth.jwt_secret = SECRET.into();
    cfg
}

async fn build_test_app() -> anyhow::Result<(Router, ServerState)> {
    let state = build_state(&test_config()).await?;
    Ok((build_app(state.clone()), state))
}

async fn send(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, body))
}

fn post_json(uri: &str, body: Value) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body)?))?)
}

fn get_with_token(uri: &str, token: Option<&str>) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    Ok(builder.body(Body::empty())?)
}

fn token_subject(token: &str) -> anyhow::Result<String> {
    let data = decode::<Value>(token, &DecodingKey::from_secret(SECRET.as_bytes()), &Validation::new(Algorithm::HS256))?;
    Ok(data.claims["sub"].as_str().unwrap_or_default().to_string())
}

fn signed_token(sub: &str, exp_offset_secs: i64) -> anyhow::Result<String> {
    let now = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH)?.as_secs() as i64;
    let claims = json!({"sub": sub, "iat": now, "exp": now + exp_offset_secs});
    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))?)
}

async fn register(app: &Router, email: &str, username: &str, password: &str) -> anyhow::Result<(StatusCode, Value)> {
    send(app, post_json("/register", json!({"email": email, "username": username, "password": password}))?).await
}

#[tokio::test]
async fn test_register_and_login_flow() -> anyhow::Result<()> {
    let (app, _) = build_test_app().await?;

    let (status, body) = register(&app, "a@x.com", "alice", "pw123").await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    let user_id = body["user"]["id"].as_i64().expect("numeric id");
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["is_admin"], false);
    assert!(body["user"]["created_at"].is_string());
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
    let token = body["access_token"].as_str().expect("token");
    assert_eq!(token_subject(token)?, user_id.to_string());

    let (status, body) = send(&app, post_json("/login", json!({"email": "a@x.com", "password": "pw123"}))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["id"].as_i64(), Some(user_id));
    let token = body["access_token"].as_str().expect("token");
    assert_eq!(token_subject(token)?, user_id.to_string());
    Ok(())
}

#[tokio::test]
async fn test_login_failures_share_one_message() -> anyhow::Result<()> {
    let (app, _) = build_test_app().await?;
    register(&app, "a@x.com", "alice", "pw123").await?;

    let (status, wrong_pw) = send(&app, post_json("/login", json!({"email": "a@x.com", "password": "wrong"}))?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw, json!({"error": "Invalid email or password"}));

    let (status, unknown) = send(&app, post_json("/login", json!({"email": "b@x.com", "password": "pw123"}))?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, wrong_pw);
    Ok(())
}

#[tokio::test]
async fn test_login_requires_email_and_password() -> anyhow::Result<()> {
    let (app, _) = build_test_app().await?;
    let (status, body) = send(&app, post_json("/login", json!({"email": "a@x.com"}))?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password are required");
    Ok(())
}

#[tokio::test]
async fn test_register_duplicates_rejected() -> anyhow::Result<()> {
    let (app, _) = build_test_app().await?;
    register(&app, "a@x.com", "alice", "pw123").await?;

    let (status, body) = register(&app, "a@x.com", "someone-else", "pw123").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");

    let (status, body) = register(&app, "new@x.com", "alice", "pw123").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already taken");
    Ok(())
}

#[tokio::test]
async fn test_register_missing_field_creates_no_row() -> anyhow::Result<()> {
    let (app, state) = build_test_app().await?;

    let (status, body) = send(&app, post_json("/register", json!({"email": "a@x.com", "username": "alice"}))?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required field: password");
    assert!(state.auth.repository().find_user_by_email("a@x.com").await?.is_none());

    let (status, body) = send(&app, post_json("/register", json!({"username": "alice", "password": "pw"}))?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required field: email");
    Ok(())
}

#[tokio::test]
async fn test_register_rejects_non_json_body() -> anyhow::Result<()> {
    let (app, _) = build_test_app().await?;
    let req = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))?;
    let (status, body) = send(&app, req).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().starts_with("Invalid JSON body"));
    Ok(())
}

#[tokio::test]
async fn test_self_registration_does_not_grant_admin() -> anyhow::Result<()> {
    let (app, _) = build_test_app().await?;
    let (status, body) = send(
        &app,
        post_json("/register", json!({"email": "a@x.com", "username": "alice", "password": "pw", "is_admin": true}))?,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["is_admin"], false);
    Ok(())
}

#[tokio::test]
async fn test_me_follows_token_and_user_lifecycle() -> anyhow::Result<()> {
    let (app, state) = build_test_app().await?;
    let (_, registered) = register(&app, "a@x.com", "alice", "pw123").await?;
    let token = registered["access_token"].as_str().expect("token").to_string();

    let (status, body) = send(&app, get_with_token("/me", None)?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, get_with_token("/me", Some("garbage"))?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, get_with_token("/me", Some(&token))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], registered["user"]["id"]);
    assert_eq!(body["email"], "a@x.com");
    assert!(body.get("password_hash").is_none());

    let id = UserId(registered["user"]["id"].as_i64().expect("id") as i32);
    assert!(state.auth.repository().delete_user(id).await?);

    let (status, body) = send(&app, get_with_token("/me", Some(&token))?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "User not found"}));
    Ok(())
}

#[tokio::test]
async fn test_validate_token_reports_validity() -> anyhow::Result<()> {
    let (app, state) = build_test_app().await?;
    let (_, registered) = register(&app, "a@x.com", "alice", "pw123").await?;
    let token = registered["access_token"].as_str().expect("token").to_string();

    let (status, body) = send(&app, get_with_token("/validate-token", Some(&token))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["user"]["id"], registered["user"]["id"]);

    let id = UserId(registered["user"]["id"].as_i64().expect("id") as i32);
    state.auth.repository().delete_user(id).await?;

    let (status, body) = send(&app, get_with_token("/validate-token", Some(&token))?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"valid": false, "error": "User not found"}));

    let (status, _) = send(&app, get_with_token("/validate-token", None)?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_public_endpoints_and_request_id() -> anyhow::Result<()> {
    let (app, _) = build_test_app().await?;

    let (status, body) = send(&app, get_with_token("/test", None)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "API is working correctly", "status": "success"}));

    let resp = app.clone().oneshot(get_with_token("/health", None)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let (status, body) = send(&app, get_with_token("/api-docs/openapi.json", None)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/validate-token"].is_object());
    Ok(())
}

#[tokio::test]
async fn test_non_numeric_subject_fails_validation() -> anyhow::Result<()> {
    let (app, _) = build_test_app().await?;
    let token = signed_token("alice", 900)?;

    let (status, body) = send(&app, get_with_token("/validate-token", Some(&token))?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"valid": false, "error": "Token validation failed"}));

    let (status, body) = send(&app, get_with_token("/me", Some(&token))?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Invalid or expired token"}));
    Ok(())
}

#[tokio::test]
async fn test_expired_token_is_rejected() -> anyhow::Result<()> {
    let (app, _) = build_test_app().await?;
    let (_, registered) = register(&app, "a@x.com", "alice", "pw123").await?;
    let sub = registered["user"]["id"].as_i64().expect("id").to_string();
    let token = signed_token(&sub, -3600)?;

    let (status, body) = send(&app, get_with_token("/me", Some(&token))?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Invalid or expired token"}));

    let (status, _) = send(&app, get_with_token("/validate-token", Some(&token))?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

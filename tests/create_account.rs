use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    response::Response,
    Router,
};
use signup::account::{SignupConfig, SignupService};
use signup::api::app;
use signup::codestore::InMemoryCodeStore;
use signup::directory::{InMemoryDirectory, UserAccount, UserDirectory, UserFilter};
use std::sync::Arc;
use tower::ServiceExt;

struct Harness {
    directory: Arc<InMemoryDirectory>,
    code_store: Arc<InMemoryCodeStore>,
    app: Router,
}

fn harness() -> Harness {
    let directory = Arc::new(InMemoryDirectory::new());
    let code_store = Arc::new(InMemoryCodeStore::new());
    let service = Arc::new(SignupService::new(
        directory.clone(),
        code_store.clone(),
        &SignupConfig::default(),
    ));
    Harness {
        directory,
        code_store,
        app: app(service),
    }
}

async fn post_json(app: &Router, body: &str) -> Result<Response> {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/create_account")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?;
    Ok(app.clone().oneshot(request).await?)
}

async fn body_bytes(response: Response) -> Result<Vec<u8>> {
    Ok(to_bytes(response.into_body(), usize::MAX).await?.to_vec())
}

const SIGNUP: &str = r#"{"email":"user@example.com","password":"secret","client_id":"login"}"#;

#[tokio::test]
async fn new_email_returns_created_with_code() -> Result<()> {
    let harness = harness();

    let response = post_json(&harness.app, SIGNUP).await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers().contains_key("x-request-id"));

    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await?)?;
    let user_id = body["user_id"].as_str().unwrap_or_default().to_string();
    let code = body["code"].as_str().unwrap_or_default().to_string();
    assert!(!user_id.is_empty());
    assert!(!code.is_empty());

    let issued = harness.code_store.peek(&code).await;
    assert_eq!(
        issued.map(|issued| issued.data),
        Some(format!(r#"{{"user_id":"{user_id}","client_id":"login"}}"#))
    );
    Ok(())
}

#[tokio::test]
async fn repeated_signup_reuses_account_and_issues_new_code() -> Result<()> {
    let harness = harness();

    let first: serde_json::Value =
        serde_json::from_slice(&body_bytes(post_json(&harness.app, SIGNUP).await?).await?)?;
    let second: serde_json::Value =
        serde_json::from_slice(&body_bytes(post_json(&harness.app, SIGNUP).await?).await?)?;

    assert_eq!(first["user_id"], second["user_id"]);
    assert_ne!(first["code"], second["code"]);
    assert_eq!(harness.directory.len().await, 1);
    assert_eq!(harness.code_store.len().await, 2);
    Ok(())
}

#[tokio::test]
async fn verified_email_returns_conflict_with_empty_body() -> Result<()> {
    let harness = harness();
    let mut verified = UserAccount::unverified("user@example.com");
    verified.verified = true;
    verified.active = true;
    harness.directory.insert(verified).await;

    let response = post_json(&harness.app, SIGNUP).await?;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(body_bytes(response).await?.is_empty());
    assert!(harness.code_store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn malformed_payload_is_bad_request() -> Result<()> {
    let harness = harness();

    let response = post_json(&harness.app, r#"{"email":"user@example.com"}"#).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_bytes(response).await?, b"Missing payload");
    assert!(harness.directory.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn blank_client_id_is_bad_request() -> Result<()> {
    let harness = harness();

    let response = post_json(
        &harness.app,
        r#"{"email":"user@example.com","password":"secret","client_id":""}"#,
    )
    .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let found = harness
        .directory
        .query(&UserFilter::internal("user@example.com"))
        .await?;
    assert!(found.is_empty());
    Ok(())
}

#[tokio::test]
async fn health_reports_in_memory_collaborators() -> Result<()> {
    let harness = harness();
    let request = Request::builder().uri("/health").body(Body::empty())?;

    let response = harness.app.clone().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-app"));
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await?)?;
    assert_eq!(body["directory"], "ok");
    assert_eq!(body["code_store"], "ok");
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> Result<()> {
    let harness = harness();
    let request = Request::builder()
        .uri("/api-docs/openapi.json")
        .body(Body::empty())?;

    let response = harness.app.clone().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await?)?;
    assert!(body["paths"]["/create_account"].is_object());
    Ok(())
}

use crate::account::SignupService;
use crate::GIT_COMMIT_HASH;
use axum::{
    extract::Extension,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    directory: String,
    code_store: String,
}

fn status(ok: bool) -> String {
    let status = if ok { "ok" } else { "error" };
    status.to_string()
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "User directory and code store are healthy", body = [Health]),
        (status = 503, description = "User directory or code store is unhealthy", body = [Health])
    ),
    tag= "health"
)]
// axum handler for health
pub async fn health(service: Extension<Arc<SignupService>>) -> impl IntoResponse {
    let report = service.health().await;

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        directory: status(report.directory),
        code_store: status(report.code_store),
    };

    let short_hash = if health.commit.len() > 7 {
        &health.commit[0..7]
    } else {
        ""
    };

    let headers = format!("{}:{}:{}", health.name, health.version, short_hash)
        .parse::<HeaderValue>()
        .map(|x_app_header_value| {
            debug!("X-App header: {:?}", x_app_header_value);

            let mut headers = HeaderMap::new();
            headers.insert("X-App", x_app_header_value);
            headers
        })
        .map_err(|err| {
            error!("Failed to parse X-App header: {}", err);
        })
        .unwrap_or_else(|()| HeaderMap::new());

    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, headers, Json(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::SignupConfig;
    use crate::codestore::{CodeStoreError, ExpiringCodeStore, InMemoryCodeStore, IssuedCode};
    use crate::directory::InMemoryDirectory;
    use anyhow::Result;
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use std::time::SystemTime;

    struct DownCodeStore;

    #[async_trait]
    impl ExpiringCodeStore for DownCodeStore {
        async fn generate(
            &self,
            _data: &str,
            _expires_at: SystemTime,
        ) -> Result<IssuedCode, CodeStoreError> {
            Err(CodeStoreError::unavailable("down"))
        }

        async fn health(&self) -> Result<(), CodeStoreError> {
            Err(CodeStoreError::unavailable("down"))
        }
    }

    async fn body_json(response: axum::response::Response) -> Result<serde_json::Value> {
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    #[tokio::test]
    async fn healthy_collaborators_report_ok() -> Result<()> {
        let service = Arc::new(SignupService::new(
            Arc::new(InMemoryDirectory::new()),
            Arc::new(InMemoryCodeStore::new()),
            &SignupConfig::default(),
        ));

        let response = health(Extension(service)).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let x_app = response
            .headers()
            .get("X-App")
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        assert!(x_app.is_some_and(|value| value.starts_with("signup:")));

        let json = body_json(response).await?;
        assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(json["directory"], "ok");
        assert_eq!(json["code_store"], "ok");
        Ok(())
    }

    #[tokio::test]
    async fn failing_code_store_is_unavailable() -> Result<()> {
        let service = Arc::new(SignupService::new(
            Arc::new(InMemoryDirectory::new()),
            Arc::new(DownCodeStore),
            &SignupConfig::default(),
        ));

        let response = health(Extension(service)).await.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await?;
        assert_eq!(json["directory"], "ok");
        assert_eq!(json["code_store"], "error");
        Ok(())
    }
}

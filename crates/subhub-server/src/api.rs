use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use subhub_shared::constants::UPLOAD_ROUTE;
use subhub_shared::link::subscription_url;
use subhub_shared::protocol::{UploadRequest, UploadResponse};
use subhub_shared::FileId;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::file_store::FileStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FileStore>,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    // JSON string escaping can make the body larger than the content itself.
    let body_limit = state.config.max_content_size.saturating_mul(2);

    Router::new()
        .route("/health", get(health_check))
        .route(UPLOAD_ROUTE, post(upload))
        .route("/api/sub/{id}", get(fetch_subscription))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Store new content, optionally replacing an earlier upload.
///
/// Every handled failure is reported as `Code: 0` in a 200 response; the
/// web client only looks at the body.
async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<UploadRequest>, JsonRejection>,
) -> Json<UploadResponse> {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected upload body");
            return Json(UploadResponse::failure(rejection.body_text()));
        }
    };

    let replaced = req.replaced_id();
    let id = match state.store.replace(&req.content, replaced).await {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "Upload failed");
            return Json(UploadResponse::failure(upload_failure_message(&e)));
        }
    };

    let url = subscription_url(&resolve_base_url(&state.config, &headers), &id);
    info!(
        id = %id,
        size = req.content.len(),
        replaced = replaced.unwrap_or("-"),
        "Subscription uploaded"
    );

    let message = if replaced.is_some() { "updated" } else { "uploaded" };
    Json(UploadResponse::success(url, message))
}

fn upload_failure_message(err: &ServerError) -> String {
    match err {
        ServerError::Storage(_) => "Failed to store subscription".to_string(),
        other => other.to_string(),
    }
}

async fn fetch_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let id = FileId::parse(&id)?;

    let content = state.store.read(&id).await.map_err(|e| {
        if !matches!(e, ServerError::NotFound(_)) {
            warn!(id = %id, error = %e, "Failed to read subscription");
        }
        ServerError::NotFound(id.clone())
    })?;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], content))
}

/// Public base URL for generated links.
///
/// `BASE_URL` wins. Otherwise the scheme and host come from the
/// `X-Forwarded-*` headers (when trusted), then the `Host` header, then the
/// listen address. Header values are taken as-is.
pub fn resolve_base_url(config: &ServerConfig, headers: &HeaderMap) -> String {
    if let Some(base) = &config.base_url {
        return base.clone();
    }

    let forwarded = |name: &str| {
        config
            .trust_proxy_headers
            .then(|| first_header_value(headers, name))
            .flatten()
    };

    let proto = forwarded("x-forwarded-proto").unwrap_or("http");
    let host = forwarded("x-forwarded-host")
        .or_else(|| first_header_value(headers, header::HOST.as_str()));

    match host {
        Some(host) => format!("{proto}://{host}"),
        None => format!("http://{}", config.http_addr),
    }
}

fn first_header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_on(listener, state).await
}

/// Serve on an already bound listener (port 0 in tests).
pub async fn serve_on(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    info!(addr = %listener.local_addr()?, "Starting HTTP API server");

    axum::serve(listener, build_router(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn test_state(config: ServerConfig) -> (AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().to_path_buf(), config.max_content_size)
            .await
            .unwrap();
        let state = AppState {
            store: Arc::new(store),
            config: Arc::new(config),
        };
        (state, dir)
    }

    fn upload_request(body: serde_json::Value) -> Request<Body> {
        Request::post("/api/upload")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::HOST, "sub.local:8080")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn upload_json(app: &Router, body: serde_json::Value) -> UploadResponse {
        let resp = app.clone().oneshot(upload_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn fetch(app: &Router, path: &str) -> (StatusCode, Option<String>, String) {
        let resp = app
            .clone()
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn url_path(url: &str) -> &str {
        let after_scheme = url.split_once("://").unwrap().1;
        &after_scheme[after_scheme.find('/').unwrap()..]
    }

    #[tokio::test]
    async fn test_upload_then_fetch_round_trips() {
        let (state, _dir) = test_state(ServerConfig::default()).await;
        let app = build_router(state);
        let content = "ss://YWVzLTI1Ni1nY206cGFzcw@1.2.3.4:8388#node\n  trailing spaces  ";

        let resp = upload_json(&app, serde_json::json!({ "content": content })).await;
        assert!(resp.is_success());
        assert_eq!(resp.message, "uploaded");
        let url = resp.url.unwrap();
        assert!(url.starts_with("http://sub.local:8080/api/sub/"));

        let (status, content_type, body) = fetch(&app, url_path(&url)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
        assert_eq!(body, content);
    }

    #[tokio::test]
    async fn test_upload_with_old_id_removes_old_file() {
        let (state, _dir) = test_state(ServerConfig::default()).await;
        let app = build_router(state);

        let first = upload_json(&app, serde_json::json!({ "content": "v1" })).await;
        let first_url = first.url.unwrap();
        let old_id = first_url.rsplit('/').next().unwrap().to_string();

        let second =
            upload_json(&app, serde_json::json!({ "content": "v2", "oldId": old_id })).await;
        assert!(second.is_success());
        assert_eq!(second.message, "updated");

        let (status, _, _) = fetch(&app, url_path(&first_url)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _, body) = fetch(&app, url_path(second.url.as_deref().unwrap())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "v2");
    }

    #[tokio::test]
    async fn test_unknown_old_id_still_succeeds() {
        let (state, _dir) = test_state(ServerConfig::default()).await;
        let app = build_router(state);

        let resp =
            upload_json(&app, serde_json::json!({ "content": "v", "oldId": "nosuchfile" })).await;
        assert!(resp.is_success());
    }

    #[tokio::test]
    async fn test_blank_content_is_code_zero() {
        let (state, dir) = test_state(ServerConfig::default()).await;
        let app = build_router(state);

        for content in ["", "   \n\t "] {
            let resp = upload_json(&app, serde_json::json!({ "content": content })).await;
            assert!(!resp.is_success());
            assert_eq!(resp.url, None);
            assert!(!resp.message.is_empty());
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_oversize_content_is_code_zero() {
        let config = ServerConfig {
            max_content_size: 16,
            ..ServerConfig::default()
        };
        let (state, _dir) = test_state(config).await;
        let app = build_router(state);

        let resp = upload_json(&app, serde_json::json!({ "content": "x".repeat(17) })).await;
        assert!(!resp.is_success());
    }

    #[tokio::test]
    async fn test_malformed_body_is_code_zero() {
        let (state, _dir) = test_state(ServerConfig::default()).await;
        let app = build_router(state);

        let req = Request::post("/api/upload")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"content\": 42}"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let parsed: UploadResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(!parsed.is_success());
    }

    #[tokio::test]
    async fn test_fetch_missing_or_malformed_is_404() {
        let (state, _dir) = test_state(ServerConfig::default()).await;
        let app = build_router(state);

        let (status, _, body) = fetch(&app, "/api/sub/doesnotexist").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "subscription not found");

        let (status, _, _) = fetch(&app, "/api/sub/..%2F..%2Fetc%2Fpasswd").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _dir) = test_state(ServerConfig::default()).await;
        let (status, _, body) = fetch(&build_router(state), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"ok\""));
    }

    #[test]
    fn test_base_url_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "internal:3000".parse().unwrap());

        let config = ServerConfig::default();
        assert_eq!(resolve_base_url(&config, &headers), "http://internal:3000");

        headers.insert("x-forwarded-proto", "https, http".parse().unwrap());
        headers.insert("x-forwarded-host", "sub.example.com".parse().unwrap());
        assert_eq!(resolve_base_url(&config, &headers), "https://sub.example.com");

        headers.insert("x-forwarded-host", "a.example, b.example".parse().unwrap());
        assert_eq!(resolve_base_url(&config, &headers), "https://a.example");

        let untrusting = ServerConfig {
            trust_proxy_headers: false,
            ..ServerConfig::default()
        };
        assert_eq!(resolve_base_url(&untrusting, &headers), "http://internal:3000");

        let pinned = ServerConfig {
            base_url: Some("https://pinned.example".into()),
            ..ServerConfig::default()
        };
        assert_eq!(resolve_base_url(&pinned, &headers), "https://pinned.example");
    }

    #[test]
    fn test_base_url_without_headers_uses_listen_addr() {
        let config = ServerConfig::default();
        assert_eq!(
            resolve_base_url(&config, &HeaderMap::new()),
            "http://0.0.0.0:8080"
        );
    }
}

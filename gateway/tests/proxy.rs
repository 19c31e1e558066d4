use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use gateway::{proxy, CacheStorage, Gateway, GatewayConfig, GatewayError, GatewayRequest, GatewayResponse, Network};
use tower::ServiceExt;

/// Origin that answers only the manifest and refuses everything else.
struct ManifestOnly;

impl Network for ManifestOnly {
    async fn fetch(&self, request: &GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        match request.target.as_str() {
            "/index.html" => Ok(GatewayResponse::new(
                200,
                vec![("content-type".into(), "text/html".into())],
                "<html></html>",
            )),
            other => Err(GatewayError::network(other, "connection refused")),
        }
    }
}

async fn app() -> axum::Router {
    let config = GatewayConfig { generation: "test".into(), manifest: vec!["/index.html".into()] };
    let gateway = Gateway::new(ManifestOnly, CacheStorage::temporary().unwrap(), config);
    gateway.install().await.unwrap();
    gateway.activate().unwrap();
    proxy::router(Arc::new(gateway))
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let resp = app.oneshot(Request::get(uri).body(Body::empty()).unwrap()).await.unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec();
    (status, content_type, body)
}

#[tokio::test]
async fn cached_asset_is_served_over_http() {
    let (status, content_type, body) = get(app().await, "/index.html").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/html"));
    assert_eq!(body, b"<html></html>");
}

#[tokio::test]
async fn unreachable_api_answers_offline_json() {
    let (status, content_type, body) = get(app().await, "/api/recipes/abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Offline");
}

#[tokio::test]
async fn unreachable_uncached_asset_is_bad_gateway() {
    let (status, _, _) = get(app().await, "/logo.png").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn scheme_relative_target_is_rejected() {
    let (status, _, body) = get(app().await, "//evil.example/steal?x=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&body).contains("evil.example"));
}

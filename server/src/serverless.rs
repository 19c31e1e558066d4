//! Per-invocation hosting: each event is a self-contained HTTP request that
//! runs through the same router the long-running server uses.

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderName, HeaderValue, Request};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tower::ServiceExt;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;

const MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    #[serde(default = "default_method")]
    pub method: String,
    pub path: String,
    /// Raw query string without the leading `?`.
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl InvocationResult {
    fn error(status_code: u16, error: &str, details: String) -> Self {
        let body = serde_json::json!({ "error": error, "details": details });
        Self {
            status_code,
            headers: BTreeMap::from([(header::CONTENT_TYPE.to_string(), "application/json".to_string())]),
            body: body.to_string(),
        }
    }

    /// The event itself was malformed.
    fn rejected(details: String) -> Self {
        Self::error(400, "invalid invocation", details)
    }

    /// The event was fine but the adapter could not produce a response.
    fn failed(details: String) -> Self {
        Self::error(500, "invocation failed", details)
    }
}

/// Owns the context for the adapter's lifetime so the store opened by the
/// first invocation is reused by the following ones.
pub struct Adapter {
    ctx: AppContext,
    app: Router,
    response_limit: usize,
}

impl Adapter {
    pub fn new(ctx: AppContext) -> Self {
        let app = crate::build_api_router(ctx.clone()).layer(TraceLayer::new_for_http());
        Self { ctx, app, response_limit: MAX_RESPONSE_BYTES }
    }

    /// Cap on a buffered response body; larger responses fail the invocation.
    pub fn with_response_limit(mut self, limit: usize) -> Self {
        self.response_limit = limit;
        self
    }

    pub fn for_path<P: AsRef<Path>>(db_path: P) -> Self {
        Self::new(AppContext::new(db_path))
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub async fn invoke(&self, invocation: Invocation) -> Result<InvocationResult> {
        let request = to_request(invocation)?;
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> Result<InvocationResult> {
        let response = self.app.clone().oneshot(request).await?;

        let status_code = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
            .collect();
        let bytes = to_bytes(response.into_body(), self.response_limit)
            .await
            .context("reading response body")?;
        let body = String::from_utf8_lossy(&bytes).into_owned();
        Ok(InvocationResult { status_code, headers, body })
    }

    /// One JSON event in, one JSON result out. Malformed events get a 400,
    /// faults while producing the response a 500.
    pub async fn invoke_line(&self, line: &str) -> String {
        let request = serde_json::from_str::<Invocation>(line)
            .map_err(anyhow::Error::from)
            .and_then(to_request);
        let result = match request {
            Ok(request) => self.dispatch(request).await.unwrap_or_else(|err| {
                tracing::error!(error = %format!("{err:#}"), "invocation failed");
                InvocationResult::failed(format!("{err:#}"))
            }),
            Err(err) => InvocationResult::rejected(format!("{err:#}")),
        };
        serde_json::to_string(&result).unwrap_or_else(|_| String::from("{}"))
    }
}

fn to_request(invocation: Invocation) -> Result<Request<Body>> {
    let uri = match invocation.query.as_deref().filter(|q| !q.is_empty()) {
        Some(query) => format!("{}?{}", invocation.path, query),
        None => invocation.path.clone(),
    };
    let mut builder = Request::builder().method(invocation.method.as_str()).uri(uri);
    for (name, value) in &invocation.headers {
        let name = HeaderName::try_from(name.as_str()).context("invalid header name")?;
        let value = HeaderValue::try_from(value.as_str()).context("invalid header value")?;
        builder = builder.header(name, value);
    }
    let has_content_type = invocation
        .headers
        .keys()
        .any(|k| k.eq_ignore_ascii_case(header::CONTENT_TYPE.as_str()));
    let body = match invocation.body {
        Some(body) => {
            if !has_content_type {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
            }
            Body::from(body)
        }
        None => Body::empty(),
    };
    builder.body(body).context("building request")
}

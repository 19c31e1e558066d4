use axum::http::Method;
use serde::{Deserialize, Serialize};

/// A request as seen by the gateway: method, origin-relative target, headers
/// and a fully buffered body.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub method: Method,
    /// Path plus optional query, e.g. `/api/recipes?category=soup`.
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl GatewayRequest {
    pub fn get(target: impl Into<String>) -> Self {
        Self { method: Method::GET, target: target.into(), headers: Vec::new(), body: Vec::new() }
    }

    pub fn path(&self) -> &str {
        self.target.split_once('?').map_or(self.target.as_str(), |(path, _)| path)
    }

    /// True for `/path[?query]` targets. Scheme-relative (`//host/...`) and
    /// backslash forms would resolve to another host once joined.
    pub fn is_origin_relative(&self) -> bool {
        self.target.starts_with('/') && !self.target.starts_with("//") && !self.path().contains('\\')
    }

    /// Cache key: the full target, query included.
    pub fn cache_key(&self) -> &str {
        &self.target
    }
}

/// Buffered response. Serializable so it can be stored in a cache generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl GatewayResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Vec<u8>>) -> Self {
        Self { status, headers, body: body.into() }
    }

    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(
            status,
            vec![("content-type".to_string(), "application/json".to_string())],
            value.to_string(),
        )
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

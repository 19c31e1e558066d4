use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::GatewayError;
use crate::exchange::{GatewayRequest, GatewayResponse};

/// Headers that describe a single hop and must not be forwarded.
const HOP_HEADERS: [&str; 8] = [
    "connection",
    "host",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_header(name: &str) -> bool {
    HOP_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name)) || name.eq_ignore_ascii_case("content-length")
}

/// Something that can carry a request to the origin.
pub trait Network: Send + Sync {
    fn fetch(
        &self,
        request: &GatewayRequest,
    ) -> impl Future<Output = Result<GatewayResponse, GatewayError>> + Send;
}

/// Forwards to a fixed upstream origin over HTTP.
#[derive(Clone)]
pub struct ReqwestNetwork {
    client: Client,
    upstream: Url,
}

impl ReqwestNetwork {
    pub fn new(upstream: Url, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .user_agent(concat!("recipes-gateway/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::network(upstream.as_str(), e))?;
        Ok(Self { client, upstream })
    }

    pub fn upstream(&self) -> &Url {
        &self.upstream
    }

    fn url_for(&self, request: &GatewayRequest) -> Result<Url, GatewayError> {
        if !request.is_origin_relative() {
            return Err(GatewayError::Target(request.target.clone()));
        }
        let url = self
            .upstream
            .join(&request.target)
            .map_err(|e| GatewayError::network(request.target.as_str(), e))?;
        if url.origin() != self.upstream.origin() {
            return Err(GatewayError::Target(request.target.clone()));
        }
        Ok(url)
    }
}

impl Network for ReqwestNetwork {
    async fn fetch(&self, request: &GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        let url = self.url_for(request)?;
        let mut builder = self.client.request(request.method.clone(), url.clone());
        for (name, value) in &request.headers {
            if !is_hop_header(name) {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let resp = builder.send().await.map_err(|e| GatewayError::network(url.as_str(), e))?;
        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter(|(name, _)| !is_hop_header(name.as_str()))
            .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
            .collect();
        let body = resp.bytes().await.map_err(|e| GatewayError::network(url.as_str(), e))?;
        tracing::debug!(%url, status, bytes = body.len(), "fetched from upstream");
        Ok(GatewayResponse::new(status, headers, body.to_vec()))
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::http::Method;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::{Cache, CacheStorage};
use crate::error::GatewayError;
use crate::exchange::{GatewayRequest, GatewayResponse};
use crate::network::Network;

pub const API_PREFIX: &str = "/api";

pub const DEFAULT_GENERATION: &str = "recipes-v2";

/// Core static assets pre-fetched on install.
pub const DEFAULT_MANIFEST: [&str; 5] = ["/", "/index.html", "/style.css", "/app.js", "/manifest.json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Dynamic data: network only, never served stale.
    Api,
    /// Static asset: cache first, populated on miss.
    Static,
}

pub fn classify(path: &str) -> Route {
    match path.strip_prefix(API_PREFIX) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => Route::Api,
        _ => Route::Static,
    }
}

/// Body returned for API calls while the network is unreachable.
pub fn offline_response() -> GatewayResponse {
    GatewayResponse::json(200, &serde_json::json!({ "error": "Offline" }))
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bumping this invalidates every previously cached asset.
    pub generation: String,
    pub manifest: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            generation: DEFAULT_GENERATION.to_string(),
            manifest: DEFAULT_MANIFEST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Decides per request between cache and network.
///
/// Lifecycle: [`Gateway::install`] fills the current generation with the
/// manifest, [`Gateway::activate`] purges older generations and starts
/// interception. Until activated, static requests pass straight to the
/// network; API requests are always network-first with the offline fallback.
pub struct Gateway<N> {
    network: N,
    storage: CacheStorage,
    config: GatewayConfig,
    active: AtomicBool,
}

impl<N: Network> Gateway<N> {
    pub fn new(network: N, storage: CacheStorage, config: GatewayConfig) -> Self {
        Self { network, storage, config, active: AtomicBool::new(false) }
    }

    pub fn generation(&self) -> &str {
        &self.config.generation
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    pub fn current_cache(&self) -> Result<Cache, GatewayError> {
        self.storage.open_cache(&self.config.generation)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Fetch every manifest asset into the current generation. All or
    /// nothing: one failed or non-2xx fetch leaves the cache untouched.
    pub async fn install(&self) -> Result<usize, GatewayError> {
        let mut fetched = Vec::with_capacity(self.config.manifest.len());
        for asset in &self.config.manifest {
            let response = self.network.fetch(&GatewayRequest::get(asset.as_str())).await?;
            if !response.is_success() {
                return Err(GatewayError::Install { url: asset.clone(), status: response.status });
            }
            fetched.push((asset.as_str(), response));
        }
        let cache = self.current_cache()?;
        let stored = cache.put_all(fetched.iter().map(|(key, response)| (*key, response)))?;
        info!(generation = %cache.name(), assets = stored, "installed static assets");
        Ok(stored)
    }

    /// Delete every generation but the current one, then start intercepting.
    /// Returns the purged generation names.
    pub fn activate(&self) -> Result<Vec<String>, GatewayError> {
        let mut purged = Vec::new();
        for name in self.storage.keys() {
            if name != self.config.generation && self.storage.delete(&name)? {
                purged.push(name);
            }
        }
        self.active.store(true, Ordering::Release);
        info!(generation = %self.config.generation, purged = purged.len(), "gateway active");
        Ok(purged)
    }

    /// Install then activate.
    pub async fn start(&self) -> Result<usize, GatewayError> {
        let installed = self.install().await?;
        self.activate()?;
        Ok(installed)
    }

    /// Keep calling [`Gateway::start`] every `retry` until it succeeds. The
    /// first attempt runs immediately.
    pub async fn run_until_started(&self, retry: Duration) {
        let mut ticks = interval(retry);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempt = 0u32;
        loop {
            ticks.tick().await;
            attempt += 1;
            match self.start().await {
                Ok(_) => return,
                Err(err) => warn!(attempt, error = %err, retry_in = ?retry, "gateway install failed"),
            }
        }
    }

    pub async fn handle(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        if !request.is_origin_relative() {
            return Err(GatewayError::Target(request.target));
        }
        match classify(request.path()) {
            Route::Api => Ok(self.network_first(&request).await),
            Route::Static if self.is_active() => self.cache_first(&request).await,
            Route::Static => self.network.fetch(&request).await,
        }
    }

    async fn network_first(&self, request: &GatewayRequest) -> GatewayResponse {
        match self.network.fetch(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(uri = %request.target, error = %err, "api unreachable, answering offline");
                offline_response()
            }
        }
    }

    async fn cache_first(&self, request: &GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        if request.method != Method::GET {
            return self.network.fetch(request).await;
        }
        let cache = self.current_cache()?;
        if let Some(hit) = cache.lookup(request.cache_key())? {
            debug!(uri = %request.target, "cache hit");
            return Ok(hit);
        }
        let response = self.network.fetch(request).await?;
        if response.is_success() {
            if let Err(err) = cache.put(request.cache_key(), &response) {
                warn!(uri = %request.target, error = %err, "could not cache asset");
            }
        }
        Ok(response)
    }
}

//! Caching edge for the recipe catalog: API calls go network-first with an
//! offline JSON fallback, static assets are served cache-first from a
//! versioned, persistent cache generation.

pub mod cache;
pub mod error;
pub mod exchange;
pub mod network;
pub mod policy;
pub mod proxy;

pub use cache::{Cache, CacheStorage};
pub use error::GatewayError;
pub use exchange::{GatewayRequest, GatewayResponse};
pub use network::{Network, ReqwestNetwork};
pub use policy::{classify, Gateway, GatewayConfig, Route};

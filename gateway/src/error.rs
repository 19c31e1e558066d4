use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("network request for {url} failed: {reason}")]
    Network { url: String, reason: String },
    #[error("cache storage fault: {0}")]
    Storage(#[from] sled::Error),
    #[error("cached entry is corrupt: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("install failed: {url} answered {status}")]
    Install { url: String, status: u16 },
    #[error("request target `{0}` is not an origin-relative path")]
    Target(String),
}

impl GatewayError {
    pub fn network(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Network { url: url.into(), reason: reason.to_string() }
    }
}

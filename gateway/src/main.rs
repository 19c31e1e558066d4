use anyhow::Result;
use clap::Parser;
use gateway::policy::{DEFAULT_GENERATION, DEFAULT_MANIFEST};
use gateway::{proxy, CacheStorage, Gateway, GatewayConfig, ReqwestNetwork};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "gateway")]
#[command(about = "Offline-caching proxy in front of the recipe catalog")]
struct Cli {
    /// Origin serving the API and the static client
    #[arg(long, env = "GATEWAY_UPSTREAM", default_value = "http://127.0.0.1:3000/")]
    upstream: Url,
    /// Host to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Port to bind
    #[arg(long, env = "GATEWAY_PORT", default_value_t = 8081)]
    port: u16,
    /// Directory holding cache generations
    #[arg(long, env = "GATEWAY_CACHE_DIR", default_value = "./data/gateway-cache")]
    cache_dir: PathBuf,
    /// Current cache generation; change it to force-refresh static assets
    #[arg(long, env = "GATEWAY_GENERATION", default_value = DEFAULT_GENERATION)]
    generation: String,
    /// Static asset to pre-cache on install (repeatable)
    #[arg(long = "asset")]
    assets: Vec<String>,
    /// Upstream request timeout seconds
    #[arg(long, default_value_t = 12)]
    timeout_secs: u64,
    /// Seconds between install attempts while upstream is unreachable
    #[arg(long, env = "GATEWAY_RETRY_SECS", default_value_t = 5)]
    retry_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let manifest = if cli.assets.is_empty() {
        DEFAULT_MANIFEST.iter().map(|s| s.to_string()).collect()
    } else {
        cli.assets.clone()
    };
    let config = GatewayConfig { generation: cli.generation.clone(), manifest };
    let network = ReqwestNetwork::new(cli.upstream.clone(), Duration::from_secs(cli.timeout_secs))?;
    let upstream = network.upstream().clone();
    let storage = CacheStorage::open(&cli.cache_dir)?;
    let gateway = Arc::new(Gateway::new(network, storage, config));

    // until an install succeeds, older generations stay and static requests pass through
    let retry = Duration::from_secs(cli.retry_secs.max(1));
    tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.run_until_started(retry).await }
    });

    let app = proxy::router(gateway);
    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, %upstream, generation = %cli.generation, "gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}

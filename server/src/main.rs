use anyhow::Result;
use clap::Parser;
use server::{build_app, AppContext};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "server", about = "Recipe catalog API and client host")]
struct Args {
    /// Recipe store directory
    #[arg(long, env = "RECIPES_DB", default_value = "./data/recipes")]
    db: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
    /// Directory holding the browser client
    #[arg(long, env = "STATIC_DIR", default_value = "./public")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let ctx = AppContext::new(&args.db);
    if let Err(err) = ctx.store().await {
        tracing::warn!(error = %err, db = %args.db.display(), "recipe store not reachable yet, retrying per request");
    }
    let static_dir = args.static_dir.is_dir().then_some(args.static_dir.as_path());
    if static_dir.is_none() {
        tracing::warn!(dir = %args.static_dir.display(), "static directory missing, serving API only");
    }
    let app = build_app(ctx, static_dir);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "recipe catalog listening");
    axum::serve(listener, app).await?;
    Ok(())
}

//! Serverless-style host: reads one JSON invocation per stdin line and
//! writes one JSON result per stdout line.

use anyhow::Result;
use clap::Parser;
use server::serverless::Adapter;
use std::path::PathBuf;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "invoke", about = "Answer recipe API invocations from stdin")]
struct Args {
    /// Recipe store directory
    #[arg(long, env = "RECIPES_DB", default_value = "./data/recipes")]
    db: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries results, so logs go to stderr
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let args = Args::parse();
    let adapter = Adapter::for_path(&args.db);

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();
    let mut served = 0usize;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let result = adapter.invoke_line(&line).await;
        stdout.write_all(result.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
        served += 1;
    }
    tracing::info!(served, connected = adapter.context().store_handle().is_connected(), "input closed");
    Ok(())
}

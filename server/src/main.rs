use anyhow::Result;
use axum::Router;
use clap::Parser;
use irlite_core::config::{DEFAULT_B, DEFAULT_K1};
use irlite_core::Bm25Params;
use irlite_server::build_app;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus directory (one document per file) or JSONL file
    #[arg(long, default_value = "./corpus")]
    corpus: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// BM25 term-frequency saturation
    #[arg(long, default_value_t = DEFAULT_K1)]
    k1: f64,
    /// BM25 length normalization
    #[arg(long, default_value_t = DEFAULT_B)]
    b: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let params = Bm25Params::new(args.k1, args.b)?;
    let app: Router = build_app(&args.corpus, params)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

use anyhow::Result;
use axum::Router;
use clap::Parser;
use engine::{CreateOptions, ScoringConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use server::{build_app, ServerSettings};
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Source collection JSON
    #[arg(long)]
    source: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Always rebuild from the source, ignoring the cache
    #[arg(long, default_value_t = false)]
    no_cache: bool,
    /// Champions list size per term
    #[arg(long)]
    champions: Option<usize>,
    /// JSON file overriding scoring weights
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let scoring = match &args.config {
        Some(path) => ScoringConfig::from_path(path)?,
        None => ScoringConfig::default(),
    };
    let settings = ServerSettings {
        source: args.source.clone(),
        create: CreateOptions { cache: !args.no_cache, champions_r: args.champions, ..Default::default() },
        scoring,
        admin_token: std::env::var("ADMIN_TOKEN").ok(),
    };
    let app: Router = tokio::task::spawn_blocking(move || build_app(settings)).await??;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

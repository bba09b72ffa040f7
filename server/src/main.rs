use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use irs_core::{EngineConfig, ModelKind};
use server::{build_app, AppConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Data directory holding my_collection.json and stopwords.json
    #[arg(long, default_value = "./data")]
    data: PathBuf,
    /// Model active at startup
    #[arg(long, default_value = "inverted")]
    model: ModelKind,
    /// Reference relevance table for precision and recall
    #[arg(long)]
    reference: Option<PathBuf>,
    /// JSON engine configuration; defaults apply to missing fields
    #[arg(long)]
    config: Option<PathBuf>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn load_engine_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(p) => {
            let text = std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(EngineConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let mut config = AppConfig::from_env(args.data.clone(), args.model);
    config.reference = args.reference.clone();
    config.engine = load_engine_config(args.config.as_ref())?;
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

//! Interview API server.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use interview_api::config::load_config;
use interview_api::state::AppState;
use tracing::info;

#[derive(Parser)]
#[command(name = "interview-api")]
#[command(about = "Mock-interview practice backend with a sandboxed code judge")]
struct Args {
    /// Path to server.toml
    #[arg(long, default_value = "server.toml")]
    config: PathBuf,

    /// Address to bind the server to (overrides config)
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("interview_api=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    info!(
        timeout_ms = config.judge.timeout_ms,
        max_concurrent_runs = config.judge.max_concurrent_runs,
        "judge configured"
    );

    let addr: SocketAddr = format!("{}:{}", config.bind, config.port).parse()?;
    let app = interview_api::app(AppState::in_memory(config)?);

    info!(addr = %addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

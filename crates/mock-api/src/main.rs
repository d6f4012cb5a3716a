use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{routing::post, Router};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod handlers;
mod session;

use config::load_settings;
use session::SessionStore;

/// Mock CRUD backend for the classification and tag editor widgets
#[derive(Debug, Parser)]
struct Cli {
    /// Address to listen on, overrides the settings file
    #[arg(long)]
    bind: Option<String>,

    /// Settings file
    #[arg(long, default_value = "mock-api.toml")]
    config: PathBuf,
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub cookie_name: Arc<str>,
}

impl AppState {
    pub fn new(cookie_name: &str) -> Self {
        Self {
            sessions: SessionStore::default(),
            cookie_name: Arc::from(cookie_name),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/mock", post(handlers::mock))
        .route("/api/mock.php", post(handlers::mock))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config);
    if let Some(bind) = cli.bind {
        settings.bind_addr = bind;
    }

    let app = build_router(AppState::new(&settings.cookie_name));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, cookie = %settings.cookie_name, "mock api listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

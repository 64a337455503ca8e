use anyhow::Context;
use clap::Parser;
use mapchat_core::{ChatService, MapChatConfig};
use mapchat_server::{router, AppState};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mapchat-server", version)]
struct Args {
    /// TOML config file. Defaults to the user config dir when present.
    #[arg(long, env = "MAPCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding `server.bind`.
    #[arg(long)]
    bind: Option<String>,

    #[arg(long)]
    examples_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config_path = MapChatConfig::resolve_path(args.config.as_deref());
    let mut config = MapChatConfig::load(config_path.as_deref()).context("loading config")?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(dir) = args.examples_dir {
        config.server.examples_dir = dir;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    match &config_path {
        Some(path) => tracing::info!("Config loaded: path={}", path.display()),
        None => tracing::info!("No config file found, using defaults"),
    }
    let bind = config.server.bind.clone();
    tracing::info!(
        "Starting mapchat-server: version={}, model={}, server_key={}",
        mapchat_core::VERSION,
        config.model.model,
        config.model.has_api_key()
    );

    let chat = ChatService::new(config).context("building chat service")?;
    let app = router(AppState::new(chat));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {}", bind))?;
    tracing::info!("Listening on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}

//! Composition root and CLI entrypoint for the Generation Orchestration
//! Engine (SPEC_FULL §1 "the binary crate").

mod cli;
mod composition;
mod tools;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    forge_infrastructure::logging::init_stderr();

    let cli = Cli::parse();
    let loader = match &cli.config {
        Some(path) => forge_infrastructure::ConfigLoader::new().with_config_path(path),
        None => forge_infrastructure::ConfigLoader::new(),
    };
    let config = loader.load()?;

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::CheckConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Command::Serve { bind } => serve(config, bind).await,
    }
}

async fn serve(mut config: forge_infrastructure::AppConfig, bind_override: Option<String>) -> anyhow::Result<()> {
    if let Some(bind) = bind_override {
        config.server.bind_addr = bind;
    }

    let composed = composition::compose(&config).await?;
    let sweep_cancel = CancellationToken::new();
    let sweep_handle = tokio::spawn(forge_infrastructure::retention::run_retention_sweep(
        composed.store,
        config.server.job_retention_hours,
        std::time::Duration::from_millis(config.server.retention_sweep_interval_ms),
        sweep_cancel.clone(),
    ));

    let app = forge_server::build_router(composed.state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!(addr = %config.server.bind_addr, "forge listening");

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    };
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

    sweep_cancel.cancel();
    let _ = sweep_handle.await;
    Ok(())
}

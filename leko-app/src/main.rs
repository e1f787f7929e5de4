use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use leko_api::state::AppState;
use leko_common::observability::{LogConfig, LogFormat, init_logging};
use leko_config::{LekoConfig, LekoConfigLoader};

#[derive(Parser, Debug)]
#[command(name = "leko", about = "Child-facing question answering service")]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(long, env = "LEKO_CONFIG", default_value = "leko.yaml")]
    config: PathBuf,

    /// Override the listen address from configuration.
    #[arg(long, env = "LEKO_LISTEN")]
    listen: Option<String>,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1) Load config; env-only deployments run without a file.
    let mut loader = LekoConfigLoader::new();
    if args.config.exists() {
        loader = loader.with_file(&args.config);
    }
    let cfg: LekoConfig = loader.load()?;

    // 2) Logging to the rolling file sink, duplicated to stderr.
    let log_path = init_logging(LogConfig {
        emit_stderr: true,
        format: if args.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Text
        },
        ..LogConfig::default()
    })?;

    // 3) Wire clients and state, then serve until ctrl-c.
    let listen = args.listen.unwrap_or_else(|| cfg.server.listen.clone());
    let state = Arc::new(AppState::from_config(&cfg)?);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    tracing::info!(
        %listen,
        log_path = %log_path.display(),
        ask_enabled = state.pipeline.is_some(),
        "leko service started"
    );

    leko_api::serve(listener, state).await?;
    Ok(())
}

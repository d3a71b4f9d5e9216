use anyhow::{Context, Result};
use clap::Parser;
use kb_api::cli::{self, Args, Command};
use kb_api::{create_app, AppState};
use kb_config::{AppConfig, ConfigError, ConfigLoader};
use kb_logging::LogSettings;
use kb_messages::{msg, MESSAGES};
use kb_orchestrator::{Procedure, WorkflowParams};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let config = match loader.load_global() {
        Ok(config) => config,
        Err(ConfigError::NotFound(path)) => {
            anyhow::bail!(
                "{}\n{}",
                msg!(MESSAGES.config.not_found, path = path.display().to_string()),
                MESSAGES.config.not_found_hint
            );
        }
        Err(e) => return Err(e).context("Failed to load configuration"),
    };

    let settings = LogSettings::from_config(
        &config.logging.level,
        config.logging.file.as_deref(),
        config.logging.format.as_deref(),
    )
    .with_env_overrides();
    let _log_guard = kb_logging::init_with(&settings);

    match args.command() {
        Command::Serve { bind } => serve(&config, bind).await,
        command => {
            let (procedure, params) = command
                .workflow()
                .context("run requires a procedure and its parameters")?;
            run_once(&config, procedure, params).await
        }
    }
}

async fn serve(config: &AppConfig, bind: Option<String>) -> Result<()> {
    let state = AppState::from_config(config);
    let shutdown = state.shutdown.clone();
    info!(
        "{}",
        msg!(MESSAGES.worker.starting, task_queue = state.task_queue.as_str())
    );

    let app = create_app(state);

    let bind_addr = cli::bind_addr(bind, &config.worker.bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    info!("{}", msg!(MESSAGES.worker.listening, addr = bind_addr.as_str()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    Ok(())
}

async fn run_once(config: &AppConfig, procedure: Procedure, params: WorkflowParams) -> Result<()> {
    let state = AppState::from_config(config);
    tokio::spawn(shutdown_signal(state.shutdown.clone()));

    let report = state
        .saga
        .run(procedure, &params, &state.shutdown)
        .await
        .with_context(|| format!("{procedure} failed"))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Resolves on Ctrl-C after cancelling `token`, so in-flight sagas stop at
/// their next suspension point.
async fn shutdown_signal(token: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("{}", MESSAGES.worker.shutting_down);
    token.cancel();
}
